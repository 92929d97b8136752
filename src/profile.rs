//! Profile resolution for a single handle.
//!
//! The public profile and the organization directory snapshot are fetched
//! concurrently, merged into one record, projected through the output schema
//! and rendered as a markdown table.

mod fetch;
mod merge;
mod render;
mod schema;

pub use fetch::{FetchOutcome, GitHubClient, Profiles};
pub use merge::{MEMBER_GLYPH, MergedRecord, NON_MEMBER_GLYPH, merge};
pub use render::{render, render_table};
pub use schema::{OutputRecord, validate};

use crate::error::LookupError;

/// A decoded JSON object, as returned by either upstream source.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Reply used both for unknown handles and for records the schema rejects.
pub const NOT_FOUND_REPLY: &str = "user not found.";

/// Strip a single leading `@` from a handle.
pub fn normalize_handle(raw: &str) -> &str {
    raw.strip_prefix('@').unwrap_or(raw)
}

/// Run the whole pipeline for `raw_handle`.
///
/// Returns the rendered table, or [`NOT_FOUND_REPLY`] when the handle is
/// empty, the public profile does not resolve or the merged record fails
/// validation. An empty handle issues no requests. Transport and decode
/// failures are returned as errors.
pub async fn resolve_profile(
    client: &GitHubClient,
    raw_handle: &str,
    token: &str,
) -> Result<String, LookupError> {
    let handle = normalize_handle(raw_handle);
    if handle.is_empty() {
        tracing::debug!(raw_handle, "empty handle, skipping lookup");
        return Ok(NOT_FOUND_REPLY.into());
    }

    match client.fetch(handle, token).await? {
        FetchOutcome::NotFound => {
            tracing::debug!(handle, "public profile not found");
            Ok(NOT_FOUND_REPLY.into())
        }
        FetchOutcome::Found(profiles) => {
            let merged = merge(&profiles.directory, handle, profiles.public);
            tracing::debug!(handle, is_member = merged.is_member, "profile merged");
            Ok(render(&merged))
        }
    }
}
