//! Markdown rendering of a validated profile.

use super::merge::MergedRecord;
use super::schema::{OutputRecord, validate};
use super::NOT_FOUND_REPLY;

use serde_json::Value;

/// Validate `merged` and render it as a markdown table.
///
/// A record the schema rejects renders as [`NOT_FOUND_REPLY`].
pub fn render(merged: &MergedRecord) -> String {
    match validate(&merged.fields) {
        Ok(output) => render_table(&output),
        Err(error) => {
            tracing::debug!(%error, "merged profile rejected by output schema");
            NOT_FOUND_REPLY.into()
        }
    }
}

/// One `| **key** | value |` row per field, rows joined with CRLF.
pub fn render_table(output: &OutputRecord) -> String {
    let rows = output
        .iter()
        .map(|(key, value)| format!("| **{key}** | {} |", display_value(value)))
        .collect::<Vec<_>>()
        .join("\r\n");

    format!("\n| Key | Value |\n| --- | --- |\n{rows}\n")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
