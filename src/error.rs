//! Top-level error types for hubberbot.

use std::sync::Arc;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from {path}: {source}")]
    Load {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: String,
        source: Box<toml::de::Error>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Outbound profile and directory lookup failures.
///
/// A missing handle is not an error; it is reported as
/// [`FetchOutcome::NotFound`](crate::profile::FetchOutcome::NotFound).
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        source: reqwest::Error,
    },
}

/// Reasons a merged record is rejected by the output schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}
