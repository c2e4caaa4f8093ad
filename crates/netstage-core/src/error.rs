//! Error types for netstage core.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading configurations and snapshots.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    SerializeToml(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("invalid object: {0}")]
    InvalidObject(String),
}
