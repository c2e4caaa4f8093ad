//! Manifest error types.

use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors raised while reading or mutating rendered manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A field on the way to a marker map is not navigable.
    #[error("malformed manifest {object}: `{path}` {reason}")]
    Structure {
        object: String,
        path: String,
        reason: String,
    },

    #[error("invalid manifest: {0}")]
    InvalidObject(String),

    #[error("failed to parse manifests: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] netstage_core::CoreError),
}
