//! Rollout error types.

use thiserror::Error;

/// Result type alias for rollout operations.
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Errors that abort a reconciliation pass.
#[derive(Debug, Error)]
pub enum RolloutError {
    /// A rendered manifest could not be mutated. Must not be applied.
    #[error(transparent)]
    Manifest(#[from] netstage_manifest::ManifestError),
}
