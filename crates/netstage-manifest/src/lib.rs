//! netstage-manifest — mutable view over rendered, about-to-be-applied objects.
//!
//! The coordinator never navigates manifest documents itself. It goes through
//! the narrow [`MarkerTarget`] contract, which is the only place a malformed
//! manifest can surface as [`ManifestError::Structure`].
//!
//! # Components
//!
//! - **`manifest`** — `RenderedManifest`, manifest-set loading and lookup
//! - **`marker`** — Migration marker, scopes, atomic apply and verification

pub mod error;
pub mod manifest;
pub mod marker;

pub use error::{ManifestError, ManifestResult};
pub use manifest::{RenderedManifest, find, find_mut, load_manifests, to_json};
pub use marker::{MARKER_VALUE, Marker, MarkerScope, MarkerTarget, apply_marker, carries_marker};
