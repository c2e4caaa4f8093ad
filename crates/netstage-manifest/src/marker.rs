//! Migration marker — a key/value annotation that must be present on both a
//! workload object and its pod template to count as applied.

use std::fmt;

use crate::error::ManifestResult;

/// Value carried by every migration marker.
pub const MARKER_VALUE: &str = "true";

/// Which marker map of a workload manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerScope {
    /// `metadata.annotations`
    Object,
    /// `spec.template.metadata.annotations`
    PodTemplate,
}

impl MarkerScope {
    pub const ALL: [MarkerScope; 2] = [MarkerScope::Object, MarkerScope::PodTemplate];

    /// Field path of the marker map inside a workload document.
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            MarkerScope::Object => &["metadata", "annotations"],
            MarkerScope::PodTemplate => &["spec", "template", "metadata", "annotations"],
        }
    }
}

impl fmt::Display for MarkerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path().join("."))
    }
}

/// A marker annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub key: String,
    pub value: String,
}

impl Marker {
    /// A migration marker under `key` with value `"true"`.
    pub fn migration(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: MARKER_VALUE.to_string(),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Get/set access to the two marker maps of a workload manifest.
pub trait MarkerTarget {
    /// Read `key` from the marker map in `scope`. A missing map reads as `None`.
    fn marker(&self, scope: MarkerScope, key: &str) -> ManifestResult<Option<&str>>;

    /// Fail if the marker map in `scope` could not be written.
    fn check_writable(&self, scope: MarkerScope) -> ManifestResult<()>;

    /// Write `key=value` into the marker map in `scope`, creating it if needed.
    fn write_marker(&mut self, scope: MarkerScope, key: &str, value: &str) -> ManifestResult<()>;
}

/// Set `marker` on both marker maps of `target`.
///
/// Both maps are checked before either is written, so a structure error
/// leaves `target` untouched.
pub fn apply_marker<T: MarkerTarget + ?Sized>(target: &mut T, marker: &Marker) -> ManifestResult<()> {
    for scope in MarkerScope::ALL {
        target.check_writable(scope)?;
    }
    for scope in MarkerScope::ALL {
        target.write_marker(scope, &marker.key, &marker.value)?;
    }
    Ok(())
}

/// True iff both marker maps of `target` hold `marker` with its exact value.
pub fn carries_marker<T: MarkerTarget + ?Sized>(target: &T, marker: &Marker) -> ManifestResult<bool> {
    for scope in MarkerScope::ALL {
        if target.marker(scope, &marker.key)? != Some(marker.value.as_str()) {
            return Ok(false);
        }
    }
    Ok(true)
}
