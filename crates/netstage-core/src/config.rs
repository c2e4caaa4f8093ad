//! netstage.toml configuration parser.
//!
//! Every field has a default, so an empty file selects the OVN-Kubernetes
//! master/node pair.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{NetworkType, ObjectRef};

/// Default annotation key for the migration marker.
pub const DEFAULT_MARKER_KEY: &str = "network.netstage.io/dual-stack-migration";

/// Default namespace of the staged workloads.
pub const DEFAULT_NAMESPACE: &str = "ovn-kubernetes";

/// Which workloads to stage, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Network implementation whose address-family changes need staging.
    pub network_type: NetworkType,
    /// Annotation key of the migration marker.
    pub marker_key: String,
    /// Workload that must converge first.
    pub control_plane: ObjectRef,
    /// Per-node workload gated on the control plane.
    pub node: ObjectRef,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            network_type: NetworkType::OvnKubernetes,
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            control_plane: ObjectRef::daemonset(DEFAULT_NAMESPACE, "ovnkube-master"),
            node: ObjectRef::daemonset(DEFAULT_NAMESPACE, "ovnkube-node"),
        }
    }
}

impl StagingConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `path` when it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a netstage.toml with every default spelled out.
    pub fn scaffold() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: StagingConfig = toml::from_str("").unwrap();
        assert_eq!(config, StagingConfig::default());
        assert_eq!(config.control_plane.name, "ovnkube-master");
        assert_eq!(config.node.name, "ovnkube-node");
        assert_eq!(config.marker_key, DEFAULT_MARKER_KEY);
    }

    #[test]
    fn overrides_workloads() {
        let toml_str = r#"
marker_key = "example.com/migration"

[control_plane]
api_version = "apps/v1"
kind = "Deployment"
namespace = "net"
name = "controller"
"#;
        let config: StagingConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.marker_key, "example.com/migration");
        assert_eq!(config.control_plane.kind, "Deployment");
        assert_eq!(config.node, ObjectRef::daemonset(DEFAULT_NAMESPACE, "ovnkube-node"));
    }

    #[test]
    fn scaffold_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netstage.toml");
        std::fs::write(&path, StagingConfig::scaffold().to_toml_string().unwrap()).unwrap();

        let loaded = StagingConfig::from_file(&path).unwrap();
        assert_eq!(loaded, StagingConfig::scaffold());
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = StagingConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StagingConfig::default());
    }
}
