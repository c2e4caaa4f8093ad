//! Shared types used across netstage crates.
//!
//! Network configurations are compared, never mutated. Workload snapshots
//! are read-only views of what the cluster currently reports.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// ── Network configuration ─────────────────────────────────────────

/// The cluster network implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    #[serde(rename = "OVNKubernetes")]
    OvnKubernetes,
    #[serde(rename = "OpenShiftSDN")]
    OpenShiftSdn,
    Kuryr,
    Raw,
}

impl NetworkType {
    pub fn label(&self) -> &'static str {
        match self {
            NetworkType::OvnKubernetes => "OVNKubernetes",
            NetworkType::OpenShiftSdn => "OpenShiftSDN",
            NetworkType::Kuryr => "Kuryr",
            NetworkType::Raw => "Raw",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cluster (pod) address pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNetworkEntry {
    pub cidr: String,
    /// Prefix length of the per-node subnet carved out of `cidr`.
    pub host_prefix: u32,
}

/// OVN-Kubernetes specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvnKubernetesConfig {
    /// UDP port for the Geneve overlay tunnel.
    pub geneve_port: Option<u32>,
    /// MTU of the overlay network.
    pub mtu: Option<u32>,
}

/// Snapshot of the cluster network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub network_type: NetworkType,
    #[serde(default)]
    pub cluster_network: Vec<ClusterNetworkEntry>,
    /// Service address pools, one per address family.
    #[serde(default)]
    pub service_network: Vec<String>,
    #[serde(default)]
    pub ovn_kubernetes: Option<OvnKubernetesConfig>,
}

impl NetworkConfiguration {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Number of service address pools (1 = single-stack, 2 = dual-stack).
    pub fn service_pool_count(&self) -> usize {
        self.service_network.len()
    }
}

// ── Object identity ───────────────────────────────────────────────

/// Identity of a Kubernetes object: `(apiVersion, kind, namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(api_version: &str, kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// An `apps/v1` DaemonSet reference.
    pub fn daemonset(namespace: &str, name: &str) -> Self {
        Self::new("apps/v1", "DaemonSet", namespace, name)
    }

    /// Build the `{namespace}/{name}` key used for live snapshot lookups.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

// ── Workload snapshot ─────────────────────────────────────────────

/// Replica counters reported by a workload's controller.
///
/// Missing fields are zero, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadStatus {
    /// Last spec generation the controller has processed.
    pub observed_generation: i64,
    pub desired: i32,
    pub updated: i32,
    pub available: i32,
    pub unavailable: i32,
    pub ready: i32,
}

/// Read-only view of a workload as currently observed in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub namespace: String,
    pub name: String,
    /// Spec generation, bumped on every spec change.
    pub generation: i64,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Annotations on the pod template.
    #[serde(default)]
    pub template_annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub status: WorkloadStatus,
}

impl WorkloadSnapshot {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Build the `{namespace}/{name}` key for this workload.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// True when both the object and its pod template carry `key=value`.
    pub fn carries_marker(&self, key: &str, value: &str) -> bool {
        self.annotations.get(key).is_some_and(|v| v == value)
            && self.template_annotations.get(key).is_some_and(|v| v == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dual_stack_config() {
        let conf = NetworkConfiguration::from_toml_str(
            r#"
network_type = "OVNKubernetes"
service_network = ["192.168.0.0/20", "fd00:1:2:3::/112"]

[[cluster_network]]
cidr = "10.0.0.0/22"
host_prefix = 24

[[cluster_network]]
cidr = "fd00:3:2:1::/64"
host_prefix = 56
"#,
        )
        .unwrap();
        assert_eq!(conf.network_type, NetworkType::OvnKubernetes);
        assert_eq!(conf.service_pool_count(), 2);
        assert_eq!(conf.cluster_network[1].host_prefix, 56);
        assert!(conf.ovn_kubernetes.is_none());
    }

    #[test]
    fn parses_ovn_settings() {
        let conf = NetworkConfiguration::from_toml_str(
            r#"
network_type = "OVNKubernetes"
service_network = ["192.168.0.0/20"]

[ovn_kubernetes]
geneve_port = 8061
"#,
        )
        .unwrap();
        let ovn = conf.ovn_kubernetes.unwrap();
        assert_eq!(ovn.geneve_port, Some(8061));
        assert_eq!(ovn.mtu, None);
    }

    #[test]
    fn rejects_unknown_network_type() {
        let err = NetworkConfiguration::from_toml_str(r#"network_type = "Flannel""#);
        assert!(matches!(err, Err(CoreError::ParseToml(_))));
    }

    #[test]
    fn object_ref_display_and_key() {
        let r = ObjectRef::daemonset("ovn-kubernetes", "ovnkube-master");
        assert_eq!(r.to_string(), "DaemonSet ovn-kubernetes/ovnkube-master");
        assert_eq!(r.table_key(), "ovn-kubernetes/ovnkube-master");
        assert_eq!(r.api_version, "apps/v1");
    }

    #[test]
    fn partial_marker_is_absent() {
        let mut snap = WorkloadSnapshot::new("ns", "ds");
        snap.annotations.insert("k".to_string(), "true".to_string());
        assert!(!snap.carries_marker("k", "true"));

        snap.template_annotations.insert("k".to_string(), "false".to_string());
        assert!(!snap.carries_marker("k", "true"));

        snap.template_annotations.insert("k".to_string(), "true".to_string());
        assert!(snap.carries_marker("k", "true"));
    }
}
