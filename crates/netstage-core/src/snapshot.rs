//! Live cluster snapshot.
//!
//! Built fresh for every reconciliation pass from Kubernetes workload
//! objects (DaemonSet or Deployment shaped JSON). Lookups are keyed by
//! `{namespace}/{name}`; a missing key means the workload does not exist.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{ObjectRef, WorkloadSnapshot, WorkloadStatus};

/// Read-only view of the workloads currently present in the cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    workloads: HashMap<String, WorkloadSnapshot>,
}

impl ClusterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a workload.
    pub fn insert(&mut self, workload: WorkloadSnapshot) {
        self.workloads.insert(workload.table_key(), workload);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, workload: WorkloadSnapshot) -> Self {
        self.insert(workload);
        self
    }

    /// Look up the workload behind `object`.
    pub fn workload(&self, object: &ObjectRef) -> Option<&WorkloadSnapshot> {
        self.workloads.get(&object.table_key())
    }

    /// Look up a workload by namespace and name.
    pub fn get(&self, namespace: &str, name: &str) -> Option<&WorkloadSnapshot> {
        self.workloads.get(&format!("{namespace}/{name}"))
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Build a snapshot from Kubernetes workload objects.
    pub fn from_objects(objects: Vec<Value>) -> CoreResult<Self> {
        let mut snapshot = Self::new();
        for object in objects {
            let workload = workload_from_object(object)?;
            debug!(workload = %workload.table_key(), generation = workload.generation, "loaded live workload");
            snapshot.insert(workload);
        }
        Ok(snapshot)
    }

    /// Parse a JSON array or `List` document of workload objects.
    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_objects(list_items(document)?)
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

/// Unwrap a JSON document holding a list of objects.
///
/// Accepts a bare array or a Kubernetes `List` (`{"kind": "List", "items": [...]}`).
pub fn list_items(document: Value) -> CoreResult<Vec<Value>> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CoreError::InvalidObject(
                "expected a JSON array or an object with an `items` array".to_string(),
            )),
        },
        _ => Err(CoreError::InvalidObject(
            "expected a JSON array or an object with an `items` array".to_string(),
        )),
    }
}

// ── Kubernetes wire shape ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireObject {
    metadata: WireMeta,
    spec: WireSpec,
    status: WireStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireMeta {
    name: Option<String>,
    namespace: String,
    generation: i64,
    annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSpec {
    template: WireTemplate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireTemplate {
    metadata: WireTemplateMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireTemplateMeta {
    annotations: Option<BTreeMap<String, String>>,
}

/// DaemonSet and Deployment status counters. Whichever set is present wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireStatus {
    observed_generation: i64,
    // DaemonSet
    desired_number_scheduled: Option<i32>,
    updated_number_scheduled: Option<i32>,
    number_available: Option<i32>,
    number_unavailable: Option<i32>,
    number_ready: Option<i32>,
    // Deployment
    replicas: Option<i32>,
    updated_replicas: Option<i32>,
    available_replicas: Option<i32>,
    unavailable_replicas: Option<i32>,
    ready_replicas: Option<i32>,
}

impl WireStatus {
    fn into_status(self) -> WorkloadStatus {
        WorkloadStatus {
            observed_generation: self.observed_generation,
            desired: self.desired_number_scheduled.or(self.replicas).unwrap_or(0),
            updated: self.updated_number_scheduled.or(self.updated_replicas).unwrap_or(0),
            available: self.number_available.or(self.available_replicas).unwrap_or(0),
            unavailable: self.number_unavailable.or(self.unavailable_replicas).unwrap_or(0),
            ready: self.number_ready.or(self.ready_replicas).unwrap_or(0),
        }
    }
}

fn workload_from_object(object: Value) -> CoreResult<WorkloadSnapshot> {
    if !object.is_object() {
        return Err(CoreError::InvalidObject(format!(
            "workload must be a JSON object, got: {object}"
        )));
    }
    let wire: WireObject = serde_json::from_value(object)?;
    let name = wire
        .metadata
        .name
        .ok_or_else(|| CoreError::InvalidObject("workload is missing metadata.name".to_string()))?;

    Ok(WorkloadSnapshot {
        namespace: wire.metadata.namespace,
        name,
        generation: wire.metadata.generation,
        annotations: wire.metadata.annotations.unwrap_or_default(),
        template_annotations: wire.spec.template.metadata.annotations.unwrap_or_default(),
        status: wire.status.into_status(),
    })
}
