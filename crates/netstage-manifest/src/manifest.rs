//! Rendered manifests backed by JSON documents.

use netstage_core::ObjectRef;
use netstage_core::snapshot::list_items;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::marker::{MarkerScope, MarkerTarget};

/// A to-be-applied Kubernetes object.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedManifest {
    identity: ObjectRef,
    object: Value,
}

impl RenderedManifest {
    /// Wrap a JSON object. `apiVersion`, `kind` and `metadata.name` are required.
    pub fn from_value(object: Value) -> ManifestResult<Self> {
        let identity = identity_of(&object)?;
        Ok(Self { identity, object })
    }

    pub fn identity(&self) -> &ObjectRef {
        &self.identity
    }

    pub fn matches(&self, object: &ObjectRef) -> bool {
        &self.identity == object
    }

    pub fn as_value(&self) -> &Value {
        &self.object
    }

    pub fn into_value(self) -> Value {
        self.object
    }

    fn structure_error(&self, path: &[&str], reason: &str) -> ManifestError {
        ManifestError::Structure {
            object: self.identity.to_string(),
            path: if path.is_empty() {
                "<root>".to_string()
            } else {
                path.join(".")
            },
            reason: reason.to_string(),
        }
    }

    /// Walk to the map at `path`. Missing or null segments read as `None`.
    fn lookup(&self, path: &[&str]) -> ManifestResult<Option<&Map<String, Value>>> {
        let mut current = &self.object;
        for (depth, segment) in path.iter().enumerate() {
            let Value::Object(map) = current else {
                return Err(self.structure_error(&path[..depth], "is not an object"));
            };
            match map.get(*segment) {
                None | Some(Value::Null) => return Ok(None),
                Some(next) => current = next,
            }
        }
        match current {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(self.structure_error(path, "is not an object")),
        }
    }

    /// Walk to the map at `path`, creating missing or null segments.
    fn lookup_or_create(&mut self, path: &[&str]) -> ManifestResult<&mut Map<String, Value>> {
        // Structure errors come from `lookup`; past it every segment is a map or absent.
        self.lookup(path)?;

        let mut current = &mut self.object;
        for segment in path {
            let Value::Object(map) = current else {
                return Err(ManifestError::InvalidObject(format!(
                    "{}: `{}` changed shape during navigation",
                    self.identity,
                    path.join(".")
                )));
            };
            let next = map.entry(segment.to_string()).or_insert(Value::Null);
            if next.is_null() {
                *next = Value::Object(Map::new());
            }
            current = next;
        }
        match current {
            Value::Object(map) => Ok(map),
            _ => Err(ManifestError::InvalidObject(format!(
                "{}: `{}` changed shape during navigation",
                self.identity,
                path.join(".")
            ))),
        }
    }
}

impl MarkerTarget for RenderedManifest {
    fn marker(&self, scope: MarkerScope, key: &str) -> ManifestResult<Option<&str>> {
        let Some(map) = self.lookup(scope.path())? else {
            return Ok(None);
        };
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => {
                let mut path: Vec<&str> = scope.path().to_vec();
                path.push(key);
                Err(self.structure_error(&path, "is not a string"))
            }
        }
    }

    fn check_writable(&self, scope: MarkerScope) -> ManifestResult<()> {
        self.lookup(scope.path()).map(|_| ())
    }

    fn write_marker(&mut self, scope: MarkerScope, key: &str, value: &str) -> ManifestResult<()> {
        let map = self.lookup_or_create(scope.path())?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }
}

fn identity_of(object: &Value) -> ManifestResult<ObjectRef> {
    let Value::Object(map) = object else {
        return Err(ManifestError::InvalidObject(format!(
            "manifest must be a JSON object, got: {object}"
        )));
    };
    let field = |value: Option<&Value>, name: &str| -> ManifestResult<String> {
        value
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ManifestError::InvalidObject(format!("manifest is missing `{name}`")))
    };
    let metadata = map.get("metadata");

    Ok(ObjectRef {
        api_version: field(map.get("apiVersion"), "apiVersion")?,
        kind: field(map.get("kind"), "kind")?,
        namespace: metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: field(metadata.and_then(|m| m.get("name")), "metadata.name")?,
    })
}

/// Parse a JSON array or `List` document of rendered objects, keeping order.
pub fn load_manifests(content: &str) -> ManifestResult<Vec<RenderedManifest>> {
    let document: Value = serde_json::from_str(content)?;
    let manifests = list_items(document)?
        .into_iter()
        .map(RenderedManifest::from_value)
        .collect::<ManifestResult<Vec<_>>>()?;
    debug!(count = manifests.len(), "loaded rendered manifests");
    Ok(manifests)
}

/// Serialize manifests back to a pretty JSON array, in order.
pub fn to_json(manifests: &[RenderedManifest]) -> ManifestResult<String> {
    let values: Vec<&Value> = manifests.iter().map(RenderedManifest::as_value).collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

/// First manifest with the given identity.
pub fn find<'a>(manifests: &'a [RenderedManifest], object: &ObjectRef) -> Option<&'a RenderedManifest> {
    manifests.iter().find(|m| m.matches(object))
}

/// First manifest with the given identity, mutably.
pub fn find_mut<'a>(
    manifests: &'a mut [RenderedManifest],
    object: &ObjectRef,
) -> Option<&'a mut RenderedManifest> {
    manifests.iter_mut().find(|m| m.matches(object))
}
