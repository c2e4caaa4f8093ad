//! `netstage reconcile` — one staged rollout pass over rendered manifests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use netstage_core::{ClusterSnapshot, NetworkConfiguration, StagingConfig};
use netstage_manifest::{RenderedManifest, load_manifests, to_json};
use netstage_rollout::{Outcome, StagedRollout, TransitionStatus};
use serde_json::{Map, Value};
use tracing::debug;

pub struct ReconcileArgs {
    pub desired: PathBuf,
    pub previous: Option<PathBuf>,
    pub live: Option<PathBuf>,
    pub manifests: PathBuf,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub format: String,
}

pub fn run(args: &ReconcileArgs) -> Result<()> {
    let (outcome, manifests) = reconcile(args)?;

    if let Some(output) = &args.output {
        std::fs::write(output, to_json(&manifests)?)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    match args.format.as_str() {
        "json" => {
            let mut report = Map::new();
            report.insert("in_progress".to_string(), Value::Bool(outcome.in_progress()));
            report.insert("outcome".to_string(), serde_json::to_value(&outcome)?);
            if args.output.is_none() {
                let values = manifests.into_iter().map(RenderedManifest::into_value).collect();
                report.insert("manifests".to_string(), Value::Array(values));
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => println!("{}", format_outcome(&outcome)),
        other => bail!("unsupported output format: {other} (expected text or json)"),
    }

    Ok(())
}

/// Load every input, run the pass, and return the mutated manifests.
pub fn reconcile(args: &ReconcileArgs) -> Result<(Outcome, Vec<RenderedManifest>)> {
    let config = StagingConfig::load_or_default(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let desired = load_network(&args.desired)?;
    let previous = args.previous.as_deref().map(load_network).transpose()?;
    let live = match &args.live {
        Some(path) => ClusterSnapshot::from_file(path)
            .with_context(|| format!("failed to load live snapshot {}", path.display()))?,
        None => ClusterSnapshot::new(),
    };
    let content = std::fs::read_to_string(&args.manifests)
        .with_context(|| format!("failed to read {}", args.manifests.display()))?;
    let mut manifests = load_manifests(&content)
        .with_context(|| format!("failed to parse {}", args.manifests.display()))?;

    debug!(
        manifests = manifests.len(),
        live_workloads = live.len(),
        "loaded reconciliation inputs"
    );

    let rollout = StagedRollout::new(config);
    let outcome = rollout.evaluate(Some(&desired), previous.as_ref(), &live, &mut manifests)?;
    Ok((outcome, manifests))
}

fn load_network(path: &Path) -> Result<NetworkConfiguration> {
    NetworkConfiguration::from_file(path)
        .with_context(|| format!("failed to load network configuration {}", path.display()))
}

fn format_outcome(outcome: &Outcome) -> String {
    let status = match outcome.status {
        TransitionStatus::NoTransition => "no staged transition",
        TransitionStatus::ControlPlaneRolling => "control plane rolling, reconcile again",
        TransitionStatus::NodeGateReleased => "node rollout released",
    };
    match &outcome.transition {
        Some(t) => format!(
            "status: {status}\ntransition: {} ({} -> {} service pools)",
            t.direction, t.from_pools, t.to_pools
        ),
        None => format!("status: {status}"),
    }
}

#[cfg(test)]
mod tests {
    use netstage_manifest::{Marker, carries_marker, find};
    use netstage_core::ObjectRef;

    use super::*;

    const SINGLE: &str = r#"
network_type = "OVNKubernetes"
service_network = ["192.168.0.0/20"]
"#;

    const DUAL: &str = r#"
network_type = "OVNKubernetes"
service_network = ["192.168.0.0/20", "fd00:1:2:3::/112"]
"#;

    const MANIFESTS: &str = r#"[
  {"apiVersion": "apps/v1", "kind": "DaemonSet",
   "metadata": {"name": "ovnkube-node", "namespace": "ovn-kubernetes"}},
  {"apiVersion": "apps/v1", "kind": "DaemonSet",
   "metadata": {"name": "ovnkube-master", "namespace": "ovn-kubernetes"}}
]"#;

    fn args(dir: &Path, previous: &str, desired: &str) -> ReconcileArgs {
        std::fs::write(dir.join("previous.toml"), previous).unwrap();
        std::fs::write(dir.join("desired.toml"), desired).unwrap();
        std::fs::write(dir.join("manifests.json"), MANIFESTS).unwrap();
        ReconcileArgs {
            desired: dir.join("desired.toml"),
            previous: Some(dir.join("previous.toml")),
            live: None,
            manifests: dir.join("manifests.json"),
            config: dir.join("netstage.toml"),
            output: Some(dir.join("out.json")),
            format: "text".to_string(),
        }
    }

    #[test]
    fn conversion_marks_master_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), SINGLE, DUAL);

        run(&args).unwrap();

        let written = load_manifests(&std::fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
        let marker = Marker::migration(&StagingConfig::default().marker_key);
        let master = find(&written, &ObjectRef::daemonset("ovn-kubernetes", "ovnkube-master")).unwrap();
        let node = find(&written, &ObjectRef::daemonset("ovn-kubernetes", "ovnkube-node")).unwrap();
        assert!(carries_marker(master, &marker).unwrap());
        assert!(!carries_marker(node, &marker).unwrap());
    }

    #[test]
    fn first_run_without_previous_is_not_staged() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), SINGLE, DUAL);
        args.previous = None;

        let (outcome, _) = reconcile(&args).unwrap();
        assert_eq!(outcome.status, TransitionStatus::NoTransition);
    }

    #[test]
    fn reads_live_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), SINGLE, DUAL);
        let key = StagingConfig::default().marker_key;
        let live = serde_json::json!([{
            "apiVersion": "apps/v1",
            "kind": "DaemonSet",
            "metadata": {
                "name": "ovnkube-master",
                "namespace": "ovn-kubernetes",
                "generation": 2,
                "annotations": { key.as_str(): "true" }
            },
            "spec": { "template": { "metadata": { "annotations": { key.as_str(): "true" } } } },
            "status": {
                "observedGeneration": 2,
                "desiredNumberScheduled": 3,
                "updatedNumberScheduled": 3,
                "numberAvailable": 3
            }
        }]);
        std::fs::write(dir.path().join("live.json"), live.to_string()).unwrap();
        args.live = Some(dir.path().join("live.json"));

        let (outcome, manifests) = reconcile(&args).unwrap();
        assert_eq!(outcome.status, TransitionStatus::NodeGateReleased);
        let node = find(&manifests, &ObjectRef::daemonset("ovn-kubernetes", "ovnkube-node")).unwrap();
        assert!(carries_marker(node, &Marker::migration(&key)).unwrap());
    }

    #[test]
    fn rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), SINGLE, SINGLE);
        args.format = "yaml".to_string();
        assert!(run(&args).is_err());
    }

    #[test]
    fn missing_desired_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), SINGLE, DUAL);
        args.desired = dir.path().join("absent.toml");
        let err = reconcile(&args).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let (outcome, _) = reconcile(&args(dir.path(), SINGLE, DUAL)).unwrap();
        assert_eq!(
            format_outcome(&outcome),
            "status: control plane rolling, reconcile again\n\
             transition: single-stack to dual-stack (1 -> 2 service pools)"
        );
    }
}
