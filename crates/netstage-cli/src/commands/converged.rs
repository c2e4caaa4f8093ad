//! `netstage converged` — ask the convergence oracle about a live workload.

use std::path::Path;

use anyhow::{Context, Result};
use netstage_core::ClusterSnapshot;
use netstage_rollout::convergence;

pub fn run(live: &Path, namespace: &str, name: &str) -> Result<()> {
    let snapshot = ClusterSnapshot::from_file(live)
        .with_context(|| format!("failed to load live snapshot {}", live.display()))?;
    println!("{namespace}/{name}: {}", convergence::check(snapshot.get(namespace, name)));
    Ok(())
}
