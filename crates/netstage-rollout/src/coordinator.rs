//! Staged rollout coordinator — gates the node workload on the control plane.
//!
//! Each pass re-derives everything from the supplied configs and live
//! snapshot; the coordinator keeps no state between passes. The only writes
//! are migration markers on rendered manifests:
//!
//! ```text
//! no staged transition                    -> nothing marked, done
//! control plane absent, unmarked, rolling -> mark control plane, in progress
//! control plane marked and converged      -> mark both, done
//! ```

use std::fmt;

use netstage_core::{ClusterSnapshot, NetworkConfiguration, ObjectRef, StagingConfig};
use netstage_manifest::{Marker, RenderedManifest, apply_marker, find_mut};
use serde::Serialize;
use tracing::{debug, info};

use crate::convergence::{self, Convergence, PendingReason};
use crate::error::RolloutResult;
use crate::transition::{self, Transition};

/// Result of a pass, in terms of the two-stage gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    /// No staged transition; manifests applied as rendered.
    NoTransition,
    /// Control plane marked and still converging. Reconcile again.
    ControlPlaneRolling,
    /// Control plane converged; node workload marked and released.
    NodeGateReleased,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: TransitionStatus,
    pub transition: Option<Transition>,
}

impl Outcome {
    fn no_transition() -> Self {
        Self {
            status: TransitionStatus::NoTransition,
            transition: None,
        }
    }

    /// Whether the caller must schedule another pass.
    pub fn in_progress(&self) -> bool {
        self.status == TransitionStatus::ControlPlaneRolling
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Released,
    Held(HoldReason),
}

/// Why the node workload is still gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldReason {
    Absent,
    Unmarked,
    Rolling(PendingReason),
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldReason::Absent => f.write_str("control plane absent"),
            HoldReason::Unmarked => f.write_str("control plane not yet marked"),
            HoldReason::Rolling(reason) => write!(f, "control plane rolling: {reason}"),
        }
    }
}

/// Coordinates the control-plane-then-node rollout.
#[derive(Debug, Clone)]
pub struct StagedRollout {
    config: StagingConfig,
    marker: Marker,
}

impl StagedRollout {
    pub fn new(config: StagingConfig) -> Self {
        let marker = Marker::migration(&config.marker_key);
        Self { config, marker }
    }

    pub fn config(&self) -> &StagingConfig {
        &self.config
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Run one pass and report whether another pass is required.
    ///
    /// `Ok(true)` is a signal, not a failure. An error means a manifest could
    /// not be mutated and the pass must not be applied.
    pub fn reconcile(
        &self,
        desired: Option<&NetworkConfiguration>,
        previous: Option<&NetworkConfiguration>,
        live: &ClusterSnapshot,
        manifests: &mut [RenderedManifest],
    ) -> RolloutResult<bool> {
        Ok(self.evaluate(desired, previous, live, manifests)?.in_progress())
    }

    /// Like [`reconcile`](Self::reconcile), with the full outcome.
    pub fn evaluate(
        &self,
        desired: Option<&NetworkConfiguration>,
        previous: Option<&NetworkConfiguration>,
        live: &ClusterSnapshot,
        manifests: &mut [RenderedManifest],
    ) -> RolloutResult<Outcome> {
        // Nothing to compare against on the first pass.
        let (Some(desired), Some(previous)) = (desired, previous) else {
            return Ok(Outcome::no_transition());
        };
        let Some(transition) = transition::classify(previous, desired, self.config.network_type)
        else {
            return Ok(Outcome::no_transition());
        };

        info!(
            network_type = %transition.network_type,
            from_pools = transition.from_pools,
            to_pools = transition.to_pools,
            "configuration change detected, {} in progress",
            transition.direction
        );

        let control_plane = &self.config.control_plane;
        let status = match self.gate(live) {
            Gate::Released => {
                // The live control plane carries the marker; keep it applied.
                self.mark(manifests, control_plane)?;
                self.mark(manifests, &self.config.node)?;
                info!(
                    control_plane = %control_plane,
                    node = %self.config.node,
                    "control plane converged, releasing node rollout"
                );
                TransitionStatus::NodeGateReleased
            }
            Gate::Held(reason) => {
                self.mark(manifests, control_plane)?;
                info!(
                    control_plane = %control_plane,
                    reason = %reason,
                    "holding node rollout until control plane converges"
                );
                TransitionStatus::ControlPlaneRolling
            }
        };

        Ok(Outcome {
            status,
            transition: Some(transition),
        })
    }

    /// The node workload may change only once the live control plane carries
    /// the marker and has converged.
    fn gate(&self, live: &ClusterSnapshot) -> Gate {
        let workload = live.workload(&self.config.control_plane);
        match workload {
            Some(w) if !w.carries_marker(&self.marker.key, &self.marker.value) => {
                Gate::Held(HoldReason::Unmarked)
            }
            _ => match convergence::check(workload) {
                Convergence::Converged => Gate::Released,
                Convergence::Absent => Gate::Held(HoldReason::Absent),
                Convergence::Pending(reason) => Gate::Held(HoldReason::Rolling(reason)),
            },
        }
    }

    /// Mark the manifest for `object`. Returns false if none was rendered.
    fn mark(&self, manifests: &mut [RenderedManifest], object: &ObjectRef) -> RolloutResult<bool> {
        let Some(manifest) = find_mut(manifests, object) else {
            debug!(workload = %object, "no rendered manifest, skipping marker");
            return Ok(false);
        };
        apply_marker(manifest, &self.marker)?;
        debug!(workload = %object, marker = %self.marker, "migration marker set");
        Ok(true)
    }
}
