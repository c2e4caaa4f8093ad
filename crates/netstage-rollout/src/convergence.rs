//! Rollout-completeness predicate.
//!
//! A workload has converged when its controller has observed the latest
//! spec generation and every desired replica is both updated and available.
//! Checking generation alongside availability rules out the window where old
//! replicas still count as available before the controller starts replacing
//! them.

use std::fmt;

use netstage_core::WorkloadSnapshot;

/// The first convergence condition a workload fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReason {
    /// The controller has not processed the latest spec yet.
    GenerationNotObserved { generation: i64, observed: i64 },
    /// Some replicas still run an older spec.
    StaleReplicas { updated: i32, desired: i32 },
    /// Fewer replicas are available than desired.
    ReplicasUnavailable { available: i32, desired: i32 },
    /// Replicas are reported unavailable.
    UnavailableReplicas(i32),
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::GenerationNotObserved { generation, observed } => {
                write!(f, "generation {generation} not observed (observed {observed})")
            }
            PendingReason::StaleReplicas { updated, desired } => {
                write!(f, "{updated}/{desired} replicas updated")
            }
            PendingReason::ReplicasUnavailable { available, desired } => {
                write!(f, "{available}/{desired} replicas available")
            }
            PendingReason::UnavailableReplicas(n) => write!(f, "{n} replicas unavailable"),
        }
    }
}

/// Convergence verdict for a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// The workload does not exist.
    Absent,
    /// Still rolling out.
    Pending(PendingReason),
    Converged,
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        *self == Convergence::Converged
    }
}

impl fmt::Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convergence::Absent => f.write_str("absent"),
            Convergence::Pending(reason) => write!(f, "pending: {reason}"),
            Convergence::Converged => f.write_str("converged"),
        }
    }
}

/// Evaluate the convergence conditions in order and report the first failure.
pub fn check(snapshot: Option<&WorkloadSnapshot>) -> Convergence {
    let Some(snapshot) = snapshot else {
        return Convergence::Absent;
    };
    let status = &snapshot.status;

    if status.observed_generation < snapshot.generation {
        return Convergence::Pending(PendingReason::GenerationNotObserved {
            generation: snapshot.generation,
            observed: status.observed_generation,
        });
    }
    if status.updated != status.desired {
        return Convergence::Pending(PendingReason::StaleReplicas {
            updated: status.updated,
            desired: status.desired,
        });
    }
    if status.available != status.desired {
        return Convergence::Pending(PendingReason::ReplicasUnavailable {
            available: status.available,
            desired: status.desired,
        });
    }
    if status.unavailable != 0 {
        return Convergence::Pending(PendingReason::UnavailableReplicas(status.unavailable));
    }
    Convergence::Converged
}

/// Has the workload finished converging on its current spec? Absent is `false`.
pub fn is_converged(snapshot: Option<&WorkloadSnapshot>) -> bool {
    check(snapshot).is_converged()
}
