//! netstage staged rollouts — convergence gate between dependent workloads.
//!
//! When the cluster network changes address-family mode, the control-plane
//! workload must fully converge on its new spec before the per-node workload
//! is allowed to change. This crate decides, per reconciliation pass, which
//! rendered manifests get the migration marker and whether another pass is
//! needed.
//!
//! # Components
//!
//! - **`convergence`** — Rollout-completeness predicate over live status
//! - **`transition`** — Classifies a config change as staged or not
//! - **`coordinator`** — Applies or withholds the marker, reports progress

pub mod convergence;
pub mod coordinator;
pub mod error;
pub mod transition;

pub use convergence::{Convergence, PendingReason, check, is_converged};
pub use coordinator::{Outcome, StagedRollout, TransitionStatus};
pub use error::{RolloutError, RolloutResult};
pub use transition::{Direction, Transition, classify};
