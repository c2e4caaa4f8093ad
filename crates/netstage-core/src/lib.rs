//! netstage-core — shared types for the staged network rollout coordinator.
//!
//! # Components
//!
//! - **`types`** — Network configurations, object identities, workload snapshots
//! - **`snapshot`** — Live cluster snapshot keyed by `{namespace}/{name}`
//! - **`config`** — `netstage.toml` staging configuration
//! - **`error`** — Error types for loading configs and snapshots

pub mod config;
pub mod error;
pub mod snapshot;
pub mod types;

pub use config::StagingConfig;
pub use error::{CoreError, CoreResult};
pub use snapshot::ClusterSnapshot;
pub use types::*;
