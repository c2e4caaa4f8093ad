//! Change classification — which configuration deltas need a staged rollout.
//!
//! Only a change in the number of service address pools under the staged
//! network implementation qualifies. Every other delta is applied normally.

use std::fmt;

use netstage_core::{NetworkConfiguration, NetworkType};
use serde::Serialize;

/// Address-family direction of a service pool count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SingleToDual,
    DualToSingle,
    /// Any other count change (e.g. from or to zero pools).
    Other,
}

impl Direction {
    fn between(from: usize, to: usize) -> Self {
        match (from, to) {
            (1, 2) => Direction::SingleToDual,
            (2, 1) => Direction::DualToSingle,
            _ => Direction::Other,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::SingleToDual => "single-stack to dual-stack",
            Direction::DualToSingle => "dual-stack to single-stack",
            Direction::Other => "service pool count change",
        })
    }
}

/// A detected staged transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub network_type: NetworkType,
    /// Service pool count in the previous configuration.
    pub from_pools: usize,
    /// Service pool count in the desired configuration.
    pub to_pools: usize,
    pub direction: Direction,
}

/// Classify the change from `previous` to `desired`.
///
/// Returns `Some` when `desired` uses the `staged` network implementation
/// and the service pool count differs.
pub fn classify(
    previous: &NetworkConfiguration,
    desired: &NetworkConfiguration,
    staged: NetworkType,
) -> Option<Transition> {
    if desired.network_type != staged {
        return None;
    }
    let from_pools = previous.service_pool_count();
    let to_pools = desired.service_pool_count();
    if from_pools == to_pools {
        return None;
    }
    Some(Transition {
        network_type: staged,
        from_pools,
        to_pools,
        direction: Direction::between(from_pools, to_pools),
    })
}

#[cfg(test)]
mod tests {
    use netstage_core::ClusterNetworkEntry;

    use super::*;

    fn config(network_type: NetworkType, services: &[&str]) -> NetworkConfiguration {
        NetworkConfiguration {
            network_type,
            cluster_network: vec![ClusterNetworkEntry {
                cidr: "10.0.0.0/22".to_string(),
                host_prefix: 24,
            }],
            service_network: services.iter().map(|s| s.to_string()).collect(),
            ovn_kubernetes: None,
        }
    }

    #[test]
    fn single_to_dual() {
        let prev = config(NetworkType::OvnKubernetes, &["192.168.0.0/20"]);
        let conf = config(NetworkType::OvnKubernetes, &["192.168.0.0/20", "fd00:1:2:3::/112"]);
        let t = classify(&prev, &conf, NetworkType::OvnKubernetes).unwrap();
        assert_eq!(t.direction, Direction::SingleToDual);
        assert_eq!((t.from_pools, t.to_pools), (1, 2));
    }

    #[test]
    fn dual_to_single() {
        let prev = config(NetworkType::OvnKubernetes, &["192.168.0.0/20", "fd00:1:2:3::/112"]);
        let conf = config(NetworkType::OvnKubernetes, &["192.168.0.0/20"]);
        let t = classify(&prev, &conf, NetworkType::OvnKubernetes).unwrap();
        assert_eq!(t.direction, Direction::DualToSingle);
    }

    #[test]
    fn unchanged_pool_count_is_not_staged() {
        let prev = config(NetworkType::OvnKubernetes, &["192.168.0.0/20"]);
        let mut conf = config(NetworkType::OvnKubernetes, &["172.30.0.0/16"]);
        conf.cluster_network.push(ClusterNetworkEntry {
            cidr: "10.2.0.0/22".to_string(),
            host_prefix: 23,
        });
        assert!(classify(&prev, &conf, NetworkType::OvnKubernetes).is_none());
    }

    #[test]
    fn other_network_types_are_not_staged() {
        let prev = config(NetworkType::OpenShiftSdn, &["192.168.0.0/20"]);
        let conf = config(NetworkType::OpenShiftSdn, &["192.168.0.0/20", "fd00:1:2:3::/112"]);
        assert!(classify(&prev, &conf, NetworkType::OvnKubernetes).is_none());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let prev = config(NetworkType::OvnKubernetes, &["192.168.0.0/20"]);
        let conf = config(NetworkType::OvnKubernetes, &["192.168.0.0/20", "fd00:1:2:3::/112"]);
        let (prev_before, conf_before) = (prev.clone(), conf.clone());
        classify(&prev, &conf, NetworkType::OvnKubernetes);
        assert_eq!(prev, prev_before);
        assert_eq!(conf, conf_before);
    }

    #[test]
    fn odd_counts_are_other() {
        let prev = config(NetworkType::OvnKubernetes, &[]);
        let conf = config(NetworkType::OvnKubernetes, &["192.168.0.0/20"]);
        let t = classify(&prev, &conf, NetworkType::OvnKubernetes).unwrap();
        assert_eq!(t.direction, Direction::Other);
    }
}
