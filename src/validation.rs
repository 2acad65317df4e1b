//! Structural constraints on classified topologies.
//!
//! Checks never fail; each finding is appended to a
//! [`ConstraintViolationReport`].

use std::collections::BTreeSet;

use crate::algorithm::KtcAlgorithm;
use crate::pattern::KtcCriterion;
use crate::topology::Topology;
use crate::types::{ConstraintViolation, ConstraintViolationReport, LinkState};

/// A checkable property of a classified topology.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyConstraint {
    /// Every link has been classified.
    NoUnclassifiedLinks,
    /// The links in `states` connect all nodes, ignoring direction.
    StateConnectivity {
        /// States of the links that may be used.
        states: Vec<LinkState>,
    },
    /// Every link has a reverse partner with the same state.
    SymmetricStates,
    /// INACTIVE links are justified by a kTC triangle and ACTIVE links are
    /// not.
    KtcPredicate {
        /// Ranking criterion.
        criterion: KtcCriterion,
        /// Stretch factor.
        k: f64,
    },
}

impl TopologyConstraint {
    /// Connectivity through links that are not INACTIVE.
    pub fn weak_connectivity() -> Self {
        Self::StateConnectivity {
            states: vec![LinkState::Active, LinkState::Unclassified],
        }
    }

    /// Connectivity through all links.
    pub fn physical_connectivity() -> Self {
        Self::StateConnectivity {
            states: LinkState::ALL.to_vec(),
        }
    }

    /// Name used in violation records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoUnclassifiedLinks => "no_unclassified_links",
            Self::StateConnectivity { .. } => "state_connectivity",
            Self::SymmetricStates => "symmetric_states",
            Self::KtcPredicate { .. } => "ktc_predicate",
        }
    }

    /// Check the constraint, appending violations to `report`.
    pub fn check(&self, topology: &Topology, report: &mut ConstraintViolationReport) {
        match self {
            Self::NoUnclassifiedLinks => {
                for link in topology.links().filter(|l| !l.state().is_classified()) {
                    report.add(
                        ConstraintViolation::new(self.name(), format!("Link {} is unclassified", link.id()))
                            .with_links([link.id().clone()]),
                    );
                }
            }
            Self::StateConnectivity { states } => {
                let components = topology.connected_components(states);
                if components.len() > 1 {
                    let detached: BTreeSet<_> = components.into_iter().skip(1).flatten().collect();
                    report.add(
                        ConstraintViolation::new(
                            self.name(),
                            format!(
                                "{} node(s) unreachable via links in states {:?}",
                                detached.len(),
                                states
                            ),
                        )
                        .with_nodes(detached),
                    );
                }
            }
            Self::SymmetricStates => {
                for link in topology.links() {
                    match topology.reverse_link(link.id().as_str()) {
                        None => report.add(
                            ConstraintViolation::new(self.name(), format!("Link {} has no reverse link", link.id()))
                                .with_links([link.id().clone()]),
                        ),
                        Some(reverse) if link.id() < reverse.id() && link.state() != reverse.state() => {
                            report.add(
                                ConstraintViolation::new(
                                    self.name(),
                                    format!(
                                        "Link {} is {} but its reverse {} is {}",
                                        link.id(),
                                        link.state(),
                                        reverse.id(),
                                        reverse.state()
                                    ),
                                )
                                .with_links([link.id().clone(), reverse.id().clone()]),
                            )
                        }
                        Some(_) => {}
                    }
                }
            }
            Self::KtcPredicate { criterion, k } => {
                let ktc = match KtcAlgorithm::new(*criterion, *k) {
                    Ok(ktc) => ktc,
                    Err(err) => {
                        tracing::error!(error = %err, "Cannot build kTC patterns for predicate check");
                        return;
                    }
                };
                for link in topology.links() {
                    let justified = || ktc.is_inactivation_justified(topology, link.id().as_str());
                    let message = match link.state() {
                        LinkState::Inactive if !justified() => "is inactive but no triangle justifies it",
                        LinkState::Active if justified() => "is active but a triangle justifies inactivation",
                        _ => continue,
                    };
                    report.add(
                        ConstraintViolation::new(self.name(), format!("Link {} {}", link.id(), message))
                            .with_links([link.id().clone()]),
                    );
                }
            }
        }
    }

    /// Check the constraint into a fresh report.
    pub fn evaluate(&self, topology: &Topology) -> ConstraintViolationReport {
        let mut report = ConstraintViolationReport::new();
        self.check(topology, &mut report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkAttributes;

    fn classified_triangle() -> Topology {
        let mut topology = Topology::new();
        for id in ["n1", "n2", "n3"] {
            topology.add_node(id, None).unwrap();
        }
        topology.add_symmetric_link("e12", "e21", "n1", "n2", LinkAttributes::from_distance(100.0)).unwrap();
        topology.add_symmetric_link("e13", "e31", "n1", "n3", LinkAttributes::from_distance(120.0)).unwrap();
        topology.add_symmetric_link("e23", "e32", "n2", "n3", LinkAttributes::from_distance(150.0)).unwrap();
        for id in ["e12", "e21", "e13", "e31"] {
            topology.set_link_state(id, LinkState::Active).unwrap();
        }
        for id in ["e23", "e32"] {
            topology.set_link_state(id, LinkState::Inactive).unwrap();
        }
        topology
    }

    #[test]
    fn test_consistent_topology_has_no_violations() {
        let topology = classified_triangle();
        for constraint in [
            TopologyConstraint::NoUnclassifiedLinks,
            TopologyConstraint::weak_connectivity(),
            TopologyConstraint::SymmetricStates,
            TopologyConstraint::KtcPredicate { criterion: KtcCriterion::Weight, k: 1.41 },
        ] {
            let report = constraint.evaluate(&topology);
            assert!(report.is_empty(), "{}: {:?}", constraint.name(), report);
        }
    }

    #[test]
    fn test_unclassified_links_reported() {
        let mut topology = classified_triangle();
        topology.set_link_state("e12", LinkState::Unclassified).unwrap();
        let report = TopologyConstraint::NoUnclassifiedLinks.evaluate(&topology);
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].links[0].as_str(), "e12");
    }

    #[test]
    fn test_connectivity_violation_lists_detached_nodes() {
        let mut topology = classified_triangle();
        for id in ["e13", "e31"] {
            topology.set_link_state(id, LinkState::Inactive).unwrap();
        }
        let report = TopologyConstraint::weak_connectivity().evaluate(&topology);
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].nodes.len(), 1);
        assert_eq!(report.violations()[0].nodes[0].as_str(), "n3");
        assert!(TopologyConstraint::physical_connectivity().evaluate(&topology).is_empty());
    }

    #[test]
    fn test_asymmetric_states_reported_once_per_pair() {
        let mut topology = classified_triangle();
        topology.set_link_state("e21", LinkState::Inactive).unwrap();
        topology.add_link("solo", "n1", "n3", LinkAttributes::from_distance(1.0)).unwrap();
        let report = TopologyConstraint::SymmetricStates.evaluate(&topology);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_ktc_predicate_detects_wrong_states() {
        let mut topology = classified_triangle();
        topology.set_link_state("e23", LinkState::Active).unwrap();
        topology.set_link_state("e12", LinkState::Inactive).unwrap();
        let report = TopologyConstraint::KtcPredicate { criterion: KtcCriterion::Weight, k: 1.41 }
            .evaluate(&topology);
        let mut links: Vec<_> = report.violations().iter().map(|v| v.links[0].to_string()).collect();
        links.sort();
        assert_eq!(links, vec!["e12", "e23"]);
    }
}
