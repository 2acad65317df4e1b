//! k-based topology control (kTC).
//!
//! kTC switches off a link `u → v` if it is the worst link of some triangle
//! `u → v`, `u → w`, `w → v` and the alternative path is good enough:
//!
//! - distance kTC: `weight(u→v) > k * min(weight(u→w), weight(w→v))`
//! - energy kTC: `k * lifetime(u→v) < max(lifetime(u→w), lifetime(w→v))`
//!
//! The rule is expressed by two patterns:
//!
//! - the *inactivation* pattern is the triangle with the kTC constraint; every
//!   link bound to its direct link variable becomes INACTIVE
//! - the *activation* pattern is the single direct link with the triangle
//!   glued in as a negative application condition; every link it binds stays
//!   ACTIVE
//!
//! Links matched by neither (self-loops, for example) default to ACTIVE.
//!
//! A decision depends only on attribute values of triangles in which the link
//! is the direct link, never on current link states. Classifying links one
//! at a time therefore yields the same result as classifying all at once.

use std::collections::{BTreeMap, BTreeSet};

use crate::matcher::PatternMatcher;
use crate::pattern::{
    Constraint, KtcCriterion, PatternBuilder, PatternError, TopologyPattern, VariableAssignment,
};
use crate::topology::Topology;
use crate::types::{Link, LinkId, LinkState};
use crate::validation::TopologyConstraint;

use super::{AlgorithmId, TopologyControlAlgorithm};

/// Local node variable of the kTC patterns.
pub const SOURCE: &str = "u";
/// Target of the direct link.
pub const TARGET: &str = "v";
/// Intermediate node of the alternative path.
pub const INTERMEDIATE: &str = "w";
/// Link variable of the link being classified.
pub const DIRECT_LINK: &str = "e";
/// First leg of the alternative path, `u → w`.
pub const FIRST_LEG: &str = "e1";
/// Second leg of the alternative path, `w → v`.
pub const SECOND_LEG: &str = "e2";

/// kTC with a fixed criterion and stretch factor.
#[derive(Debug, Clone)]
pub struct KtcAlgorithm {
    criterion: KtcCriterion,
    k: f64,
    inactivation: TopologyPattern,
    activation: TopologyPattern,
}

impl KtcAlgorithm {
    /// Build both kTC patterns for `criterion` and `k`.
    pub fn new(criterion: KtcCriterion, k: f64) -> Result<Self, PatternError> {
        let rule = || Constraint::ktc_triangle(DIRECT_LINK, FIRST_LEG, SECOND_LEG, k, criterion);

        let inactivation = PatternBuilder::new()
            .local_node(SOURCE)
            .directed_link(SOURCE, DIRECT_LINK, TARGET)
            .directed_link(SOURCE, FIRST_LEG, INTERMEDIATE)
            .directed_link(INTERMEDIATE, SECOND_LEG, TARGET)
            .constraint(rule())
            .build()?;

        let triangle = PatternBuilder::new()
            .directed_link(SOURCE, FIRST_LEG, INTERMEDIATE)
            .directed_link(INTERMEDIATE, SECOND_LEG, TARGET)
            .constraint(rule())
            .build_nac()?;
        let activation = PatternBuilder::new()
            .local_node(SOURCE)
            .directed_link(SOURCE, DIRECT_LINK, TARGET)
            .nac(triangle)
            .build()?;

        Ok(Self {
            criterion,
            k,
            inactivation,
            activation,
        })
    }

    /// Distance (weight) based kTC.
    pub fn distance(k: f64) -> Result<Self, PatternError> {
        Self::new(KtcCriterion::Weight, k)
    }

    /// Energy (expected lifetime) based kTC.
    pub fn energy(k: f64) -> Result<Self, PatternError> {
        Self::new(KtcCriterion::ExpectedLifetime, k)
    }

    /// Stretch factor.
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Ranking criterion.
    pub fn criterion(&self) -> KtcCriterion {
        self.criterion
    }

    /// Triangle pattern whose direct link may be switched off.
    pub fn inactivation_pattern(&self) -> &TopologyPattern {
        &self.inactivation
    }

    /// Single-link pattern with the triangle as negative condition.
    pub fn activation_pattern(&self) -> &TopologyPattern {
        &self.activation
    }

    /// Whether some triangle justifies switching off `link`.
    pub fn is_inactivation_justified(&self, topology: &Topology, link: &str) -> bool {
        let Some(link) = topology.link(link) else {
            return false;
        };
        let Some(input) = direct_binding(link) else {
            return false;
        };
        PatternMatcher::new(&self.inactivation).has_match_with(link.source().as_str(), topology, &input)
    }

    fn links_bound_as_direct(&self, pattern: &TopologyPattern, topology: &Topology) -> BTreeSet<LinkId> {
        PatternMatcher::new(pattern)
            .match_all(topology)
            .into_iter()
            .filter_map(|m| m.link(DIRECT_LINK).cloned())
            .collect()
    }
}

impl TopologyControlAlgorithm for KtcAlgorithm {
    fn id(&self) -> AlgorithmId {
        match self.criterion {
            KtcCriterion::Weight => AlgorithmId::DistanceKtc,
            KtcCriterion::ExpectedLifetime => AlgorithmId::EnergyKtc,
        }
    }

    fn decide_link(&self, topology: &Topology, link: &str) -> Option<LinkState> {
        topology.link(link)?;
        let state = if self.is_inactivation_justified(topology, link) {
            LinkState::Inactive
        } else {
            LinkState::Active
        };
        tracing::trace!(link = %link, state = %state, k = self.k, "kTC decision");
        Some(state)
    }

    fn decide_all(&self, topology: &Topology) -> BTreeMap<LinkId, LinkState> {
        let inactive = self.links_bound_as_direct(&self.inactivation, topology);
        let active = self.links_bound_as_direct(&self.activation, topology);
        debug_assert!(inactive.is_disjoint(&active));

        topology
            .link_ids()
            .map(|id| {
                let state = if inactive.contains(id) {
                    LinkState::Inactive
                } else {
                    if !active.contains(id) {
                        tracing::trace!(link = %id, "No kTC pattern applies, keeping link active");
                    }
                    LinkState::Active
                };
                (id.clone(), state)
            })
            .collect()
    }

    fn constraints(&self) -> Vec<TopologyConstraint> {
        vec![TopologyConstraint::KtcPredicate {
            criterion: self.criterion,
            k: self.k,
        }]
    }
}

/// Input assignment that pins the direct link of the kTC patterns to `link`.
/// Self-loops cannot be pinned, since `u` and `v` must differ.
fn direct_binding(link: &Link) -> Option<VariableAssignment> {
    let mut input = VariableAssignment::new();
    input.bind_node(SOURCE.into(), link.source().clone()).ok()?;
    input.bind_node(TARGET.into(), link.target().clone()).ok()?;
    input.bind_link(DIRECT_LINK.into(), link.id().clone()).ok()?;
    Some(input)
}
