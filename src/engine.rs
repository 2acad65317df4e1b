//! Classification engine.
//!
//! The [`ClassificationEngine`] owns a [`Topology`], applies mutations to it,
//! and keeps link states consistent with the configured topology control
//! algorithm.
//!
//! ## Incremental Maintenance
//!
//! Every mutation marks exactly the links whose decision may change as
//! UNCLASSIFIED:
//!
//! 1. The mutated link(s), the reverse partner of a re-weighted link, and
//!    the partner left unpaired by a removal or re-pairing (plus its
//!    triangle neighbourhood, since its tie-break id changes)
//! 2. Every link that can share a triangle with a mutated link
//!    (see [`Topology::links_sharing_triangle`])
//! 3. For a node removal, the union of (2) over all incident links
//!
//! All other links keep their state. In [`OperationMode::Incremental`] a run
//! classifies only UNCLASSIFIED links; in [`OperationMode::Batch`] a run
//! recomputes every link. Both reach the same classification.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::algorithm::{self, AlgorithmId, OperationMode, TopologyControlAlgorithm};
use crate::config::EngineConfig;
use crate::listener::{ContextEvent, LinkStateListener};
use crate::pattern::PatternError;
use crate::topology::{StateCounts, Topology, TopologyError};
use crate::types::{
    ConstraintViolationReport, Link, LinkAttribute, LinkAttributes, LinkId, LinkState, Node,
    NodeAttribute, NodeId,
};
use crate::validation::TopologyConstraint;

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An algorithm was configured before choosing an operation mode.
    #[error("Operation mode must be set before configuring an algorithm")]
    OperationModeNotSet,

    /// A run was requested without an algorithm.
    #[error("No topology control algorithm configured")]
    AlgorithmNotConfigured,

    /// The stretch factor is not a finite positive number.
    #[error("Invalid k: {0} (must be finite and positive)")]
    InvalidK(f64),

    /// Topology mutation failed.
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Algorithm patterns could not be built.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

/// Outcome of one classification run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Algorithm used.
    pub algorithm: AlgorithmId,
    /// Mode the run was performed in.
    pub mode: OperationMode,
    /// Stretch factor.
    pub k: f64,
    /// Links decided in this run.
    pub decided: usize,
    /// Links whose state changed.
    pub changed: usize,
    /// State counts after the run.
    pub counts: StateCounts,
}

/// Topology owner and link classifier.
pub struct ClassificationEngine {
    topology: Topology,
    mode: OperationMode,
    algorithm_id: Option<AlgorithmId>,
    /// Algorithm instance of the most recent run.
    algorithm: Option<Box<dyn TopologyControlAlgorithm>>,
    listeners: Vec<Arc<dyn LinkStateListener>>,
    violation_count: usize,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationEngine")
            .field("mode", &self.mode)
            .field("algorithm", &self.algorithm_id)
            .field("nodes", &self.topology.node_count())
            .field("links", &self.topology.link_count())
            .field("listeners", &self.listeners.len())
            .field("violation_count", &self.violation_count)
            .finish()
    }
}

impl ClassificationEngine {
    /// Create an engine with an empty topology and no operation mode.
    pub fn new() -> Self {
        Self::with_topology(Topology::new())
    }

    /// Create an engine around an existing topology.
    pub fn with_topology(topology: Topology) -> Self {
        Self {
            topology,
            mode: OperationMode::NotSet,
            algorithm_id: None,
            algorithm: None,
            listeners: Vec::new(),
            violation_count: 0,
        }
    }

    /// Create an engine with the mode and algorithm of `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self::new();
        engine.set_operation_mode(config.operation_mode);
        engine.configure_algorithm(config.algorithm)?;
        Ok(engine)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────

    /// Choose batch or incremental operation.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
    }

    /// Current operation mode.
    pub fn operation_mode(&self) -> OperationMode {
        self.mode
    }

    /// Select the topology control algorithm. All links become UNCLASSIFIED.
    pub fn configure_algorithm(&mut self, id: AlgorithmId) -> Result<(), EngineError> {
        if self.mode == OperationMode::NotSet {
            return Err(EngineError::OperationModeNotSet);
        }
        self.algorithm_id = Some(id);
        self.algorithm = None;
        self.unclassify_all_links();
        tracing::debug!(algorithm = %id, mode = %self.mode, "Configured topology control algorithm");
        Ok(())
    }

    /// Configured algorithm, if any.
    pub fn algorithm(&self) -> Option<AlgorithmId> {
        self.algorithm_id
    }

    /// Register a listener for state changes and context events.
    pub fn add_listener(&mut self, listener: Arc<dyn LinkStateListener>) {
        self.listeners.push(listener);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Classification
    // ─────────────────────────────────────────────────────────────────────

    /// Classify links with stretch factor `k`.
    ///
    /// In batch mode every link is decided; in incremental mode only
    /// UNCLASSIFIED links are. Running twice without mutations in between
    /// changes nothing.
    pub fn run(&mut self, k: f64) -> Result<RunSummary, EngineError> {
        if !k.is_finite() || k <= 0.0 {
            return Err(EngineError::InvalidK(k));
        }
        let id = self.algorithm_id.ok_or(EngineError::AlgorithmNotConfigured)?;
        if self.mode == OperationMode::NotSet {
            return Err(EngineError::OperationModeNotSet);
        }
        let algorithm = algorithm::instantiate(id, k)?;

        let decisions: Vec<(LinkId, LinkState)> = match self.mode {
            OperationMode::Incremental => self
                .topology
                .links()
                .filter(|link| !link.state().is_classified())
                .filter_map(|link| {
                    let state = algorithm.decide_link(&self.topology, link.id().as_str())?;
                    Some((link.id().clone(), state))
                })
                .collect(),
            _ => algorithm.decide_all(&self.topology).into_iter().collect(),
        };

        let decided = decisions.len();
        let mut changed = 0;
        for (link, state) in decisions {
            if self.apply_state(&link, state) {
                changed += 1;
            }
        }
        self.algorithm = Some(algorithm);

        let summary = RunSummary {
            algorithm: id,
            mode: self.mode,
            k,
            decided,
            changed,
            counts: self.topology.state_counts(),
        };
        tracing::info!(
            algorithm = %id,
            mode = %self.mode,
            k,
            decided,
            changed,
            active = summary.counts.active,
            inactive = summary.counts.inactive,
            "Topology control run complete"
        );
        Ok(summary)
    }

    /// Mark every link UNCLASSIFIED.
    pub fn unclassify_all_links(&mut self) {
        let classified: BTreeSet<LinkId> = self
            .topology
            .links()
            .filter(|l| l.state().is_classified())
            .map(|l| l.id().clone())
            .collect();
        self.invalidate(classified);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Add a node.
    pub fn add_node(&mut self, id: impl Into<NodeId>, remaining_energy: Option<f64>) -> Result<(), EngineError> {
        let id = id.into();
        self.topology.add_node(id.clone(), remaining_energy)?;
        self.emit(ContextEvent::NodeAdded { node: id });
        Ok(())
    }

    /// Add a directed link.
    pub fn add_link(
        &mut self,
        id: impl Into<LinkId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        attributes: LinkAttributes,
    ) -> Result<(), EngineError> {
        let id = id.into();
        self.topology.add_link(id.clone(), source, target, attributes)?;
        let affected = self.topology.links_sharing_triangle(id.as_str());
        self.invalidate(affected);
        self.emit(ContextEvent::LinkAdded { link: id });
        Ok(())
    }

    /// Add a pair of opposite links registered as reverse of each other.
    pub fn add_symmetric_link(
        &mut self,
        forward: impl Into<LinkId>,
        backward: impl Into<LinkId>,
        a: impl Into<NodeId>,
        b: impl Into<NodeId>,
        attributes: LinkAttributes,
    ) -> Result<(), EngineError> {
        let forward = forward.into();
        let backward = backward.into();
        self.topology
            .add_symmetric_link(forward.clone(), backward.clone(), a, b, attributes)?;
        let mut affected = self.topology.links_sharing_triangle(forward.as_str());
        affected.extend(self.topology.links_sharing_triangle(backward.as_str()));
        self.invalidate(affected);
        self.emit(ContextEvent::LinkAdded { link: forward });
        self.emit(ContextEvent::LinkAdded { link: backward });
        Ok(())
    }

    /// Register two existing opposite links as reverse of each other.
    ///
    /// Former partners of either link lose their pairing and are
    /// reclassified too.
    pub fn connect_reverse(&mut self, forward: &str, backward: &str) -> Result<(), EngineError> {
        let former: Vec<LinkId> = [forward, backward]
            .into_iter()
            .filter_map(|id| self.topology.reverse_link_id(id).cloned())
            .collect();
        self.topology.connect_reverse(forward, backward)?;
        // tie-break identifiers of all involved links may have changed
        let mut affected = self.neighbourhood(forward);
        affected.extend(self.neighbourhood(backward));
        for partner in &former {
            affected.extend(self.neighbourhood(partner.as_str()));
        }
        self.invalidate(affected);
        self.emit(ContextEvent::ReverseConnected {
            forward: LinkId::new(forward),
            backward: LinkId::new(backward),
        });
        Ok(())
    }

    /// Remove a link. Unknown ids are ignored.
    pub fn remove_link(&mut self, id: &str) -> Option<Link> {
        if !self.topology.contains_link(id) {
            tracing::debug!(link = %id, "Ignoring removal of unknown link");
            return None;
        }
        let mut affected = self.topology.links_sharing_triangle(id);
        let partner = self.topology.reverse_link_id(id).cloned();
        let removed = self.topology.remove_link(id)?;
        // an unpaired survivor breaks ties by its own id from now on
        if let Some(partner) = partner {
            affected.extend(self.neighbourhood(partner.as_str()));
        }
        self.invalidate(affected);
        self.emit(ContextEvent::LinkRemoved { link: removed.id().clone() });
        Some(removed)
    }

    /// Remove a node and its incident links. Unknown ids are ignored.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        if !self.topology.contains_node(id) {
            tracing::debug!(node = %id, "Ignoring removal of unknown node");
            return None;
        }
        let incident = self.topology.incident_link_ids(id);
        let mut affected = BTreeSet::new();
        for link in &incident {
            affected.extend(self.topology.links_sharing_triangle(link.as_str()));
        }
        let removed = self.topology.remove_node(id)?;
        self.invalidate(affected);
        for link in incident {
            self.emit(ContextEvent::LinkRemoved { link });
        }
        self.emit(ContextEvent::NodeRemoved { node: removed.id().clone() });
        Some(removed)
    }

    /// Update a node attribute.
    ///
    /// Setting the remaining energy recomputes the expected lifetime
    /// (`energy / transmission power`) of every outgoing link that defines a
    /// positive transmission power.
    pub fn update_node_attribute(
        &mut self,
        id: &str,
        attribute: NodeAttribute,
        value: f64,
    ) -> Result<(), EngineError> {
        self.topology.set_node_attribute(id, attribute, value)?;
        if attribute == NodeAttribute::RemainingEnergy {
            let lifetimes: Vec<(LinkId, f64)> = self
                .topology
                .outgoing_links(id)
                .filter_map(|link| {
                    let power = link.attributes().transmission_power?;
                    (power.is_finite() && power > 0.0).then(|| (link.id().clone(), value / power))
                })
                .collect();
            for (link, lifetime) in lifetimes {
                self.reclassify_attribute(link.as_str(), LinkAttribute::ExpectedLifetime, lifetime)?;
            }
        }
        self.emit(ContextEvent::NodeAttributeUpdated {
            node: NodeId::new(id),
            attribute,
        });
        Ok(())
    }

    /// Update a link attribute.
    ///
    /// A classification-relevant change marks the link, its reverse partner,
    /// and every link sharing a triangle with it UNCLASSIFIED.
    pub fn update_link_attribute(
        &mut self,
        id: &str,
        attribute: LinkAttribute,
        value: f64,
    ) -> Result<(), EngineError> {
        self.reclassify_attribute(id, attribute, value)?;
        self.emit(ContextEvent::LinkAttributeUpdated {
            link: LinkId::new(id),
            attribute,
        });
        Ok(())
    }

    /// Update a link attribute on the link and on its reverse partner.
    pub fn update_link_attribute_symmetric(
        &mut self,
        id: &str,
        attribute: LinkAttribute,
        value: f64,
    ) -> Result<(), EngineError> {
        let reverse = self.topology.reverse_link_id(id).cloned();
        self.update_link_attribute(id, attribute, value)?;
        if let Some(reverse) = reverse {
            self.update_link_attribute(reverse.as_str(), attribute, value)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────

    /// Check the classified topology after a run.
    ///
    /// Covers the algorithm's own constraints, the absence of UNCLASSIFIED
    /// links, and, if the topology is physically connected, connectivity
    /// through non-INACTIVE links.
    pub fn check_constraints_after_topology_control(&mut self) -> ConstraintViolationReport {
        let mut constraints = self.algorithm_constraints();
        constraints.push(TopologyConstraint::NoUnclassifiedLinks);
        if self.topology.is_physically_connected() {
            constraints.push(TopologyConstraint::weak_connectivity());
        }
        self.check(&constraints, "topology_control")
    }

    /// Check the topology after a mutation. Only meaningful in incremental
    /// mode; returns an empty report otherwise.
    pub fn check_constraints_after_context_event(&mut self) -> ConstraintViolationReport {
        if self.mode != OperationMode::Incremental {
            return ConstraintViolationReport::new();
        }
        let mut constraints = self.algorithm_constraints();
        if self.topology.is_physically_connected() {
            constraints.push(TopologyConstraint::weak_connectivity());
        }
        self.check(&constraints, "context_event")
    }

    /// Violations found by all checks since the last reset.
    pub fn constraint_violation_count(&self) -> usize {
        self.violation_count
    }

    /// Reset the violation counter.
    pub fn reset_constraint_violation_counter(&mut self) {
        self.violation_count = 0;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// The managed topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Release the managed topology.
    pub fn into_topology(self) -> Topology {
        self.topology
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.topology.link_count()
    }

    /// State of a link.
    pub fn link_state(&self, id: &str) -> Option<LinkState> {
        self.topology.link(id).map(Link::state)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn reclassify_attribute(&mut self, id: &str, attribute: LinkAttribute, value: f64) -> Result<(), EngineError> {
        let previous = self.topology.set_link_attribute(id, attribute, value)?;
        if !attribute.is_classification_relevant() {
            return Ok(());
        }
        if previous != LinkState::Unclassified {
            self.notify(&LinkId::new(id), previous, LinkState::Unclassified);
        }
        let mut affected = self.topology.links_sharing_triangle(id);
        if let Some(reverse) = self.topology.reverse_link_id(id) {
            affected.insert(reverse.clone());
        }
        self.invalidate(affected);
        Ok(())
    }

    fn neighbourhood(&self, id: &str) -> BTreeSet<LinkId> {
        let mut links = self.topology.links_sharing_triangle(id);
        links.insert(LinkId::new(id));
        links
    }

    fn invalidate(&mut self, links: BTreeSet<LinkId>) {
        for link in links {
            self.apply_state(&link, LinkState::Unclassified);
        }
    }

    /// Set a link state and notify listeners. Returns whether it changed.
    fn apply_state(&mut self, link: &LinkId, state: LinkState) -> bool {
        match self.topology.set_link_state(link.as_str(), state) {
            Ok(previous) if previous != state => {
                self.notify(link, previous, state);
                true
            }
            _ => false,
        }
    }

    fn notify(&self, link: &LinkId, old: LinkState, new: LinkState) {
        tracing::trace!(link = %link, old = %old, new = %new, "Link state modified");
        for listener in &self.listeners {
            listener.link_state_modified(link, old, new);
        }
    }

    fn emit(&self, event: ContextEvent) {
        tracing::debug!(event = event.kind(), "Context event");
        for listener in &self.listeners {
            listener.context_event(&event);
        }
    }

    fn algorithm_constraints(&self) -> Vec<TopologyConstraint> {
        self.algorithm
            .as_ref()
            .map(|algorithm| algorithm.constraints())
            .unwrap_or_default()
    }

    fn check(&mut self, constraints: &[TopologyConstraint], phase: &'static str) -> ConstraintViolationReport {
        let mut report = ConstraintViolationReport::new();
        for constraint in constraints {
            constraint.check(&self.topology, &mut report);
        }
        self.violation_count += report.len();
        if report.is_empty() {
            tracing::debug!(phase, "All topology constraints satisfied");
        } else {
            tracing::error!(
                phase,
                violations = report.len(),
                histogram = ?report.histogram(),
                "Topology constraint violations detected"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::CountingListener;

    fn engine(mode: OperationMode) -> ClassificationEngine {
        let mut engine = ClassificationEngine::new();
        for id in ["n1", "n2", "n3"] {
            engine.add_node(id, None).unwrap();
        }
        engine.add_symmetric_link("e12", "e21", "n1", "n2", LinkAttributes::from_distance(100.0)).unwrap();
        engine.add_symmetric_link("e13", "e31", "n1", "n3", LinkAttributes::from_distance(120.0)).unwrap();
        engine.add_symmetric_link("e23", "e32", "n2", "n3", LinkAttributes::from_distance(150.0)).unwrap();
        engine.set_operation_mode(mode);
        engine.configure_algorithm(AlgorithmId::DistanceKtc).unwrap();
        engine
    }

    #[test]
    fn test_configure_requires_mode() {
        let mut engine = ClassificationEngine::new();
        assert!(matches!(
            engine.configure_algorithm(AlgorithmId::DistanceKtc),
            Err(EngineError::OperationModeNotSet)
        ));
    }

    #[test]
    fn test_run_requires_algorithm_and_valid_k() {
        let mut engine = ClassificationEngine::new();
        engine.set_operation_mode(OperationMode::Batch);
        assert!(matches!(engine.run(1.5), Err(EngineError::AlgorithmNotConfigured)));
        engine.configure_algorithm(AlgorithmId::DistanceKtc).unwrap();
        assert!(matches!(engine.run(f64::NAN), Err(EngineError::InvalidK(_))));
        assert!(matches!(engine.run(f64::INFINITY), Err(EngineError::InvalidK(_))));
        assert!(engine.run(1.5).is_ok());
    }

    #[test]
    fn test_batch_run_is_idempotent() {
        let mut engine = engine(OperationMode::Batch);
        let first = engine.run(1.41).unwrap();
        assert_eq!(first.changed, 6);
        assert_eq!(engine.link_state("e23"), Some(LinkState::Inactive));
        let second = engine.run(1.41).unwrap();
        assert_eq!(second.changed, 0);
        assert_eq!(second.decided, 6);
    }

    #[test]
    fn test_incremental_run_only_decides_unclassified() {
        let mut engine = engine(OperationMode::Incremental);
        assert_eq!(engine.run(1.41).unwrap().decided, 6);
        assert_eq!(engine.run(1.41).unwrap().decided, 0);

        engine.update_link_attribute("e12", LinkAttribute::Weight, 100.0).unwrap();
        let summary = engine.run(1.41).unwrap();
        // e12, its reverse, and the four links sharing a triangle with it
        assert_eq!(summary.decided, 6);
        assert_eq!(summary.changed, 6);
    }

    #[test]
    fn test_configure_unclassifies_everything() {
        let mut engine = engine(OperationMode::Batch);
        engine.run(1.41).unwrap();
        engine.configure_algorithm(AlgorithmId::MaxPower).unwrap();
        assert_eq!(engine.topology().state_counts().unclassified, 6);
        engine.run(1.41).unwrap();
        assert_eq!(engine.topology().state_counts().active, 6);
    }

    #[test]
    fn test_listener_sees_transitions_and_events() {
        let listener = Arc::new(CountingListener::new());
        let mut engine = engine(OperationMode::Incremental);
        engine.add_listener(listener.clone());

        engine.run(1.41).unwrap();
        assert_eq!(listener.transition_count(LinkState::Unclassified, LinkState::Active), 4);
        assert_eq!(listener.transition_count(LinkState::Unclassified, LinkState::Inactive), 2);

        engine.remove_link("e23");
        assert_eq!(listener.event_count("link_removed"), 1);
        assert!(listener.transition_count(LinkState::Active, LinkState::Unclassified) >= 1);
    }

    #[test]
    fn test_removal_invalidates_surviving_reverse() {
        let mut engine = engine(OperationMode::Incremental);
        engine.run(1.41).unwrap();
        engine.remove_link("e12");
        assert_eq!(engine.topology().reverse_link_id("e21"), None);
        assert_eq!(engine.link_state("e21"), Some(LinkState::Unclassified));
        engine.run(1.41).unwrap();
        assert_eq!(engine.topology().state_counts().unclassified, 0);
    }

    #[test]
    fn test_removal_of_unknown_ids_is_noop() {
        let listener = Arc::new(CountingListener::new());
        let mut engine = engine(OperationMode::Incremental);
        engine.add_listener(listener.clone());
        assert!(engine.remove_link("missing").is_none());
        assert!(engine.remove_node("missing").is_none());
        assert_eq!(listener.total_events(), 0);
        assert_eq!(engine.link_count(), 6);
    }

    #[test]
    fn test_energy_update_recomputes_lifetimes() {
        let mut engine = ClassificationEngine::new();
        engine.add_node("n1", Some(100.0)).unwrap();
        engine.add_node("n2", Some(100.0)).unwrap();
        let attrs = LinkAttributes::from_distance(1.0).with_transmission_power(4.0);
        engine.add_symmetric_link("e12", "e21", "n1", "n2", attrs).unwrap();
        engine.set_operation_mode(OperationMode::Incremental);
        engine.configure_algorithm(AlgorithmId::EnergyKtc).unwrap();
        engine.run(2.0).unwrap();

        engine.update_node_attribute("n1", NodeAttribute::RemainingEnergy, 20.0).unwrap();
        let e12 = engine.topology().link("e12").unwrap();
        assert_eq!(e12.attributes().expected_lifetime, Some(5.0));
        assert_eq!(e12.state(), LinkState::Unclassified);
        assert_eq!(engine.topology().node("n1").unwrap().remaining_energy(), Some(20.0));
    }

    #[test]
    fn test_constraint_counter() {
        let mut engine = engine(OperationMode::Incremental);
        let report = engine.check_constraints_after_topology_control();
        // unclassified links before any run
        assert_eq!(report.len(), 6);
        assert_eq!(engine.constraint_violation_count(), 6);

        engine.run(1.41).unwrap();
        assert!(engine.check_constraints_after_topology_control().is_empty());
        assert!(engine.check_constraints_after_context_event().is_empty());
        assert_eq!(engine.constraint_violation_count(), 6);

        engine.reset_constraint_violation_counter();
        assert_eq!(engine.constraint_violation_count(), 0);
    }

    #[test]
    fn test_context_event_check_skipped_in_batch_mode() {
        let mut engine = engine(OperationMode::Batch);
        engine.run(1.41).unwrap();
        engine.topology.set_link_state("e12", LinkState::Inactive).unwrap();
        assert!(engine.check_constraints_after_context_event().is_empty());
        assert!(!engine.check_constraints_after_topology_control().is_empty());
    }
}
