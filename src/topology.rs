//! Topology graph model.
//!
//! A [`Topology`] owns its nodes and links in id-indexed tables. Links are
//! directed; the reverse-link relation is a derived lookup held by the
//! topology, so a link never stores a reference to its partner.
//!
//! ## Determinism Guarantees
//!
//! - Nodes and links iterate in lexicographic id order
//! - Adjacency sets are ordered, so neighbour queries are stable
//! - Removing an absent node or link is a no-op returning `None`

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::{
    Link, LinkAttribute, LinkAttributes, LinkId, LinkState, Node, NodeAttribute, NodeId,
};

/// Error type for topology mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A node with this id already exists.
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),

    /// A link with this id already exists.
    #[error("Link already exists: {0}")]
    DuplicateLink(LinkId),

    /// Referenced node does not exist.
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Referenced link does not exist.
    #[error("Link not found: {0}")]
    UnknownLink(LinkId),

    /// Two links do not connect the same endpoints in opposite directions.
    #[error("Links {forward} and {backward} are not reverse of each other")]
    NotReverse {
        /// First link.
        forward: LinkId,
        /// Second link.
        backward: LinkId,
    },
}

/// Number of links per classification state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    /// ACTIVE links.
    pub active: usize,
    /// INACTIVE links.
    pub inactive: usize,
    /// UNCLASSIFIED links.
    pub unclassified: usize,
}

impl StateCounts {
    /// Total number of links counted.
    pub fn total(&self) -> usize {
        self.active + self.inactive + self.unclassified
    }
}

/// Directed multigraph of nodes and classified links.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Nodes by id.
    nodes: BTreeMap<NodeId, Node>,
    /// Links by id.
    links: BTreeMap<LinkId, Link>,
    /// Node -> ids of links starting there.
    outgoing: BTreeMap<NodeId, BTreeSet<LinkId>>,
    /// Node -> ids of links ending there.
    incoming: BTreeMap<NodeId, BTreeSet<LinkId>>,
    /// Link -> its reverse partner (stored in both directions).
    reverse: BTreeMap<LinkId, LinkId>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Add a node.
    pub fn add_node(
        &mut self,
        id: impl Into<NodeId>,
        remaining_energy: Option<f64>,
    ) -> Result<&Node, TopologyError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        self.outgoing.insert(id.clone(), BTreeSet::new());
        self.incoming.insert(id.clone(), BTreeSet::new());
        let key = id.clone();
        Ok(self
            .nodes
            .entry(key)
            .or_insert_with(move || Node::new(id, remaining_energy)))
    }

    /// Add a directed link `source → target`.
    ///
    /// The link starts UNCLASSIFIED and has no reverse partner.
    pub fn add_link(
        &mut self,
        id: impl Into<LinkId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        attributes: LinkAttributes,
    ) -> Result<&Link, TopologyError> {
        let id = id.into();
        let source = source.into();
        let target = target.into();
        if self.links.contains_key(&id) {
            return Err(TopologyError::DuplicateLink(id));
        }
        self.require_node(&source)?;
        self.require_node(&target)?;
        Ok(self.insert_link(Link::new(id, source, target, attributes)))
    }

    /// Add a pair of opposite links `a → b` (`forward`) and `b → a`
    /// (`backward`) registered as reverse of each other.
    ///
    /// Either both links are added or neither is.
    pub fn add_symmetric_link(
        &mut self,
        forward: impl Into<LinkId>,
        backward: impl Into<LinkId>,
        a: impl Into<NodeId>,
        b: impl Into<NodeId>,
        attributes: LinkAttributes,
    ) -> Result<&Link, TopologyError> {
        let forward = forward.into();
        let backward = backward.into();
        let a = a.into();
        let b = b.into();
        if self.links.contains_key(&forward) {
            return Err(TopologyError::DuplicateLink(forward));
        }
        if forward == backward || self.links.contains_key(&backward) {
            return Err(TopologyError::DuplicateLink(backward));
        }
        self.require_node(&a)?;
        self.require_node(&b)?;

        self.insert_link(Link::new(backward.clone(), b.clone(), a.clone(), attributes));
        self.insert_link(Link::new(forward.clone(), a, b, attributes));
        self.pair(&forward, &backward);
        self.links
            .get(&forward)
            .ok_or(TopologyError::UnknownLink(forward))
    }

    /// Register two existing opposite links as reverse of each other.
    ///
    /// Any previous pairing of either link is dissolved.
    pub fn connect_reverse(&mut self, forward: &str, backward: &str) -> Result<(), TopologyError> {
        let first = self.require_link(forward)?;
        let second = self.require_link(backward)?;
        if forward == backward || !first.is_opposite_of(second) {
            return Err(TopologyError::NotReverse {
                forward: first.id().clone(),
                backward: second.id().clone(),
            });
        }
        let forward = first.id().clone();
        let backward = second.id().clone();
        self.unpair(forward.as_str());
        self.unpair(backward.as_str());
        self.pair(&forward, &backward);
        Ok(())
    }

    /// Remove a link. Returns `None` if no such link exists.
    pub fn remove_link(&mut self, id: &str) -> Option<Link> {
        let link = self.links.remove(id)?;
        if let Some(out) = self.outgoing.get_mut(link.source()) {
            out.remove(id);
        }
        if let Some(inc) = self.incoming.get_mut(link.target()) {
            inc.remove(id);
        }
        if let Some(node) = self.nodes.get_mut(link.source()) {
            node.decrement_out_degree();
        }
        if let Some(node) = self.nodes.get_mut(link.target()) {
            node.decrement_in_degree();
        }
        self.unpair(id);
        Some(link)
    }

    /// Remove a node together with all incident links.
    ///
    /// Returns `None` if no such node exists.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        for link in self.incident_link_ids(id) {
            self.remove_link(link.as_str());
        }
        self.outgoing.remove(id);
        self.incoming.remove(id);
        self.nodes.remove(id)
    }

    /// Set the classification state of a link, returning the previous state.
    pub fn set_link_state(&mut self, id: &str, state: LinkState) -> Result<LinkState, TopologyError> {
        let link = self
            .links
            .get_mut(id)
            .ok_or_else(|| TopologyError::UnknownLink(LinkId::new(id)))?;
        Ok(link.set_state(state))
    }

    /// Set a link attribute, returning the link's state before the update.
    ///
    /// A classification-relevant update marks the link UNCLASSIFIED.
    pub fn set_link_attribute(
        &mut self,
        id: &str,
        attribute: LinkAttribute,
        value: f64,
    ) -> Result<LinkState, TopologyError> {
        let link = self
            .links
            .get_mut(id)
            .ok_or_else(|| TopologyError::UnknownLink(LinkId::new(id)))?;
        let previous = link.state();
        link.set_attribute(attribute, value);
        if attribute.is_classification_relevant() {
            link.set_state(LinkState::Unclassified);
        }
        Ok(previous)
    }

    /// Set a node attribute.
    pub fn set_node_attribute(
        &mut self,
        id: &str,
        attribute: NodeAttribute,
        value: f64,
    ) -> Result<(), TopologyError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TopologyError::UnknownNode(NodeId::new(id)))?;
        node.set_attribute(attribute, value);
        Ok(())
    }

    /// Mark every link UNCLASSIFIED. Returns the number of links that changed.
    pub fn unclassify_all(&mut self) -> usize {
        let mut changed = 0;
        for link in self.links.values_mut() {
            if link.set_state(LinkState::Unclassified) != LinkState::Unclassified {
                changed += 1;
            }
        }
        changed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// Node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Link by id.
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether a link with this id exists.
    pub fn contains_link(&self, id: &str) -> bool {
        self.links.contains_key(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All links, ordered by id.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// All node ids, ordered.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// All link ids, ordered.
    pub fn link_ids(&self) -> impl Iterator<Item = &LinkId> {
        self.links.keys()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the topology has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the reverse partner of a link.
    pub fn reverse_link_id(&self, id: &str) -> Option<&LinkId> {
        self.reverse.get(id)
    }

    /// Reverse partner of a link.
    pub fn reverse_link(&self, id: &str) -> Option<&Link> {
        self.reverse.get(id).and_then(|partner| self.links.get(partner))
    }

    /// Links starting at `node`, ordered by id.
    pub fn outgoing_links<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.outgoing
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.links.get(id))
    }

    /// Links ending at `node`, ordered by id.
    pub fn incoming_links<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.incoming
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.links.get(id))
    }

    /// Ids of all links incident to `node`.
    pub fn incident_link_ids(&self, node: &str) -> BTreeSet<LinkId> {
        self.outgoing
            .get(node)
            .into_iter()
            .chain(self.incoming.get(node))
            .flatten()
            .cloned()
            .collect()
    }

    /// All links `source → target`, ordered by id.
    pub fn links_between(&self, source: &str, target: &str) -> Vec<&Link> {
        self.outgoing_links(source)
            .filter(|link| link.target().as_str() == target)
            .collect()
    }

    /// Targets of links starting at `node`.
    pub fn successors(&self, node: &str) -> BTreeSet<&NodeId> {
        self.outgoing_links(node).map(Link::target).collect()
    }

    /// Sources of links ending at `node`.
    pub fn predecessors(&self, node: &str) -> BTreeSet<&NodeId> {
        self.incoming_links(node).map(Link::source).collect()
    }

    /// Nodes adjacent to `node` in either direction, excluding `node` itself.
    pub fn neighbors(&self, node: &str) -> BTreeSet<&NodeId> {
        let mut neighbors = self.successors(node);
        neighbors.extend(self.predecessors(node));
        neighbors.retain(|n| n.as_str() != node);
        neighbors
    }

    /// Links that can appear together with `id` in a triangle.
    ///
    /// For a link between `u` and `v` these are all links connecting a common
    /// neighbour `w` of `u` and `v` with `u` or `v`, in either direction.
    /// The link itself is not included.
    pub fn links_sharing_triangle(&self, id: &str) -> BTreeSet<LinkId> {
        let mut related = BTreeSet::new();
        let Some(link) = self.links.get(id) else {
            return related;
        };
        if link.is_loop() {
            return related;
        }
        let (u, v) = (link.source(), link.target());
        let around_v = self.neighbors(v.as_str());
        for w in self.neighbors(u.as_str()) {
            if w == v || !around_v.contains(w) {
                continue;
            }
            for candidate in self.outgoing_links(w.as_str()).chain(self.incoming_links(w.as_str())) {
                if candidate.is_incident_to(u.as_str()) || candidate.is_incident_to(v.as_str()) {
                    related.insert(candidate.id().clone());
                }
            }
        }
        related
    }

    // ─────────────────────────────────────────────────────────────────────
    // Analysis
    // ─────────────────────────────────────────────────────────────────────

    /// Number of links per state.
    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for link in self.links.values() {
            match link.state() {
                LinkState::Active => counts.active += 1,
                LinkState::Inactive => counts.inactive += 1,
                LinkState::Unclassified => counts.unclassified += 1,
            }
        }
        counts
    }

    /// Weakly connected components of the subgraph formed by all nodes and
    /// the links whose state is in `states`. Components are ordered by their
    /// smallest node id.
    pub fn connected_components(&self, states: &[LinkState]) -> Vec<BTreeSet<NodeId>> {
        let mut unvisited: BTreeSet<&NodeId> = self.nodes.keys().collect();
        let mut components = Vec::new();

        while let Some(start) = unvisited.pop_first() {
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                component.insert(node.clone());
                let incident = self
                    .outgoing_links(node.as_str())
                    .chain(self.incoming_links(node.as_str()))
                    .filter(|link| states.contains(&link.state()));
                for link in incident {
                    for next in [link.source(), link.target()] {
                        if unvisited.remove(next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Whether the links in the given states connect all nodes, ignoring
    /// direction. Empty and single-node topologies are connected.
    pub fn is_weakly_connected(&self, states: &[LinkState]) -> bool {
        self.connected_components(states).len() <= 1
    }

    /// Whether all links, regardless of state, connect all nodes.
    pub fn is_physically_connected(&self) -> bool {
        self.is_weakly_connected(&LinkState::ALL)
    }

    /// Human-readable summary of all link states.
    ///
    /// The first line reads `#A : x || #I : y || #U : z`; each following line
    /// lists one link as `id (source -> target) : S`.
    pub fn format_state_report(&self) -> String {
        let counts = self.state_counts();
        let mut report = format!(
            "#A : {} || #I : {} || #U : {}",
            counts.active, counts.inactive, counts.unclassified
        );
        for link in self.links.values() {
            report.push_str(&format!(
                "\n{} ({} -> {}) : {}",
                link.id(),
                link.source(),
                link.target(),
                link.state().symbol()
            ));
        }
        report
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn require_node(&self, id: &NodeId) -> Result<(), TopologyError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(TopologyError::UnknownNode(id.clone()))
        }
    }

    fn require_link(&self, id: &str) -> Result<&Link, TopologyError> {
        self.links
            .get(id)
            .ok_or_else(|| TopologyError::UnknownLink(LinkId::new(id)))
    }

    fn insert_link(&mut self, link: Link) -> &Link {
        let id = link.id().clone();
        self.outgoing
            .entry(link.source().clone())
            .or_default()
            .insert(id.clone());
        self.incoming
            .entry(link.target().clone())
            .or_default()
            .insert(id.clone());
        if let Some(node) = self.nodes.get_mut(link.source()) {
            node.increment_out_degree();
        }
        if let Some(node) = self.nodes.get_mut(link.target()) {
            node.increment_in_degree();
        }
        self.links.entry(id).or_insert(link)
    }

    fn pair(&mut self, forward: &LinkId, backward: &LinkId) {
        self.reverse.insert(forward.clone(), backward.clone());
        self.reverse.insert(backward.clone(), forward.clone());
    }

    fn unpair(&mut self, id: &str) {
        if let Some(partner) = self.reverse.remove(id) {
            self.reverse.remove(&partner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Topology {
        let mut topology = Topology::new();
        for id in ["n1", "n2", "n3"] {
            topology.add_node(id, None).unwrap();
        }
        topology
            .add_symmetric_link("e12", "e21", "n1", "n2", LinkAttributes::from_distance(100.0))
            .unwrap();
        topology
            .add_symmetric_link("e13", "e31", "n1", "n3", LinkAttributes::from_distance(120.0))
            .unwrap();
        topology
            .add_symmetric_link("e23", "e32", "n2", "n3", LinkAttributes::from_distance(150.0))
            .unwrap();
        topology
    }

    #[test]
    fn test_add_link_requires_endpoints() {
        let mut topology = Topology::new();
        topology.add_node("n1", None).unwrap();
        let err = topology
            .add_link("e12", "n1", "n2", LinkAttributes::default())
            .unwrap_err();
        assert_eq!(err, TopologyError::UnknownNode(NodeId::new("n2")));
        assert_eq!(topology.link_count(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut topology = triangle();
        assert_eq!(
            topology.add_node("n1", None).unwrap_err(),
            TopologyError::DuplicateNode(NodeId::new("n1"))
        );
        assert!(matches!(
            topology.add_link("e12", "n1", "n3", LinkAttributes::default()),
            Err(TopologyError::DuplicateLink(_))
        ));
    }

    #[test]
    fn test_symmetric_link_is_atomic() {
        let mut topology = triangle();
        // backward id collides: nothing must be inserted
        let result = topology.add_symmetric_link(
            "e14",
            "e21",
            "n1",
            "n3",
            LinkAttributes::from_distance(1.0),
        );
        assert!(result.is_err());
        assert!(!topology.contains_link("e14"));
        assert_eq!(topology.link_count(), 6);
    }

    #[test]
    fn test_reverse_lookup() {
        let topology = triangle();
        assert_eq!(topology.reverse_link_id("e12"), Some(&LinkId::new("e21")));
        assert_eq!(topology.reverse_link("e21").map(Link::id), Some(&LinkId::new("e12")));
    }

    #[test]
    fn test_connect_reverse_validates_direction() {
        let mut topology = Topology::new();
        topology.add_node("a", None).unwrap();
        topology.add_node("b", None).unwrap();
        topology.add_link("ab", "a", "b", LinkAttributes::default()).unwrap();
        topology.add_link("ab2", "a", "b", LinkAttributes::default()).unwrap();
        topology.add_link("ba", "b", "a", LinkAttributes::default()).unwrap();

        assert!(matches!(
            topology.connect_reverse("ab", "ab2"),
            Err(TopologyError::NotReverse { .. })
        ));
        topology.connect_reverse("ab", "ba").unwrap();
        assert_eq!(topology.reverse_link_id("ba"), Some(&LinkId::new("ab")));

        // re-pairing dissolves the old pair
        topology.connect_reverse("ab2", "ba").unwrap();
        assert_eq!(topology.reverse_link_id("ab"), None);
        assert_eq!(topology.reverse_link_id("ab2"), Some(&LinkId::new("ba")));
    }

    #[test]
    fn test_degrees_follow_mutations() {
        let mut topology = triangle();
        let n1 = topology.node("n1").unwrap();
        assert_eq!((n1.in_degree(), n1.out_degree()), (2, 2));

        topology.remove_link("e12");
        let n1 = topology.node("n1").unwrap();
        assert_eq!((n1.in_degree(), n1.out_degree()), (2, 1));
        assert_eq!(topology.node("n2").unwrap().in_degree(), 1);
        assert_eq!(topology.reverse_link_id("e21"), None);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut topology = triangle();
        let removed = topology.remove_node("n1");
        assert!(removed.is_some());
        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.link_count(), 2);
        assert!(topology.links().all(|l| !l.is_incident_to("n1")));
        let n2 = topology.node("n2").unwrap();
        assert_eq!((n2.in_degree(), n2.out_degree()), (1, 1));
    }

    #[test]
    fn test_removal_of_absent_ids_is_noop() {
        let mut topology = triangle();
        assert!(topology.remove_link("missing").is_none());
        assert!(topology.remove_node("missing").is_none());
        assert!(topology.remove_link("e12").is_some());
        assert!(topology.remove_link("e12").is_none());
        assert_eq!(topology.link_count(), 5);
    }

    #[test]
    fn test_links_between_handles_parallel_links() {
        let mut topology = triangle();
        topology
            .add_link("e12b", "n1", "n2", LinkAttributes::from_distance(1.0))
            .unwrap();
        let ids: Vec<_> = topology
            .links_between("n1", "n2")
            .into_iter()
            .map(|l| l.id().as_str())
            .collect();
        assert_eq!(ids, vec!["e12", "e12b"]);
        assert!(topology.links_between("n1", "missing").is_empty());
    }

    #[test]
    fn test_links_sharing_triangle() {
        let mut topology = triangle();
        topology.add_node("n4", None).unwrap();
        topology
            .add_symmetric_link("e34", "e43", "n3", "n4", LinkAttributes::from_distance(1.0))
            .unwrap();

        let related: Vec<_> = topology
            .links_sharing_triangle("e23")
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(related, vec!["e12", "e13", "e21", "e31"]);
        assert!(topology.links_sharing_triangle("e34").is_empty());
        assert!(topology.links_sharing_triangle("missing").is_empty());
    }

    #[test]
    fn test_attribute_update_unclassifies() {
        let mut topology = triangle();
        topology.set_link_state("e12", LinkState::Active).unwrap();
        let previous = topology
            .set_link_attribute("e12", LinkAttribute::Weight, 7.0)
            .unwrap();
        assert_eq!(previous, LinkState::Active);
        assert_eq!(topology.link("e12").unwrap().state(), LinkState::Unclassified);
        assert_eq!(topology.link("e12").unwrap().weight(), Some(7.0));

        topology.set_link_state("e13", LinkState::Active).unwrap();
        topology
            .set_link_attribute("e13", LinkAttribute::TransmissionPower, 2.0)
            .unwrap();
        assert_eq!(topology.link("e13").unwrap().state(), LinkState::Active);
    }

    #[test]
    fn test_connectivity_by_state() {
        let mut topology = triangle();
        topology.add_node("n4", None).unwrap();
        assert!(!topology.is_physically_connected());

        topology
            .add_symmetric_link("e34", "e43", "n3", "n4", LinkAttributes::from_distance(1.0))
            .unwrap();
        assert!(topology.is_physically_connected());
        assert!(!topology.is_weakly_connected(&[LinkState::Active]));

        for id in ["e34", "e12", "e13"] {
            topology.set_link_state(id, LinkState::Active).unwrap();
        }
        assert!(topology.is_weakly_connected(&[LinkState::Active]));
        assert_eq!(topology.connected_components(&[LinkState::Inactive]).len(), 4);
    }

    #[test]
    fn test_state_report() {
        let mut topology = triangle();
        topology.set_link_state("e23", LinkState::Inactive).unwrap();
        topology.set_link_state("e12", LinkState::Active).unwrap();
        let report = topology.format_state_report();
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some("#A : 1 || #I : 1 || #U : 4"));
        assert_eq!(lines.next(), Some("e12 (n1 -> n2) : A"));
        assert!(report.contains("e23 (n2 -> n3) : I"));
    }

    #[test]
    fn test_unclassify_all_counts_changes() {
        let mut topology = triangle();
        topology.set_link_state("e12", LinkState::Active).unwrap();
        topology.set_link_state("e21", LinkState::Inactive).unwrap();
        assert_eq!(topology.unclassify_all(), 2);
        assert_eq!(topology.state_counts().unclassified, 6);
    }
}
