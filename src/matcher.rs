//! Backtracking pattern matcher.
//!
//! Finds all injective embeddings of a [`TopologyPattern`] into a
//! [`Topology`], rooted at a given local node.
//!
//! ## Algorithm
//!
//! 1. Order node variables by BFS depth from the pattern origin (ties by
//!    name); variables unreachable from the origin come last
//! 2. For each variable pick candidates: the local node for the origin, the
//!    input binding if one exists, otherwise the host neighbours of the
//!    already bound BFS parent (or every host node if there is none)
//! 3. Bind node variables depth-first on an explicit frame stack, skipping
//!    nodes already bound to another variable
//! 4. Once all nodes are bound, enumerate every combination of concrete links
//!    between the bound endpoints (parallel links yield separate matches),
//!    skipping links already bound to another variable
//! 5. Keep a combination if all constraints hold and no negative application
//!    condition can be extended from it
//!
//! ## Determinism Guarantees
//!
//! - Candidate lists are ordered by node id, parallel links by link id
//! - The same pattern, topology, and local node always yield the same
//!   matches in the same order

use std::ops::ControlFlow;

use crate::pattern::{
    BoundElement, BoundLink, Constraint, ConstraintVariable, NodeVariable, TopologyPattern,
    VariableAssignment,
};
use crate::topology::Topology;
use crate::types::{LinkId, NodeId};

/// One embedding of a pattern into a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyPatternMatch {
    assignment: VariableAssignment,
}

impl TopologyPatternMatch {
    /// The complete variable assignment of this match.
    pub fn assignment(&self) -> &VariableAssignment {
        &self.assignment
    }

    /// Node bound to a node variable.
    pub fn node(&self, variable: &str) -> Option<&NodeId> {
        self.assignment.node_binding(variable)
    }

    /// Link bound to a link variable.
    pub fn link(&self, variable: &str) -> Option<&LinkId> {
        self.assignment.link_binding(variable)
    }

    /// Consume the match, returning its assignment.
    pub fn into_assignment(self) -> VariableAssignment {
        self.assignment
    }
}

/// How the candidates of a node variable are derived.
#[derive(Debug, Clone)]
enum Anchor {
    /// Every host node.
    Free,
    /// Targets of links leaving the parent's binding.
    SuccessorOf(NodeVariable),
    /// Sources of links entering the parent's binding.
    PredecessorOf(NodeVariable),
}

#[derive(Debug, Clone)]
struct Step {
    variable: NodeVariable,
    anchor: Anchor,
}

struct Frame {
    step: usize,
    candidates: Vec<NodeId>,
    cursor: usize,
}

impl Frame {
    fn new(step: usize, candidates: Vec<NodeId>) -> Self {
        Self {
            step,
            candidates,
            cursor: 0,
        }
    }

    fn next_candidate(&mut self, assignment: &VariableAssignment) -> Option<NodeId> {
        while let Some(candidate) = self.candidates.get(self.cursor) {
            self.cursor += 1;
            if !assignment.is_node_bound(candidate.as_str()) {
                return Some(candidate.clone());
            }
        }
        None
    }
}

/// Matcher for one pattern. Construction precomputes the traversal plan of
/// the pattern and of all its negative application conditions.
pub struct PatternMatcher<'p> {
    pattern: &'p TopologyPattern,
    plan: Vec<Step>,
    nacs: Vec<PatternMatcher<'p>>,
}

impl<'p> PatternMatcher<'p> {
    /// Create a matcher for `pattern`.
    pub fn new(pattern: &'p TopologyPattern) -> Self {
        Self {
            pattern,
            plan: traversal_plan(pattern),
            nacs: pattern
                .negative_application_conditions()
                .iter()
                .map(PatternMatcher::new)
                .collect(),
        }
    }

    /// The pattern being matched.
    pub fn pattern(&self) -> &'p TopologyPattern {
        self.pattern
    }

    /// All matches rooted at every node of the topology, in node id order.
    pub fn match_all(&self, topology: &Topology) -> Vec<TopologyPatternMatch> {
        topology
            .node_ids()
            .flat_map(|node| self.match_local(node.as_str(), topology))
            .collect()
    }

    /// All matches rooted at `local`.
    pub fn match_local(&self, local: &str, topology: &Topology) -> Vec<TopologyPatternMatch> {
        self.match_local_with(local, topology, &VariableAssignment::new())
    }

    /// All matches rooted at `local` that agree with the bindings in `input`.
    pub fn match_local_with(
        &self,
        local: &str,
        topology: &Topology,
        input: &VariableAssignment,
    ) -> Vec<TopologyPatternMatch> {
        let mut matches = Vec::new();
        let _ = self.search(local, topology, input, &mut |assignment| {
            matches.push(TopologyPatternMatch { assignment });
            ControlFlow::Continue(())
        });
        matches
    }

    /// Whether at least one match is rooted at `local`.
    pub fn has_match(&self, local: &str, topology: &Topology) -> bool {
        self.has_match_with(local, topology, &VariableAssignment::new())
    }

    /// Whether at least one match rooted at `local` agrees with `input`.
    /// Stops at the first match found.
    pub fn has_match_with(&self, local: &str, topology: &Topology, input: &VariableAssignment) -> bool {
        let mut found = false;
        let _ = self.search(local, topology, input, &mut |_| {
            found = true;
            ControlFlow::Break(())
        });
        found
    }

    /// Number of matches rooted at `local`.
    pub fn count_matches(&self, local: &str, topology: &Topology) -> usize {
        self.count_matches_with(local, topology, &VariableAssignment::new())
    }

    /// Number of matches rooted at `local` that agree with `input`.
    pub fn count_matches_with(&self, local: &str, topology: &Topology, input: &VariableAssignment) -> usize {
        let mut count = 0;
        let _ = self.search(local, topology, input, &mut |_| {
            count += 1;
            ControlFlow::Continue(())
        });
        count
    }

    fn search<F>(
        &self,
        local: &str,
        topology: &Topology,
        input: &VariableAssignment,
        on_match: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(VariableAssignment) -> ControlFlow<()>,
    {
        if !topology.contains_node(local) {
            return ControlFlow::Continue(());
        }
        let dangling_input = input.node_bindings().any(|(variable, node)| {
            self.pattern.has_node_variable(variable.as_str()) && !topology.contains_node(node.as_str())
        });
        if dangling_input {
            return ControlFlow::Continue(());
        }

        let mut assignment = VariableAssignment::new();
        let mut stack = vec![Frame::new(0, self.candidates(0, local, topology, input, &assignment))];

        while !stack.is_empty() {
            let top = stack.len() - 1;
            let step = stack[top].step;
            let variable = &self.plan[step].variable;
            assignment.unbind_node(variable.as_str());

            let Some(node) = stack[top].next_candidate(&assignment) else {
                stack.pop();
                continue;
            };
            if assignment.bind_node(variable.clone(), node).is_err() {
                continue;
            }

            if step + 1 < self.plan.len() {
                let candidates = self.candidates(step + 1, local, topology, input, &assignment);
                stack.push(Frame::new(step + 1, candidates));
                continue;
            }

            for complete in self.complete_links(&assignment, topology, input) {
                if self.accepts(&complete, local, topology) {
                    on_match(complete)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn candidates(
        &self,
        step: usize,
        local: &str,
        topology: &Topology,
        input: &VariableAssignment,
        assignment: &VariableAssignment,
    ) -> Vec<NodeId> {
        let step = &self.plan[step];
        if let Some(bound) = input.node_binding(step.variable.as_str()) {
            return vec![bound.clone()];
        }
        if step.variable == *self.pattern.origin() {
            return vec![NodeId::new(local)];
        }
        match &step.anchor {
            Anchor::Free => topology.node_ids().cloned().collect(),
            Anchor::SuccessorOf(parent) => assignment
                .node_binding(parent.as_str())
                .map(|p| topology.successors(p.as_str()).into_iter().cloned().collect())
                .unwrap_or_default(),
            Anchor::PredecessorOf(parent) => assignment
                .node_binding(parent.as_str())
                .map(|p| topology.predecessors(p.as_str()).into_iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Extend a full node assignment with every injective choice of links.
    fn complete_links(
        &self,
        nodes: &VariableAssignment,
        topology: &Topology,
        input: &VariableAssignment,
    ) -> Vec<VariableAssignment> {
        let mut partial = vec![nodes.clone()];
        for pattern_link in self.pattern.links() {
            let (Some(source), Some(target)) = (
                nodes.node_binding(pattern_link.source.as_str()),
                nodes.node_binding(pattern_link.target.as_str()),
            ) else {
                return Vec::new();
            };
            let connecting: Vec<&LinkId> = match input.link_binding(pattern_link.variable.as_str()) {
                Some(bound) => topology
                    .link(bound.as_str())
                    .filter(|l| l.source() == source && l.target() == target)
                    .map(|l| l.id())
                    .into_iter()
                    .collect(),
                None => topology
                    .links_between(source.as_str(), target.as_str())
                    .into_iter()
                    .map(|l| l.id())
                    .collect(),
            };

            let mut extended = Vec::with_capacity(partial.len() * connecting.len());
            for assignment in &partial {
                for link in &connecting {
                    if assignment.is_link_bound(link.as_str()) {
                        continue;
                    }
                    let mut next = assignment.clone();
                    if next.bind_link(pattern_link.variable.clone(), (*link).clone()).is_ok() {
                        extended.push(next);
                    }
                }
            }
            if extended.is_empty() {
                return extended;
            }
            partial = extended;
        }
        partial
    }

    fn accepts(&self, assignment: &VariableAssignment, local: &str, topology: &Topology) -> bool {
        self.pattern
            .constraints()
            .iter()
            .all(|constraint| constraint_holds(constraint, assignment, topology))
            && !self
                .nacs
                .iter()
                .any(|nac| nac.has_match_with(local, topology, assignment))
    }
}

fn constraint_holds(constraint: &Constraint, assignment: &VariableAssignment, topology: &Topology) -> bool {
    let elements: Option<Vec<BoundElement<'_>>> = constraint
        .variables()
        .into_iter()
        .map(|variable| resolve(variable, assignment, topology))
        .collect();
    elements.is_some_and(|elements| constraint.is_fulfilled(&elements))
}

fn resolve<'t>(
    variable: ConstraintVariable<'_>,
    assignment: &VariableAssignment,
    topology: &'t Topology,
) -> Option<BoundElement<'t>> {
    match variable {
        ConstraintVariable::Node(v) => {
            let node = topology.node(assignment.node_binding(v.as_str())?.as_str())?;
            Some(BoundElement::Node(node))
        }
        ConstraintVariable::Link(v) => {
            let link = topology.link(assignment.link_binding(v.as_str())?.as_str())?;
            Some(BoundElement::Link(BoundLink {
                link,
                reverse: topology.reverse_link(link.id().as_str()),
            }))
        }
    }
}

/// Order node variables and choose the parent each one is reached from.
fn traversal_plan(pattern: &TopologyPattern) -> Vec<Step> {
    let depths = pattern.variable_depths();
    let mut ordered: Vec<(usize, &NodeVariable)> = pattern
        .node_variables()
        .map(|variable| (depths.get(variable).copied().unwrap_or(usize::MAX), variable))
        .collect();
    ordered.sort();

    let mut plan: Vec<Step> = Vec::with_capacity(ordered.len());
    for (_, variable) in ordered {
        let placed = |candidate: &NodeVariable| plan.iter().any(|step| step.variable == *candidate);
        let anchor = pattern
            .links()
            .find_map(|link| {
                if link.target == *variable && link.source != *variable && placed(&link.source) {
                    Some(Anchor::SuccessorOf(link.source.clone()))
                } else if link.source == *variable && link.target != *variable && placed(&link.target) {
                    Some(Anchor::PredecessorOf(link.target.clone()))
                } else {
                    None
                }
            })
            .unwrap_or(Anchor::Free);
        plan.push(Step {
            variable: variable.clone(),
            anchor,
        });
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{ComparisonOperator, KtcCriterion, PatternBuilder};
    use crate::types::{LinkAttribute, LinkAttributes};

    fn nodes(topology: &mut Topology, ids: &[&str]) {
        for id in ids {
            topology.add_node(*id, None).unwrap();
        }
    }

    fn symmetric_triangle() -> Topology {
        let mut topology = Topology::new();
        nodes(&mut topology, &["n1", "n2", "n3"]);
        topology.add_symmetric_link("e12", "e21", "n1", "n2", LinkAttributes::from_distance(1.0)).unwrap();
        topology.add_symmetric_link("e13", "e31", "n1", "n3", LinkAttributes::from_distance(2.0)).unwrap();
        topology.add_symmetric_link("e23", "e32", "n2", "n3", LinkAttributes::from_distance(1.0)).unwrap();
        topology
    }

    fn triangle_pattern(k: f64) -> TopologyPattern {
        PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .directed_link("u", "e1", "w")
            .directed_link("w", "e2", "v")
            .constraint(Constraint::ktc_triangle("e", "e1", "e2", k, KtcCriterion::Weight))
            .build()
            .unwrap()
    }

    #[test]
    fn test_chain_on_symmetric_triangle() {
        let pattern = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "a", "v")
            .directed_link("v", "b", "w")
            .build()
            .unwrap();
        let matcher = PatternMatcher::new(&pattern);
        let topology = symmetric_triangle();
        assert_eq!(matcher.count_matches("n1", &topology), 2);
        for m in matcher.match_local("n1", &topology) {
            assert_eq!(m.node("u"), Some(&NodeId::new("n1")));
            assert_ne!(m.node("v"), m.node("w"));
        }
    }

    #[test]
    fn test_parallel_links_multiply_matches() {
        let mut topology = Topology::new();
        nodes(&mut topology, &["n1", "n2"]);
        topology.add_link("a", "n1", "n2", LinkAttributes::default()).unwrap();
        topology.add_link("b", "n1", "n2", LinkAttributes::default()).unwrap();

        let single = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .build()
            .unwrap();
        assert_eq!(PatternMatcher::new(&single).count_matches("n1", &topology), 2);

        // two link variables over the same endpoints never share a link
        let double = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .directed_link("u", "f", "v")
            .build()
            .unwrap();
        let matches = PatternMatcher::new(&double).match_local("n1", &topology);
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_ne!(m.link("e"), m.link("f"));
        }
    }

    #[test]
    fn test_parallel_triangle_links() {
        let mut topology = symmetric_triangle();
        topology.add_link("e13b", "n1", "n3", LinkAttributes::from_distance(2.0)).unwrap();
        topology.add_link("e32b", "n3", "n2", LinkAttributes::from_distance(1.0)).unwrap();
        let pattern = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e1", "w")
            .directed_link("w", "e2", "v")
            .directed_link("u", "e", "v")
            .build()
            .unwrap();
        let matcher = PatternMatcher::new(&pattern);
        // (e, e1, e2) choices: v = n2, w = n3 gives 1 × 2 × 2; v = n3, w = n2 gives 2 × 1 × 1
        assert_eq!(matcher.count_matches("n1", &topology), 6);
    }

    #[test]
    fn test_ktc_constraint_filters_matches() {
        let topology = symmetric_triangle();
        let pattern = triangle_pattern(1.5);
        let matcher = PatternMatcher::new(&pattern);
        let all = matcher.match_all(&topology);
        // e13 and e31 (weight 2) exceed 1.5 × 1
        let mut inactive: Vec<_> = all.iter().filter_map(|m| m.link("e")).map(|l| l.as_str()).collect();
        inactive.sort();
        assert_eq!(inactive, vec!["e13", "e31"]);

        let lenient = triangle_pattern(2.5);
        assert!(PatternMatcher::new(&lenient).match_all(&topology).is_empty());
    }

    #[test]
    fn test_match_all_with_scalar_constraint() {
        let topology = symmetric_triangle();
        let pattern = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .constraint(Constraint::LinkScalar {
                link: "e".into(),
                attribute: LinkAttribute::Weight,
                operator: ComparisonOperator::Equal,
                value: 1.0,
            })
            .build()
            .unwrap();
        assert_eq!(PatternMatcher::new(&pattern).match_all(&topology).len(), 4);
    }

    #[test]
    fn test_nac_rejects_bidirectional_links() {
        let mut topology = Topology::new();
        nodes(&mut topology, &["n1", "n2", "n3"]);
        topology.add_symmetric_link("e12", "e21", "n1", "n2", LinkAttributes::default()).unwrap();
        topology.add_link("e13", "n1", "n3", LinkAttributes::default()).unwrap();

        let nac = PatternBuilder::new().directed_link("v", "back", "u").build_nac().unwrap();
        let pattern = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .nac(nac)
            .build()
            .unwrap();
        let matches = PatternMatcher::new(&pattern).match_local("n1", &topology);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].link("e"), Some(&LinkId::new("e13")));
    }

    #[test]
    fn test_nac_with_unanchored_variables() {
        let mut topology = Topology::new();
        nodes(&mut topology, &["n1", "n2", "n3"]);
        topology.add_link("e23", "n2", "n3", LinkAttributes::default()).unwrap();

        // reject the local node if a link exists elsewhere
        let nac = PatternBuilder::new().directed_link("x", "far", "y").build_nac().unwrap();
        let pattern = PatternBuilder::new().local_node("u").nac(nac).build().unwrap();
        let matcher = PatternMatcher::new(&pattern);
        assert!(!matcher.has_match("n1", &topology));
        assert!(matcher.has_match("n2", &topology));
        assert!(matcher.has_match("n3", &topology));
    }

    #[test]
    fn test_input_bindings_restrict_candidates() {
        let topology = symmetric_triangle();
        let pattern = PatternBuilder::new()
            .local_node("u")
            .directed_link("u", "e", "v")
            .build()
            .unwrap();
        let matcher = PatternMatcher::new(&pattern);

        let mut input = VariableAssignment::new();
        input.bind_node("v".into(), "n3".into()).unwrap();
        let matches = matcher.match_local_with("n1", &topology, &input);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].link("e"), Some(&LinkId::new("e13")));
        assert_eq!(matcher.count_matches_with("n1", &topology, &input), 1);
        assert_eq!(matcher.count_matches("n1", &topology), 2);

        let mut wrong_link = VariableAssignment::new();
        wrong_link.bind_link("e".into(), "e23".into()).unwrap();
        assert!(!matcher.has_match_with("n1", &topology, &wrong_link));
        assert_eq!(matcher.count_matches_with("n1", &topology, &wrong_link), 0);

        let mut dangling = VariableAssignment::new();
        dangling.bind_node("v".into(), "n9".into()).unwrap();
        assert!(matcher.match_local_with("n1", &topology, &dangling).is_empty());
    }

    #[test]
    fn test_absent_local_node_yields_nothing() {
        let topology = symmetric_triangle();
        let pattern = triangle_pattern(1.0);
        let matcher = PatternMatcher::new(&pattern);
        assert!(matcher.match_local("missing", &topology).is_empty());
        assert_eq!(matcher.count_matches("missing", &topology), 0);
    }

    #[test]
    fn test_traversal_plan_anchors() {
        let pattern = triangle_pattern(1.0);
        let plan = traversal_plan(&pattern);
        let order: Vec<_> = plan.iter().map(|s| s.variable.as_str()).collect();
        assert_eq!(order, vec!["u", "v", "w"]);
        assert!(matches!(plan[0].anchor, Anchor::Free));
        assert!(matches!(&plan[1].anchor, Anchor::SuccessorOf(p) if p.as_str() == "u"));
        assert!(matches!(&plan[2].anchor, Anchor::SuccessorOf(p) if p.as_str() == "u"));
    }
}
