//! Topology patterns.
//!
//! A [`TopologyPattern`] is a small graph of node and link variables with a
//! designated origin, a list of [`Constraint`]s, and negative application
//! conditions (NACs). A NAC is itself a full pattern that shares the
//! enclosing pattern's variables; a match is rejected if any NAC can be
//! extended from it.
//!
//! Patterns are built once through [`PatternBuilder`] and are immutable
//! afterwards.

pub mod assignment;
pub mod builder;
pub mod constraint;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::id::string_id;

pub use assignment::{BindingError, VariableAssignment};
pub use builder::{NegativeApplicationCondition, PatternBuilder};
pub use constraint::{
    ArithmeticOperator, BoundElement, BoundLink, ComparisonOperator, Constraint,
    ConstraintVariable, KtcCriterion,
};

string_id! {
    /// Name of a node variable in a pattern.
    NodeVariable
}

string_id! {
    /// Name of a link variable in a pattern.
    LinkVariable
}

/// Error type for pattern construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    /// No local node was declared.
    #[error("Pattern has no local node")]
    MissingLocalNode,

    /// The local node was declared twice with different variables.
    #[error("Local node already set to {existing}, cannot change to {requested}")]
    LocalNodeReassigned {
        /// Variable declared first.
        existing: NodeVariable,
        /// Variable declared later.
        requested: NodeVariable,
    },

    /// Nothing was declared.
    #[error("Pattern declares no variables")]
    EmptyPattern,

    /// A node variable cannot be reached from the local node.
    #[error("Node variable {0} is not connected to the local node")]
    Disconnected(NodeVariable),

    /// A link variable was declared twice with different endpoints.
    #[error("Link variable {0} already declared with different endpoints")]
    ConflictingLink(LinkVariable),

    /// A constraint refers to a variable the pattern does not declare.
    #[error("Constraint {constraint} refers to unknown variable {variable}")]
    UnknownVariable {
        /// Constraint kind.
        constraint: &'static str,
        /// The missing variable.
        variable: String,
    },

    /// A constraint parameter is out of range.
    #[error("Invalid constraint parameter: {0}")]
    InvalidConstraint(String),
}

/// A link variable with its endpoint variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternLink {
    /// The link variable.
    pub variable: LinkVariable,
    /// Source node variable.
    pub source: NodeVariable,
    /// Target node variable.
    pub target: NodeVariable,
}

/// Immutable topology pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyPattern {
    origin: NodeVariable,
    node_variables: BTreeSet<NodeVariable>,
    links: BTreeMap<LinkVariable, PatternLink>,
    constraints: Vec<Constraint>,
    nacs: Vec<TopologyPattern>,
}

impl TopologyPattern {
    pub(crate) fn new(
        origin: NodeVariable,
        node_variables: BTreeSet<NodeVariable>,
        links: BTreeMap<LinkVariable, PatternLink>,
        constraints: Vec<Constraint>,
        nacs: Vec<TopologyPattern>,
    ) -> Self {
        Self {
            origin,
            node_variables,
            links,
            constraints,
            nacs,
        }
    }

    /// The local node variable, bound to the node a match is rooted at.
    pub fn origin(&self) -> &NodeVariable {
        &self.origin
    }

    /// All node variables, ordered by name.
    pub fn node_variables(&self) -> impl Iterator<Item = &NodeVariable> {
        self.node_variables.iter()
    }

    /// Whether the pattern declares this node variable.
    pub fn has_node_variable(&self, variable: &str) -> bool {
        self.node_variables.contains(variable)
    }

    /// All link variables with endpoints, ordered by name.
    pub fn links(&self) -> impl Iterator<Item = &PatternLink> {
        self.links.values()
    }

    /// A link variable with its endpoints.
    pub fn link(&self, variable: &str) -> Option<&PatternLink> {
        self.links.get(variable)
    }

    /// Constraints evaluated on every candidate match.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Negative application conditions, each glued to this pattern.
    pub fn negative_application_conditions(&self) -> &[TopologyPattern] {
        &self.nacs
    }

    /// BFS depth of every node variable reachable from the origin, treating
    /// pattern links as undirected.
    pub fn variable_depths(&self) -> BTreeMap<NodeVariable, usize> {
        let mut depths = BTreeMap::new();
        depths.insert(self.origin.clone(), 0);
        let mut queue = VecDeque::from([self.origin.clone()]);
        while let Some(current) = queue.pop_front() {
            let depth = depths[&current];
            for link in self.links.values() {
                let next = if link.source == current {
                    &link.target
                } else if link.target == current {
                    &link.source
                } else {
                    continue;
                };
                if !depths.contains_key(next) {
                    depths.insert(next.clone(), depth + 1);
                    queue.push_back(next.clone());
                }
            }
        }
        depths
    }

    /// Largest BFS depth of any reachable node variable.
    pub fn horizon(&self) -> usize {
        self.variable_depths().into_values().max().unwrap_or(0)
    }

    /// Whether every node variable is reachable from the origin.
    pub fn is_connected(&self) -> bool {
        self.variable_depths().len() == self.node_variables.len()
    }
}
