//! Constraint violation records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::id::{LinkId, NodeId};

/// A single structural violation found by a topology constraint check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Name of the violated constraint.
    pub constraint: String,
    /// Human-readable description.
    pub message: String,
    /// Nodes involved in the violation.
    pub nodes: Vec<NodeId>,
    /// Links involved in the violation.
    pub links: Vec<LinkId>,
}

impl ConstraintViolation {
    /// Create a violation with no involved elements.
    pub fn new(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Attach involved links.
    pub fn with_links(mut self, links: impl IntoIterator<Item = LinkId>) -> Self {
        self.links.extend(links);
        self
    }

    /// Attach involved nodes.
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.nodes.extend(nodes);
        self
    }
}

/// Accumulator of violations from one or more constraint checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolationReport {
    violations: Vec<ConstraintViolation>,
}

impl ConstraintViolationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn add(&mut self, violation: ConstraintViolation) {
        self.violations.push(violation);
    }

    /// Append all violations of another report.
    pub fn merge(&mut self, other: ConstraintViolationReport) {
        self.violations.extend(other.violations);
    }

    /// All recorded violations in insertion order.
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violation count per constraint name.
    pub fn histogram(&self) -> BTreeMap<String, usize> {
        let mut histogram = BTreeMap::new();
        for violation in &self.violations {
            *histogram.entry(violation.constraint.clone()).or_insert(0) += 1;
        }
        histogram
    }
}
