//! Node types for the topology model.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::NodeId;

/// Scalar attribute carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAttribute {
    /// Remaining battery energy of the node.
    RemainingEnergy,
}

impl NodeAttribute {
    /// Parse a node attribute from its string name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "remaining_energy" | "energy" => Some(Self::RemainingEnergy),
            _ => None,
        }
    }
}

impl fmt::Display for NodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemainingEnergy => write!(f, "remaining_energy"),
        }
    }
}

/// A node in the topology.
///
/// Degree counters are maintained by the owning topology on every link
/// insertion and removal; they are never written by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    id: NodeId,
    remaining_energy: Option<f64>,
    in_degree: usize,
    out_degree: usize,
}

impl Node {
    pub(crate) fn new(id: NodeId, remaining_energy: Option<f64>) -> Self {
        Self {
            id,
            remaining_energy,
            in_degree: 0,
            out_degree: 0,
        }
    }

    /// Identifier of this node.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Remaining energy, if known.
    pub fn remaining_energy(&self) -> Option<f64> {
        self.remaining_energy
    }

    /// Value of the given attribute, if defined.
    pub fn attribute(&self, attribute: NodeAttribute) -> Option<f64> {
        match attribute {
            NodeAttribute::RemainingEnergy => self.remaining_energy,
        }
    }

    /// Number of links targeting this node.
    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    /// Number of links originating at this node.
    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Total number of incident links.
    pub fn degree(&self) -> usize {
        self.in_degree + self.out_degree
    }

    pub(crate) fn set_attribute(&mut self, attribute: NodeAttribute, value: f64) {
        match attribute {
            NodeAttribute::RemainingEnergy => self.remaining_energy = Some(value),
        }
    }

    pub(crate) fn increment_in_degree(&mut self) {
        self.in_degree += 1;
    }

    pub(crate) fn decrement_in_degree(&mut self) {
        self.in_degree = self.in_degree.saturating_sub(1);
    }

    pub(crate) fn increment_out_degree(&mut self) {
        self.out_degree += 1;
    }

    pub(crate) fn decrement_out_degree(&mut self) {
        self.out_degree = self.out_degree.saturating_sub(1);
    }
}
