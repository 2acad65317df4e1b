//! Injective variable assignments.

use std::collections::BTreeMap;

use crate::types::{LinkId, NodeId};
use super::{LinkVariable, NodeVariable};

/// Error type for binding a variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The variable is already bound to a different value.
    #[error("Variable {variable} is already bound to {existing}")]
    VariableAlreadyBound {
        /// The variable.
        variable: String,
        /// Its current value.
        existing: String,
    },

    /// The value is already bound to a different variable.
    #[error("Value {value} is already bound to variable {variable}")]
    ValueAlreadyBound {
        /// The value.
        value: String,
        /// The variable holding it.
        variable: String,
    },
}

/// Bijective mapping of pattern variables to host elements.
///
/// Forward and inverse maps are kept in lockstep, so no two node variables
/// share a node and no two link variables share a link. Rebinding a variable
/// to the value it already holds is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableAssignment {
    nodes: BTreeMap<NodeVariable, NodeId>,
    node_owners: BTreeMap<NodeId, NodeVariable>,
    links: BTreeMap<LinkVariable, LinkId>,
    link_owners: BTreeMap<LinkId, LinkVariable>,
}

impl VariableAssignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a node variable.
    pub fn bind_node(&mut self, variable: NodeVariable, node: NodeId) -> Result<(), BindingError> {
        if let Some(existing) = self.nodes.get(&variable) {
            if *existing == node {
                return Ok(());
            }
            return Err(BindingError::VariableAlreadyBound {
                variable: variable.to_string(),
                existing: existing.to_string(),
            });
        }
        if let Some(owner) = self.node_owners.get(&node) {
            return Err(BindingError::ValueAlreadyBound {
                value: node.to_string(),
                variable: owner.to_string(),
            });
        }
        self.node_owners.insert(node.clone(), variable.clone());
        self.nodes.insert(variable, node);
        Ok(())
    }

    /// Bind a link variable.
    pub fn bind_link(&mut self, variable: LinkVariable, link: LinkId) -> Result<(), BindingError> {
        if let Some(existing) = self.links.get(&variable) {
            if *existing == link {
                return Ok(());
            }
            return Err(BindingError::VariableAlreadyBound {
                variable: variable.to_string(),
                existing: existing.to_string(),
            });
        }
        if let Some(owner) = self.link_owners.get(&link) {
            return Err(BindingError::ValueAlreadyBound {
                value: link.to_string(),
                variable: owner.to_string(),
            });
        }
        self.link_owners.insert(link.clone(), variable.clone());
        self.links.insert(variable, link);
        Ok(())
    }

    /// Remove a node binding, returning the node it held.
    pub fn unbind_node(&mut self, variable: &str) -> Option<NodeId> {
        let node = self.nodes.remove(variable)?;
        self.node_owners.remove(&node);
        Some(node)
    }

    /// Remove a link binding, returning the link it held.
    pub fn unbind_link(&mut self, variable: &str) -> Option<LinkId> {
        let link = self.links.remove(variable)?;
        self.link_owners.remove(&link);
        Some(link)
    }

    /// Node bound to a variable.
    pub fn node_binding(&self, variable: &str) -> Option<&NodeId> {
        self.nodes.get(variable)
    }

    /// Link bound to a variable.
    pub fn link_binding(&self, variable: &str) -> Option<&LinkId> {
        self.links.get(variable)
    }

    /// Whether some node variable is bound to `node`.
    pub fn is_node_bound(&self, node: &str) -> bool {
        self.node_owners.contains_key(node)
    }

    /// Whether some link variable is bound to `link`.
    pub fn is_link_bound(&self, link: &str) -> bool {
        self.link_owners.contains_key(link)
    }

    /// All node bindings, ordered by variable.
    pub fn node_bindings(&self) -> impl Iterator<Item = (&NodeVariable, &NodeId)> {
        self.nodes.iter()
    }

    /// All link bindings, ordered by variable.
    pub fn link_bindings(&self) -> impl Iterator<Item = (&LinkVariable, &LinkId)> {
        self.links.iter()
    }

    /// Total number of bindings.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.links.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Whether `other` can be merged into this assignment without breaking
    /// injectivity or rebinding a variable.
    pub fn is_mergeable_with(&self, other: &VariableAssignment) -> bool {
        let nodes_fit = other.nodes.iter().all(|(variable, node)| {
            match (self.nodes.get(variable), self.node_owners.get(node)) {
                (Some(bound), _) => bound == node,
                (None, owner) => owner.is_none(),
            }
        });
        let links_fit = other.links.iter().all(|(variable, link)| {
            match (self.links.get(variable), self.link_owners.get(link)) {
                (Some(bound), _) => bound == link,
                (None, owner) => owner.is_none(),
            }
        });
        nodes_fit && links_fit
    }

    /// Union of both assignments.
    pub fn merge(&self, other: &VariableAssignment) -> Result<VariableAssignment, BindingError> {
        let mut merged = self.clone();
        for (variable, node) in &other.nodes {
            merged.bind_node(variable.clone(), node.clone())?;
        }
        for (variable, link) in &other.links {
            merged.bind_link(variable.clone(), link.clone())?;
        }
        Ok(merged)
    }
}
