//! Observers of link state changes and context events.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{LinkAttribute, LinkId, LinkState, NodeAttribute, NodeId};

/// A mutation applied to the topology through the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContextEvent {
    /// A node was added.
    NodeAdded {
        /// The node.
        node: NodeId,
    },
    /// A node and its incident links were removed.
    NodeRemoved {
        /// The node.
        node: NodeId,
    },
    /// A link was added.
    LinkAdded {
        /// The link.
        link: LinkId,
    },
    /// A link was removed.
    LinkRemoved {
        /// The link.
        link: LinkId,
    },
    /// Two links were registered as reverse of each other.
    ReverseConnected {
        /// First link.
        forward: LinkId,
        /// Second link.
        backward: LinkId,
    },
    /// A node attribute changed.
    NodeAttributeUpdated {
        /// The node.
        node: NodeId,
        /// The attribute.
        attribute: NodeAttribute,
    },
    /// A link attribute changed.
    LinkAttributeUpdated {
        /// The link.
        link: LinkId,
        /// The attribute.
        attribute: LinkAttribute,
    },
}

impl ContextEvent {
    /// Short event kind, usable as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NodeAdded { .. } => "node_added",
            Self::NodeRemoved { .. } => "node_removed",
            Self::LinkAdded { .. } => "link_added",
            Self::LinkRemoved { .. } => "link_removed",
            Self::ReverseConnected { .. } => "reverse_connected",
            Self::NodeAttributeUpdated { .. } => "node_attribute_updated",
            Self::LinkAttributeUpdated { .. } => "link_attribute_updated",
        }
    }
}

/// Receives notifications from a [`ClassificationEngine`].
///
/// Implementations must be thread-safe (Send + Sync).
///
/// [`ClassificationEngine`]: crate::engine::ClassificationEngine
pub trait LinkStateListener: Send + Sync {
    /// A link changed state.
    fn link_state_modified(&self, link: &LinkId, old: LinkState, new: LinkState);

    /// A mutation was applied.
    fn context_event(&self, _event: &ContextEvent) {}
}

/// No-op listener.
#[derive(Debug, Default)]
pub struct NoOpListener;

impl LinkStateListener for NoOpListener {
    fn link_state_modified(&self, _link: &LinkId, _old: LinkState, _new: LinkState) {
        // No-op
    }
}

/// In-memory listener that counts transitions and events.
#[derive(Debug, Default)]
pub struct CountingListener {
    transitions: Mutex<BTreeMap<(LinkState, LinkState), u64>>,
    events: Mutex<BTreeMap<&'static str, u64>>,
}

impl CountingListener {
    /// Create a listener with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `old → new` transitions seen.
    pub fn transition_count(&self, old: LinkState, new: LinkState) -> u64 {
        self.transitions.lock().get(&(old, new)).copied().unwrap_or(0)
    }

    /// Number of transitions seen in total.
    pub fn total_transitions(&self) -> u64 {
        self.transitions.lock().values().sum()
    }

    /// Number of events of the given kind seen.
    pub fn event_count(&self, kind: &str) -> u64 {
        self.events.lock().get(kind).copied().unwrap_or(0)
    }

    /// Number of events seen in total.
    pub fn total_events(&self) -> u64 {
        self.events.lock().values().sum()
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.transitions.lock().clear();
        self.events.lock().clear();
    }
}

impl LinkStateListener for CountingListener {
    fn link_state_modified(&self, _link: &LinkId, old: LinkState, new: LinkState) {
        *self.transitions.lock().entry((old, new)).or_insert(0) += 1;
    }

    fn context_event(&self, event: &ContextEvent) {
        *self.events.lock().entry(event.kind()).or_insert(0) += 1;
    }
}
