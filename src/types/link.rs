//! Link types for the topology model.
//!
//! A link is directed (`source → target`). Its reverse partner, if any, is
//! tracked by the owning [`Topology`](crate::topology::Topology) rather than
//! by the link itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{LinkId, NodeId};

/// Classification state of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkState {
    /// Not yet decided by topology control.
    Unclassified,
    /// Kept for communication.
    Active,
    /// Switched off by topology control.
    Inactive,
}

impl LinkState {
    /// All states, in declaration order.
    pub const ALL: [LinkState; 3] = [Self::Unclassified, Self::Active, Self::Inactive];

    /// Parse a link state from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNCLASSIFIED" | "U" => Some(Self::Unclassified),
            "ACTIVE" | "A" => Some(Self::Active),
            "INACTIVE" | "I" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Single-letter symbol used in state reports.
    pub fn symbol(&self) -> char {
        match self {
            Self::Unclassified => 'U',
            Self::Active => 'A',
            Self::Inactive => 'I',
        }
    }

    /// Whether topology control has decided this link.
    pub fn is_classified(&self) -> bool {
        !matches!(self, Self::Unclassified)
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::Unclassified
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclassified => write!(f, "UNCLASSIFIED"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Scalar attribute carried by a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAttribute {
    /// Euclidean distance between the endpoints.
    Distance,
    /// Generic cost used by distance-based topology control.
    Weight,
    /// Expected remaining lifetime of the link.
    ExpectedLifetime,
    /// Transmission power required to use the link.
    TransmissionPower,
}

impl LinkAttribute {
    /// Parse a link attribute from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "distance" => Some(Self::Distance),
            "weight" => Some(Self::Weight),
            "expected_lifetime" | "lifetime" => Some(Self::ExpectedLifetime),
            "transmission_power" | "power" => Some(Self::TransmissionPower),
            _ => None,
        }
    }

    /// Whether a change of this attribute may alter a classification decision.
    pub fn is_classification_relevant(&self) -> bool {
        !matches!(self, Self::TransmissionPower)
    }
}

impl fmt::Display for LinkAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Weight => write!(f, "weight"),
            Self::ExpectedLifetime => write!(f, "expected_lifetime"),
            Self::TransmissionPower => write!(f, "transmission_power"),
        }
    }
}

/// Attribute values of a link.
///
/// Undefined attributes are `None`; comparisons involving an undefined value
/// never hold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkAttributes {
    /// Euclidean distance between the endpoints.
    pub distance: Option<f64>,
    /// Cost used by distance-based topology control.
    pub weight: Option<f64>,
    /// Expected remaining lifetime.
    pub expected_lifetime: Option<f64>,
    /// Required transmission power.
    pub transmission_power: Option<f64>,
}

impl LinkAttributes {
    /// Attributes of a link whose weight equals its distance.
    pub fn from_distance(distance: f64) -> Self {
        Self {
            distance: Some(distance),
            weight: Some(distance),
            ..Self::default()
        }
    }

    /// Attributes with only a weight.
    pub fn from_weight(weight: f64) -> Self {
        Self {
            weight: Some(weight),
            ..Self::default()
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the expected lifetime.
    pub fn with_expected_lifetime(mut self, lifetime: f64) -> Self {
        self.expected_lifetime = Some(lifetime);
        self
    }

    /// Set the required transmission power.
    pub fn with_transmission_power(mut self, power: f64) -> Self {
        self.transmission_power = Some(power);
        self
    }

    /// Value of the given attribute, if defined.
    pub fn get(&self, attribute: LinkAttribute) -> Option<f64> {
        match attribute {
            LinkAttribute::Distance => self.distance,
            LinkAttribute::Weight => self.weight,
            LinkAttribute::ExpectedLifetime => self.expected_lifetime,
            LinkAttribute::TransmissionPower => self.transmission_power,
        }
    }

    /// Set the given attribute.
    pub fn set(&mut self, attribute: LinkAttribute, value: f64) {
        let slot = match attribute {
            LinkAttribute::Distance => &mut self.distance,
            LinkAttribute::Weight => &mut self.weight,
            LinkAttribute::ExpectedLifetime => &mut self.expected_lifetime,
            LinkAttribute::TransmissionPower => &mut self.transmission_power,
        };
        *slot = Some(value);
    }
}

/// A directed link between two nodes of the same topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    id: LinkId,
    source: NodeId,
    target: NodeId,
    attributes: LinkAttributes,
    state: LinkState,
}

impl Link {
    pub(crate) fn new(id: LinkId, source: NodeId, target: NodeId, attributes: LinkAttributes) -> Self {
        Self {
            id,
            source,
            target,
            attributes,
            state: LinkState::Unclassified,
        }
    }

    /// Identifier of this link.
    pub fn id(&self) -> &LinkId {
        &self.id
    }

    /// Source node.
    pub fn source(&self) -> &NodeId {
        &self.source
    }

    /// Target node.
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    /// Current classification state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// All attribute values.
    pub fn attributes(&self) -> &LinkAttributes {
        &self.attributes
    }

    /// Value of the given attribute, if defined.
    pub fn attribute(&self, attribute: LinkAttribute) -> Option<f64> {
        self.attributes.get(attribute)
    }

    /// Weight, if defined.
    pub fn weight(&self) -> Option<f64> {
        self.attributes.weight
    }

    /// Whether this link starts and ends at the same node.
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }

    /// Whether `node` is one of the endpoints.
    pub fn is_incident_to(&self, node: &str) -> bool {
        self.source.as_str() == node || self.target.as_str() == node
    }

    /// Whether `other` runs in the opposite direction between the same nodes.
    pub fn is_opposite_of(&self, other: &Link) -> bool {
        self.source == other.target && self.target == other.source
    }

    pub(crate) fn set_state(&mut self, state: LinkState) -> LinkState {
        std::mem::replace(&mut self.state, state)
    }

    pub(crate) fn set_attribute(&mut self, attribute: LinkAttribute, value: f64) {
        self.attributes.set(attribute, value);
    }
}
