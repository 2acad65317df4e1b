//! Topology control algorithms.
//!
//! An algorithm decides the state of links. Decisions are computed from the
//! topology without mutating it; the [`ClassificationEngine`] applies them.
//!
//! [`ClassificationEngine`]: crate::engine::ClassificationEngine

pub mod ktc;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::topology::Topology;
use crate::types::{LinkId, LinkState};
use crate::validation::TopologyConstraint;

pub use ktc::KtcAlgorithm;

/// Identifier of a topology control algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    /// Keep every link active.
    #[serde(rename = "MAXPOWER_TC")]
    MaxPower,
    /// kTC on link weights (distance).
    #[serde(rename = "D_KTC")]
    DistanceKtc,
    /// kTC on expected link lifetimes (energy).
    #[serde(rename = "E_KTC")]
    EnergyKtc,
}

impl AlgorithmId {
    /// Parse an algorithm id from its canonical name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MAXPOWER_TC" | "MAXPOWER" => Some(Self::MaxPower),
            "D_KTC" | "DISTANCE_KTC" => Some(Self::DistanceKtc),
            "E_KTC" | "ENERGY_KTC" => Some(Self::EnergyKtc),
            _ => None,
        }
    }
}

impl Default for AlgorithmId {
    fn default() -> Self {
        Self::DistanceKtc
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxPower => write!(f, "MAXPOWER_TC"),
            Self::DistanceKtc => write!(f, "D_KTC"),
            Self::EnergyKtc => write!(f, "E_KTC"),
        }
    }
}

/// How the engine reacts to topology changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationMode {
    /// Not chosen yet; algorithms cannot be configured.
    NotSet,
    /// Every run reclassifies the whole topology.
    Batch,
    /// Runs reclassify only links invalidated by mutations.
    Incremental,
}

impl OperationMode {
    /// Parse an operation mode from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NOT_SET" => Some(Self::NotSet),
            "BATCH" => Some(Self::Batch),
            "INCREMENTAL" => Some(Self::Incremental),
            _ => None,
        }
    }
}

impl Default for OperationMode {
    fn default() -> Self {
        Self::NotSet
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet => write!(f, "NOT_SET"),
            Self::Batch => write!(f, "BATCH"),
            Self::Incremental => write!(f, "INCREMENTAL"),
        }
    }
}

/// A link classification strategy.
pub trait TopologyControlAlgorithm: Send + Sync {
    /// Which algorithm this is.
    fn id(&self) -> AlgorithmId;

    /// Decide the state of a single link. Returns `None` if the link does
    /// not exist.
    fn decide_link(&self, topology: &Topology, link: &str) -> Option<LinkState>;

    /// Decide the state of every link.
    fn decide_all(&self, topology: &Topology) -> BTreeMap<LinkId, LinkState> {
        topology
            .link_ids()
            .filter_map(|id| Some((id.clone(), self.decide_link(topology, id.as_str())?)))
            .collect()
    }

    /// Structural constraints a topology classified by this algorithm
    /// must satisfy.
    fn constraints(&self) -> Vec<TopologyConstraint> {
        Vec::new()
    }
}

/// Keeps every link active.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPowerAlgorithm;

impl TopologyControlAlgorithm for MaxPowerAlgorithm {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::MaxPower
    }

    fn decide_link(&self, topology: &Topology, link: &str) -> Option<LinkState> {
        topology.link(link).map(|_| LinkState::Active)
    }
}

/// Instantiate the algorithm `id` with stretch factor `k`.
pub fn instantiate(
    id: AlgorithmId,
    k: f64,
) -> Result<Box<dyn TopologyControlAlgorithm>, crate::pattern::PatternError> {
    Ok(match id {
        AlgorithmId::MaxPower => Box::new(MaxPowerAlgorithm),
        AlgorithmId::DistanceKtc => Box::new(KtcAlgorithm::distance(k)?),
        AlgorithmId::EnergyKtc => Box::new(KtcAlgorithm::energy(k)?),
    })
}
