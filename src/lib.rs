//! # ktc-kernel
//!
//! Incremental, pattern-based link classification for topology control in
//! wireless networks.
//!
//! The kernel answers one question:
//!
//! > Given the current topology, which links should stay **active**?
//!
//! ## Core Contract
//!
//! 1. Every directed link is ACTIVE, INACTIVE, or UNCLASSIFIED
//! 2. A topology control run moves every UNCLASSIFIED link to ACTIVE or INACTIVE
//! 3. A context event (node/link added, removed, or re-weighted) marks exactly
//!    the links whose decision may change as UNCLASSIFIED
//! 4. Batch and incremental operation reach the same classification
//!
//! ## Architecture
//!
//! ```text
//! GraphT file → Topology → ClassificationEngine → RunSummary / fingerprints
//!                   ↑              ↓
//!            context events   TopologyControlAlgorithm (MaxPower, kTC)
//!                                  ↓
//!                  TopologyPattern + PatternMatcher + TopologyConstraint
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Nodes, links, and matches are enumerated in id order
//! - Ties between equal link weights are broken by link id
//! - Same topology + same algorithm + same k → identical state fingerprint

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod topology;
pub mod pattern;
pub mod matcher;
pub mod algorithm;
pub mod validation;
pub mod listener;
pub mod engine;
pub mod config;
pub mod io;
pub mod canonical;

// Re-exports
pub use types::{
    ConstraintViolation, ConstraintViolationReport, Link, LinkAttribute, LinkAttributes, LinkId,
    LinkState, Node, NodeAttribute, NodeId,
};
pub use topology::{StateCounts, Topology, TopologyError};
pub use pattern::{
    Constraint, KtcCriterion, LinkVariable, NodeVariable, PatternBuilder, PatternError,
    TopologyPattern, VariableAssignment,
};
pub use matcher::{PatternMatcher, TopologyPatternMatch};
pub use algorithm::{AlgorithmId, KtcAlgorithm, MaxPowerAlgorithm, OperationMode, TopologyControlAlgorithm};
pub use validation::TopologyConstraint;
pub use listener::{ContextEvent, CountingListener, LinkStateListener, NoOpListener};
pub use engine::{ClassificationEngine, EngineError, RunSummary};
pub use config::{ConfigError, EngineConfig, DEFAULT_K};
pub use io::{GraphTDocument, GraphTError};
pub use canonical::{
    canonical_hash, canonical_hash_hex, state_fingerprint, to_canonical_bytes, topology_fingerprint,
    FINGERPRINT_VERSION,
};
