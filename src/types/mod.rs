//! Core types for the topology model.

pub mod id;
pub mod node;
pub mod link;
pub mod violation;

pub use id::{LinkId, NodeId};
pub use node::{Node, NodeAttribute};
pub use link::{Link, LinkAttribute, LinkAttributes, LinkState};
pub use violation::{ConstraintViolation, ConstraintViolationReport};
