//! Topology file formats.

pub mod graph_t;

pub use graph_t::{GraphTDocument, GraphTError, LinkPairRecord, NodeRecord};
