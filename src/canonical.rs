//! Canonical serialization and topology fingerprints.
//!
//! Fingerprints identify a topology (structure and attributes) or its
//! classification (link states) independently of construction order, so that
//! runs can be compared across modes, processes, and machines.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable map order: fingerprints are built from BTreeMaps only
//! - Stable float format: attribute values are quantized to micro-units before
//!   hashing, so formatting differences never reach the hash
//! - Versioned: [`FINGERPRINT_VERSION`] is part of every hashed document

use serde::Serialize;
use std::collections::BTreeMap;
use xxhash_rust::xxh64::xxh64;

use crate::topology::Topology;
use crate::types::{LinkAttributes, LinkState};

/// Version of the fingerprint layout. Bump when the hashed document changes.
pub const FINGERPRINT_VERSION: u32 = 1;

/// Scale applied to attribute values before hashing.
const QUANTIZATION_SCALE: f64 = 1_000_000.0;

/// Serialize a value to canonical JSON bytes for hashing.
///
/// This function produces deterministic output for the same input,
/// suitable for hash computation and replay verification.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[derive(Serialize)]
struct StateDocument<'a> {
    version: u32,
    states: BTreeMap<&'a str, LinkState>,
}

#[derive(Serialize)]
struct QuantizedAttributes {
    distance: Option<i64>,
    weight: Option<i64>,
    expected_lifetime: Option<i64>,
    transmission_power: Option<i64>,
}

#[derive(Serialize)]
struct LinkEntry<'a> {
    source: &'a str,
    target: &'a str,
    reverse: Option<&'a str>,
    attributes: QuantizedAttributes,
}

#[derive(Serialize)]
struct TopologyDocument<'a> {
    version: u32,
    nodes: BTreeMap<&'a str, Option<i64>>,
    links: BTreeMap<&'a str, LinkEntry<'a>>,
}

/// Fingerprint of the link classification: link ids and their states.
pub fn state_fingerprint(topology: &Topology) -> String {
    let document = StateDocument {
        version: FINGERPRINT_VERSION,
        states: topology.links().map(|l| (l.id().as_str(), l.state())).collect(),
    };
    canonical_hash_hex(&document)
}

/// Fingerprint of the topology structure and attributes, ignoring link
/// states.
pub fn topology_fingerprint(topology: &Topology) -> String {
    let document = TopologyDocument {
        version: FINGERPRINT_VERSION,
        nodes: topology
            .nodes()
            .map(|n| (n.id().as_str(), n.remaining_energy().and_then(quantize)))
            .collect(),
        links: topology
            .links()
            .map(|l| {
                let entry = LinkEntry {
                    source: l.source().as_str(),
                    target: l.target().as_str(),
                    reverse: topology.reverse_link_id(l.id().as_str()).map(|r| r.as_str()),
                    attributes: quantize_attributes(l.attributes()),
                };
                (l.id().as_str(), entry)
            })
            .collect(),
    };
    canonical_hash_hex(&document)
}

fn quantize_attributes(attributes: &LinkAttributes) -> QuantizedAttributes {
    QuantizedAttributes {
        distance: attributes.distance.and_then(quantize),
        weight: attributes.weight.and_then(quantize),
        expected_lifetime: attributes.expected_lifetime.and_then(quantize),
        transmission_power: attributes.transmission_power.and_then(quantize),
    }
}

/// Non-finite values hash like missing ones.
fn quantize(value: f64) -> Option<i64> {
    value
        .is_finite()
        .then(|| (value * QUANTIZATION_SCALE).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_determinism() {
        let s = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        let h1 = canonical_hash(&s);
        let h2 = canonical_hash(&s);
        assert_eq!(h1, h2);
        assert_eq!(canonical_hash_hex(&s).len(), 16);
    }

    fn pair(order: &[&str]) -> Topology {
        let mut topology = Topology::new();
        for id in order {
            topology.add_node(*id, Some(5.0)).unwrap();
        }
        topology
            .add_symmetric_link("ab", "ba", "a", "b", LinkAttributes::from_distance(0.1 + 0.2))
            .unwrap();
        topology
    }

    #[test]
    fn test_fingerprints_ignore_insertion_order() {
        let first = pair(&["a", "b"]);
        let second = pair(&["b", "a"]);
        assert_eq!(topology_fingerprint(&first), topology_fingerprint(&second));
        assert_eq!(state_fingerprint(&first), state_fingerprint(&second));
    }

    #[test]
    fn test_state_fingerprint_tracks_states_only() {
        let mut topology = pair(&["a", "b"]);
        let structure = topology_fingerprint(&topology);
        let before = state_fingerprint(&topology);

        topology.set_link_state("ab", LinkState::Active).unwrap();
        assert_ne!(state_fingerprint(&topology), before);
        assert_eq!(topology_fingerprint(&topology), structure);
    }

    #[test]
    fn test_topology_fingerprint_quantizes_attributes() {
        let mut topology = pair(&["a", "b"]);
        let structure = topology_fingerprint(&topology);

        topology.set_link_attribute("ab", crate::types::LinkAttribute::Distance, 0.3).unwrap();
        assert_eq!(topology_fingerprint(&topology), structure);

        topology.set_link_attribute("ab", crate::types::LinkAttribute::Distance, 0.31).unwrap();
        assert_ne!(topology_fingerprint(&topology), structure);
    }
}
