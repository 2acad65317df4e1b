//! The GraphT text format.
//!
//! ```text
//! # comment lines and blank lines are ignored
//! <node-count> <link-pair-count>
//! <node-id> [<remaining-energy>]
//! <forward-id> <backward-id> <source> <target> <distance> [<weight> [<expected-lifetime> [<transmission-power>]]]
//! ```
//!
//! Every link record describes a symmetric pair: `forward` runs
//! `source → target`, `backward` runs `target → source`. The weight defaults
//! to the distance. `-` leaves an optional column undefined.
//!
//! A pair with a transmission power but no expected lifetime gets one per
//! direction when loaded: the remaining energy of the sending node divided by
//! the power.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::engine::{ClassificationEngine, EngineError};
use crate::topology::{Topology, TopologyError};
use crate::types::{LinkAttribute, LinkAttributes, LinkId, NodeId};

/// Error type for GraphT parsing and writing.
#[derive(Debug, thiserror::Error)]
pub enum GraphTError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("Line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The input ended before all announced records were read.
    #[error("Expected {expected} {kind} record(s), found {found}")]
    Truncated {
        /// Record kind.
        kind: &'static str,
        /// Announced count.
        expected: usize,
        /// Records present.
        found: usize,
    },

    /// A link cannot be written because it has no reverse partner.
    #[error("Link {0} has no reverse partner")]
    UnpairedLink(LinkId),

    /// A link cannot be written because it has neither distance nor weight.
    #[error("Link {0} has no distance")]
    MissingDistance(LinkId),
}

/// A node line.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    /// Remaining energy, if given.
    pub remaining_energy: Option<f64>,
}

/// A link line describing a symmetric pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPairRecord {
    /// Id of `source → target`.
    pub forward: LinkId,
    /// Id of `target → source`.
    pub backward: LinkId,
    /// Source of the forward link.
    pub source: NodeId,
    /// Target of the forward link.
    pub target: NodeId,
    /// Attributes shared by both links.
    pub attributes: LinkAttributes,
}

/// Parsed content of a GraphT file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphTDocument {
    /// Node records in file order.
    pub nodes: Vec<NodeRecord>,
    /// Link pair records in file order.
    pub links: Vec<LinkPairRecord>,
}

impl GraphTDocument {
    /// Parse GraphT text.
    pub fn parse(input: &str) -> Result<Self, GraphTError> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (header_line, header) = lines.next().ok_or(GraphTError::Syntax {
            line: 0,
            message: "missing header".to_string(),
        })?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(syntax(header_line, "header must be '<node-count> <link-pair-count>'"));
        }
        let node_count: usize = parse_field(header_line, fields[0], "node count")?;
        let link_count: usize = parse_field(header_line, fields[1], "link pair count")?;

        let mut document = GraphTDocument::default();
        for (line, text) in lines.by_ref().take(node_count) {
            document.nodes.push(parse_node(line, text)?);
        }
        if document.nodes.len() < node_count {
            return Err(GraphTError::Truncated {
                kind: "node",
                expected: node_count,
                found: document.nodes.len(),
            });
        }
        for (line, text) in lines.by_ref().take(link_count) {
            document.links.push(parse_link(line, text)?);
        }
        if document.links.len() < link_count {
            return Err(GraphTError::Truncated {
                kind: "link",
                expected: link_count,
                found: document.links.len(),
            });
        }
        if let Some((line, _)) = lines.next() {
            return Err(syntax(line, "unexpected record after announced links"));
        }
        Ok(document)
    }

    /// Read and parse a GraphT file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, GraphTError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GraphTError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Describe an existing topology. Every link must have a reverse partner.
    pub fn from_topology(topology: &Topology) -> Result<Self, GraphTError> {
        let nodes = topology
            .nodes()
            .map(|node| NodeRecord {
                id: node.id().clone(),
                remaining_energy: node.remaining_energy(),
            })
            .collect();

        let mut links = Vec::new();
        for link in topology.links() {
            let reverse = topology
                .reverse_link_id(link.id().as_str())
                .ok_or_else(|| GraphTError::UnpairedLink(link.id().clone()))?;
            if reverse < link.id() {
                continue;
            }
            let mut attributes = *link.attributes();
            if attributes.distance.is_none() {
                attributes.distance = attributes.weight;
            }
            if attributes.distance.is_none() {
                return Err(GraphTError::MissingDistance(link.id().clone()));
            }
            links.push(LinkPairRecord {
                forward: link.id().clone(),
                backward: reverse.clone(),
                source: link.source().clone(),
                target: link.target().clone(),
                attributes,
            });
        }
        Ok(Self { nodes, links })
    }

    /// Add all records to a topology.
    pub fn apply_to_topology(&self, topology: &mut Topology) -> Result<(), TopologyError> {
        for node in &self.nodes {
            topology.add_node(node.id.clone(), node.remaining_energy)?;
        }
        for link in &self.links {
            topology.add_symmetric_link(
                link.forward.clone(),
                link.backward.clone(),
                link.source.clone(),
                link.target.clone(),
                link.attributes,
            )?;
        }
        for (link, lifetime) in self.derived_lifetimes() {
            topology.set_link_attribute(link.as_str(), LinkAttribute::ExpectedLifetime, lifetime)?;
        }
        Ok(())
    }

    /// Build a fresh topology from the records.
    pub fn to_topology(&self) -> Result<Topology, TopologyError> {
        let mut topology = Topology::new();
        self.apply_to_topology(&mut topology)?;
        Ok(topology)
    }

    /// Add all records through an engine, so listeners observe each insertion.
    pub fn apply_to_engine(&self, engine: &mut ClassificationEngine) -> Result<(), EngineError> {
        for node in &self.nodes {
            engine.add_node(node.id.clone(), node.remaining_energy)?;
        }
        for link in &self.links {
            engine.add_symmetric_link(
                link.forward.clone(),
                link.backward.clone(),
                link.source.clone(),
                link.target.clone(),
                link.attributes,
            )?;
        }
        for (link, lifetime) in self.derived_lifetimes() {
            engine.update_link_attribute(link.as_str(), LinkAttribute::ExpectedLifetime, lifetime)?;
        }
        Ok(())
    }

    /// Expected lifetimes of links whose record defines a transmission power
    /// but no lifetime, for senders with a known remaining energy.
    fn derived_lifetimes(&self) -> Vec<(LinkId, f64)> {
        let energy: BTreeMap<&NodeId, f64> = self
            .nodes
            .iter()
            .filter_map(|n| Some((&n.id, n.remaining_energy?)))
            .collect();
        let mut lifetimes = Vec::new();
        for link in &self.links {
            if link.attributes.expected_lifetime.is_some() {
                continue;
            }
            let Some(power) = link.attributes.transmission_power.filter(|p| p.is_finite() && *p > 0.0) else {
                continue;
            };
            for (id, sender) in [(&link.forward, &link.source), (&link.backward, &link.target)] {
                if let Some(energy) = energy.get(sender) {
                    lifetimes.push((id.clone(), energy / power));
                }
            }
        }
        lifetimes
    }
}

impl fmt::Display for GraphTDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.nodes.len(), self.links.len())?;
        for node in &self.nodes {
            match node.remaining_energy {
                Some(energy) => writeln!(f, "{} {}", node.id, energy)?,
                None => writeln!(f, "{}", node.id)?,
            }
        }
        for link in &self.links {
            let attrs = &link.attributes;
            let distance = attrs.distance.or(attrs.weight).unwrap_or(0.0);
            write!(
                f,
                "{} {} {} {} {}",
                link.forward, link.backward, link.source, link.target, distance
            )?;
            let optional = [attrs.weight, attrs.expected_lifetime, attrs.transmission_power];
            let used = optional.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
            for value in &optional[..used] {
                match value {
                    Some(value) => write!(f, " {}", value)?,
                    None => write!(f, " -")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialize a topology of symmetric pairs as GraphT text.
pub fn write_graph_t(topology: &Topology) -> Result<String, GraphTError> {
    Ok(GraphTDocument::from_topology(topology)?.to_string())
}

fn parse_node(line: usize, text: &str) -> Result<NodeRecord, GraphTError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    match fields.as_slice() {
        [id] => Ok(NodeRecord {
            id: NodeId::new(*id),
            remaining_energy: None,
        }),
        [id, energy] => Ok(NodeRecord {
            id: NodeId::new(*id),
            remaining_energy: Some(parse_field(line, energy, "remaining energy")?),
        }),
        _ => Err(syntax(line, "node record must be '<id> [<remaining-energy>]'")),
    }
}

fn parse_link(line: usize, text: &str) -> Result<LinkPairRecord, GraphTError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if !(5..=8).contains(&fields.len()) {
        return Err(syntax(
            line,
            "link record must be '<fwd> <bwd> <source> <target> <distance> [<weight> [<lifetime> [<power>]]]'",
        ));
    }
    let distance: f64 = parse_field(line, fields[4], "distance")?;
    let mut attributes = LinkAttributes::from_distance(distance);
    if let Some(weight) = parse_optional(line, fields.get(5), "weight")? {
        attributes.weight = Some(weight);
    }
    attributes.expected_lifetime = parse_optional(line, fields.get(6), "expected lifetime")?;
    attributes.transmission_power = parse_optional(line, fields.get(7), "transmission power")?;
    Ok(LinkPairRecord {
        forward: LinkId::new(fields[0]),
        backward: LinkId::new(fields[1]),
        source: NodeId::new(fields[2]),
        target: NodeId::new(fields[3]),
        attributes,
    })
}

fn parse_field<T: FromStr>(line: usize, field: &str, what: &str) -> Result<T, GraphTError> {
    field
        .parse()
        .map_err(|_| syntax(line, &format!("invalid {}: '{}'", what, field)))
}

/// An absent column or `-` is undefined.
fn parse_optional(line: usize, field: Option<&&str>, what: &str) -> Result<Option<f64>, GraphTError> {
    match field {
        None | Some(&"-") => Ok(None),
        Some(field) => parse_field(line, field, what).map(Some),
    }
}

fn syntax(line: usize, message: &str) -> GraphTError {
    GraphTError::Syntax {
        line,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkState;

    const TRIANGLE: &str = "\
# scenario A
3 3
n1 10.5
n2
n3

e12 e21 n1 n2 100
e13 e31 n1 n3 120 120
e23 e32 n2 n3 150 150 42
";

    #[test]
    fn test_parse_triangle() {
        let document = GraphTDocument::parse(TRIANGLE).unwrap();
        assert_eq!(document.nodes.len(), 3);
        assert_eq!(document.nodes[0].remaining_energy, Some(10.5));
        assert_eq!(document.nodes[1].remaining_energy, None);
        assert_eq!(document.links[0].attributes.weight, Some(100.0));
        assert_eq!(document.links[2].attributes.expected_lifetime, Some(42.0));

        let topology = document.to_topology().unwrap();
        assert_eq!(topology.link_count(), 6);
        assert_eq!(topology.reverse_link_id("e32"), Some(&LinkId::new("e23")));
        assert!(topology.links().all(|l| l.state() == LinkState::Unclassified));
    }

    #[test]
    fn test_syntax_errors_carry_line_numbers() {
        let err = GraphTDocument::parse("2 0\nn1\nn2 lots\n").unwrap_err();
        assert!(matches!(err, GraphTError::Syntax { line: 3, .. }), "{:?}", err);

        let err = GraphTDocument::parse("1 1\nn1\ne11 e11r n1 n1\n").unwrap_err();
        assert!(matches!(err, GraphTError::Syntax { line: 3, .. }));

        assert!(matches!(GraphTDocument::parse("# only comments\n"), Err(GraphTError::Syntax { .. })));
    }

    #[test]
    fn test_truncated_and_trailing_records() {
        assert!(matches!(
            GraphTDocument::parse("3 0\nn1\nn2\n"),
            Err(GraphTError::Truncated { kind: "node", expected: 3, found: 2 })
        ));
        assert!(matches!(GraphTDocument::parse("1 0\nn1\nn2\n"), Err(GraphTError::Syntax { line: 3, .. })));
    }

    #[test]
    fn test_writer_reproduces_document() {
        let document = GraphTDocument::parse(TRIANGLE).unwrap();
        let topology = document.to_topology().unwrap();
        let text = write_graph_t(&topology).unwrap();
        assert!(text.starts_with("3 3\n"));
        assert!(text.contains("e12 e21 n1 n2 100 100\n"));
        assert!(text.contains("e23 e32 n2 n3 150 150 42\n"));
        // weights default to the distance, so the explicit weight parses back identically
        assert_eq!(GraphTDocument::parse(&text).unwrap(), document);
    }

    #[test]
    fn test_power_column_derives_lifetimes_per_direction() {
        let text = "2 2\nn1 100\nn2 40\ne12 e21 n1 n2 5 - - 4\nf12 f21 n1 n2 5 7 30 4\n";
        let document = GraphTDocument::parse(text).unwrap();
        assert_eq!(document.links[0].attributes.weight, Some(5.0));
        assert_eq!(document.links[0].attributes.expected_lifetime, None);
        assert_eq!(document.links[0].attributes.transmission_power, Some(4.0));

        let topology = document.to_topology().unwrap();
        let lifetime = |id: &str| topology.link(id).unwrap().attributes().expected_lifetime;
        assert_eq!(lifetime("e12"), Some(25.0));
        assert_eq!(lifetime("e21"), Some(10.0));
        // explicit lifetimes win
        assert_eq!(lifetime("f12"), Some(30.0));
        assert_eq!(lifetime("f21"), Some(30.0));
    }

    #[test]
    fn test_writer_marks_undefined_columns() {
        let mut topology = Topology::new();
        topology.add_node("a", None).unwrap();
        topology.add_node("b", None).unwrap();
        let attributes = LinkAttributes::from_distance(2.0).with_transmission_power(0.5);
        topology.add_symmetric_link("ab", "ba", "a", "b", attributes).unwrap();

        let text = write_graph_t(&topology).unwrap();
        assert!(text.contains("ab ba a b 2 2 - 0.5\n"), "{}", text);
        let reparsed = GraphTDocument::parse(&text).unwrap();
        assert_eq!(reparsed.links[0].attributes, attributes);
    }

    #[test]
    fn test_writer_rejects_unpaired_links() {
        let mut topology = Topology::new();
        topology.add_node("a", None).unwrap();
        topology.add_node("b", None).unwrap();
        topology.add_link("ab", "a", "b", LinkAttributes::from_distance(1.0)).unwrap();
        assert!(matches!(write_graph_t(&topology), Err(GraphTError::UnpairedLink(_))));
    }

    #[test]
    fn test_apply_to_engine() {
        let document = GraphTDocument::parse(TRIANGLE).unwrap();
        let mut engine = ClassificationEngine::new();
        document.apply_to_engine(&mut engine).unwrap();
        assert_eq!(engine.node_count(), 3);
        assert_eq!(engine.link_count(), 6);
        assert!(document.apply_to_engine(&mut engine).is_err());
    }
}
