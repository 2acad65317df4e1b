//! Fluent construction of topology patterns.
//!
//! Declaration errors are recorded when they happen and reported by
//! [`PatternBuilder::build`], so a builder chain never panics halfway.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::constraint::{Constraint, ConstraintVariable};
use super::{LinkVariable, NodeVariable, PatternError, PatternLink, TopologyPattern};

/// Suffix of the reverse link variable created by
/// [`PatternBuilder::undirected_link`].
pub const REVERSE_LINK_SUFFIX: &str = "_R";

/// Pattern fragment used as a negative application condition.
///
/// Produced by [`PatternBuilder::build_nac`] and glued to the enclosing
/// pattern by [`PatternBuilder::nac`]. Variables with the same name as in the
/// enclosing pattern denote the same element.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeApplicationCondition {
    node_variables: BTreeSet<NodeVariable>,
    links: BTreeMap<LinkVariable, PatternLink>,
    constraints: Vec<Constraint>,
}

/// Builder for [`TopologyPattern`].
#[derive(Debug, Clone, Default)]
pub struct PatternBuilder {
    local_node: Option<NodeVariable>,
    node_variables: BTreeSet<NodeVariable>,
    links: BTreeMap<LinkVariable, PatternLink>,
    constraints: Vec<Constraint>,
    nacs: Vec<NegativeApplicationCondition>,
    error: Option<PatternError>,
}

impl PatternBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the local node variable (the match origin).
    pub fn local_node(mut self, variable: impl Into<NodeVariable>) -> Self {
        let variable = variable.into();
        if let Some(existing) = self.local_node.clone() {
            if existing != variable {
                self.fail(PatternError::LocalNodeReassigned {
                    existing,
                    requested: variable,
                });
                return self;
            }
        }
        self.node_variables.insert(variable.clone());
        self.local_node = Some(variable);
        self
    }

    /// Declare a link variable `source → target`.
    pub fn directed_link(
        mut self,
        source: impl Into<NodeVariable>,
        link: impl Into<LinkVariable>,
        target: impl Into<NodeVariable>,
    ) -> Self {
        let declared = PatternLink {
            variable: link.into(),
            source: source.into(),
            target: target.into(),
        };
        if let Err(err) = insert_link(&mut self.node_variables, &mut self.links, declared) {
            self.fail(err);
        }
        self
    }

    /// Declare `link` as `a → b` and `link_R` as `b → a`.
    pub fn undirected_link(
        self,
        a: impl Into<NodeVariable>,
        link: impl Into<LinkVariable>,
        b: impl Into<NodeVariable>,
    ) -> Self {
        let a = a.into();
        let b = b.into();
        let link = link.into();
        let reverse = LinkVariable::new(format!("{}{}", link, REVERSE_LINK_SUFFIX));
        self.directed_link(a.clone(), link, b.clone())
            .directed_link(b, reverse, a)
    }

    /// Add a constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add a negative application condition.
    pub fn nac(mut self, nac: NegativeApplicationCondition) -> Self {
        self.nacs.push(nac);
        self
    }

    /// Finish a full pattern.
    ///
    /// Checks that a local node exists, every variable is reachable from it,
    /// and every constraint refers to declared variables. Each NAC is glued to
    /// the pattern: it inherits all variables and links and keeps its own
    /// constraints.
    pub fn build(self) -> Result<TopologyPattern, PatternError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let origin = self.local_node.ok_or(PatternError::MissingLocalNode)?;
        validate_constraints(&self.constraints, &self.node_variables, &self.links)?;

        let mut nacs = Vec::with_capacity(self.nacs.len());
        for nac in self.nacs {
            nacs.push(glue(&origin, &self.node_variables, &self.links, nac)?);
        }

        let pattern = TopologyPattern::new(
            origin,
            self.node_variables,
            self.links,
            self.constraints,
            nacs,
        );
        if let Some(unreachable) = first_unreachable(&pattern) {
            return Err(PatternError::Disconnected(unreachable));
        }
        Ok(pattern)
    }

    /// Finish a NAC fragment. A local node declaration is ignored.
    pub fn build_nac(self) -> Result<NegativeApplicationCondition, PatternError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.node_variables.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        for constraint in &self.constraints {
            validate_parameters(constraint)?;
        }
        Ok(NegativeApplicationCondition {
            node_variables: self.node_variables,
            links: self.links,
            constraints: self.constraints,
        })
    }

    fn fail(&mut self, err: PatternError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

fn insert_link(
    node_variables: &mut BTreeSet<NodeVariable>,
    links: &mut BTreeMap<LinkVariable, PatternLink>,
    link: PatternLink,
) -> Result<(), PatternError> {
    if let Some(existing) = links.get(&link.variable) {
        if *existing == link {
            return Ok(());
        }
        return Err(PatternError::ConflictingLink(link.variable));
    }
    node_variables.insert(link.source.clone());
    node_variables.insert(link.target.clone());
    links.insert(link.variable.clone(), link);
    Ok(())
}

fn glue(
    origin: &NodeVariable,
    node_variables: &BTreeSet<NodeVariable>,
    links: &BTreeMap<LinkVariable, PatternLink>,
    nac: NegativeApplicationCondition,
) -> Result<TopologyPattern, PatternError> {
    let mut glued_nodes = node_variables.clone();
    let mut glued_links = links.clone();
    glued_nodes.extend(nac.node_variables);
    for link in nac.links.into_values() {
        insert_link(&mut glued_nodes, &mut glued_links, link)?;
    }
    validate_constraints(&nac.constraints, &glued_nodes, &glued_links)?;
    Ok(TopologyPattern::new(
        origin.clone(),
        glued_nodes,
        glued_links,
        nac.constraints,
        Vec::new(),
    ))
}

fn validate_constraints(
    constraints: &[Constraint],
    node_variables: &BTreeSet<NodeVariable>,
    links: &BTreeMap<LinkVariable, PatternLink>,
) -> Result<(), PatternError> {
    for constraint in constraints {
        for variable in constraint.variables() {
            let (known, name) = match variable {
                ConstraintVariable::Node(v) => (node_variables.contains(v), v.as_str()),
                ConstraintVariable::Link(v) => (links.contains_key(v), v.as_str()),
            };
            if !known {
                return Err(PatternError::UnknownVariable {
                    constraint: constraint.name(),
                    variable: name.to_string(),
                });
            }
        }
        validate_parameters(constraint)?;
    }
    Ok(())
}

fn validate_parameters(constraint: &Constraint) -> Result<(), PatternError> {
    match constraint {
        Constraint::KtcTriangle { k, .. } if !k.is_finite() || *k <= 0.0 => Err(
            PatternError::InvalidConstraint(format!("kTC factor must be finite and positive, got {}", k)),
        ),
        Constraint::LinkScalar { value, .. } | Constraint::NodeScalar { value, .. } if value.is_nan() => {
            Err(PatternError::InvalidConstraint(format!("{} compares against NaN", constraint.name())))
        }
        _ => Ok(()),
    }
}

fn first_unreachable(pattern: &TopologyPattern) -> Option<NodeVariable> {
    let mut reached = BTreeSet::from([pattern.origin().clone()]);
    let mut queue = VecDeque::from([pattern.origin().clone()]);
    while let Some(current) = queue.pop_front() {
        for link in pattern.links() {
            for (from, to) in [(&link.source, &link.target), (&link.target, &link.source)] {
                if *from == current && reached.insert(to.clone()) {
                    queue.push_back(to.clone());
                }
            }
        }
    }
    pattern
        .node_variables()
        .find(|variable| !reached.contains(*variable))
        .cloned()
}
