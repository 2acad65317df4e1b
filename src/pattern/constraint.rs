//! Constraints over bound pattern variables.
//!
//! A [`Constraint`] names an ordered list of pattern variables. The matcher
//! resolves each variable through the current assignment and hands the
//! resulting [`BoundElement`]s to [`Constraint::is_fulfilled`]. Elements
//! arrive in the order returned by [`Constraint::variables`].
//!
//! Undefined attributes never satisfy a comparison.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::{Link, LinkAttribute, LinkId, Node, NodeAttribute};
use super::{LinkVariable, NodeVariable};

/// Binary comparison between two scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// `lhs < rhs`
    Less,
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs == rhs`
    Equal,
    /// `lhs != rhs`
    NotEqual,
    /// `lhs >= rhs`
    GreaterOrEqual,
    /// `lhs > rhs`
    Greater,
}

impl ComparisonOperator {
    /// Parse an operator from its symbol or name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "<" | "less" => Some(Self::Less),
            "<=" | "less_or_equal" => Some(Self::LessOrEqual),
            "==" | "=" | "equal" => Some(Self::Equal),
            "!=" | "unequal" | "not_equal" => Some(Self::NotEqual),
            ">=" | "greater_or_equal" => Some(Self::GreaterOrEqual),
            ">" | "greater" => Some(Self::Greater),
            _ => None,
        }
    }

    /// Apply the comparison. Any comparison involving NaN is false.
    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        let Some(ordering) = lhs.partial_cmp(&rhs) else {
            return false;
        };
        match self {
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Greater => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
        };
        f.write_str(symbol)
    }
}

/// Arithmetic combination of an attribute value with a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOperator {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
}

impl ArithmeticOperator {
    /// Apply the operator.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
        }
    }
}

/// Link attribute that drives a kTC triangle decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KtcCriterion {
    /// Larger weight is worse; the heaviest triangle link may be dropped.
    Weight,
    /// Smaller expected lifetime is worse; the weakest link may be dropped.
    ExpectedLifetime,
}

impl KtcCriterion {
    /// Link attribute read by this criterion.
    pub fn attribute(&self) -> LinkAttribute {
        match self {
            Self::Weight => LinkAttribute::Weight,
            Self::ExpectedLifetime => LinkAttribute::ExpectedLifetime,
        }
    }
}

impl fmt::Display for KtcCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight => write!(f, "weight"),
            Self::ExpectedLifetime => write!(f, "expected_lifetime"),
        }
    }
}

/// A link resolved from the host topology, with its reverse partner.
#[derive(Debug, Clone, Copy)]
pub struct BoundLink<'a> {
    /// The bound link.
    pub link: &'a Link,
    /// Its reverse partner, if registered.
    pub reverse: Option<&'a Link>,
}

impl<'a> BoundLink<'a> {
    /// Identifier used to break ties between equally weighted links.
    ///
    /// Both directions of a symmetric pair share the smaller id of the pair,
    /// so opposite links always rank identically.
    pub fn tie_break_id(&self) -> &'a LinkId {
        match self.reverse {
            Some(reverse) if reverse.id() < self.link.id() => reverse.id(),
            _ => self.link.id(),
        }
    }
}

/// A host element bound to a constraint variable.
#[derive(Debug, Clone, Copy)]
pub enum BoundElement<'a> {
    /// A node bound to a node variable.
    Node(&'a Node),
    /// A link bound to a link variable.
    Link(BoundLink<'a>),
}

/// Reference to a pattern variable used by a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintVariable<'c> {
    /// A node variable.
    Node(&'c NodeVariable),
    /// A link variable.
    Link(&'c LinkVariable),
}

/// Predicate over bound pattern variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// `attribute(link) <operator> value`
    LinkScalar {
        /// Constrained link.
        link: LinkVariable,
        /// Attribute read from the link.
        attribute: LinkAttribute,
        /// Comparison.
        operator: ComparisonOperator,
        /// Constant right-hand side.
        value: f64,
    },
    /// `attribute(lhs) <operator> attribute(rhs)`
    LinkPair {
        /// Left link.
        lhs: LinkVariable,
        /// Right link.
        rhs: LinkVariable,
        /// Attribute read from both links.
        attribute: LinkAttribute,
        /// Comparison.
        operator: ComparisonOperator,
    },
    /// `attribute(lhs) <operator> (attribute(rhs) <arithmetic> value)`
    LinkPairScaled {
        /// Left link.
        lhs: LinkVariable,
        /// Right link.
        rhs: LinkVariable,
        /// Attribute read from both links.
        attribute: LinkAttribute,
        /// Comparison.
        operator: ComparisonOperator,
        /// Operator combining the right attribute with `value`.
        arithmetic: ArithmeticOperator,
        /// Constant operand.
        value: f64,
    },
    /// `attribute(node) <operator> value`
    NodeScalar {
        /// Constrained node.
        node: NodeVariable,
        /// Attribute read from the node.
        attribute: NodeAttribute,
        /// Comparison.
        operator: ComparisonOperator,
        /// Constant right-hand side.
        value: f64,
    },
    /// kTC inactivation rule on a triangle `direct = u→v`,
    /// `first = u→w`, `second = w→v`.
    KtcTriangle {
        /// Candidate link for inactivation.
        direct: LinkVariable,
        /// First leg of the alternative path.
        first: LinkVariable,
        /// Second leg of the alternative path.
        second: LinkVariable,
        /// Stretch factor.
        k: f64,
        /// Attribute that ranks the triangle links.
        criterion: KtcCriterion,
    },
}

impl Constraint {
    /// kTC triangle constraint.
    pub fn ktc_triangle(
        direct: impl Into<LinkVariable>,
        first: impl Into<LinkVariable>,
        second: impl Into<LinkVariable>,
        k: f64,
        criterion: KtcCriterion,
    ) -> Self {
        Self::KtcTriangle {
            direct: direct.into(),
            first: first.into(),
            second: second.into(),
            k,
            criterion,
        }
    }

    /// Short name of the constraint kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LinkScalar { .. } => "link_scalar",
            Self::LinkPair { .. } => "link_pair",
            Self::LinkPairScaled { .. } => "link_pair_scaled",
            Self::NodeScalar { .. } => "node_scalar",
            Self::KtcTriangle { .. } => "ktc_triangle",
        }
    }

    /// Variables referenced by this constraint, in evaluation order.
    pub fn variables(&self) -> Vec<ConstraintVariable<'_>> {
        match self {
            Self::LinkScalar { link, .. } => vec![ConstraintVariable::Link(link)],
            Self::LinkPair { lhs, rhs, .. } | Self::LinkPairScaled { lhs, rhs, .. } => {
                vec![ConstraintVariable::Link(lhs), ConstraintVariable::Link(rhs)]
            }
            Self::NodeScalar { node, .. } => vec![ConstraintVariable::Node(node)],
            Self::KtcTriangle { direct, first, second, .. } => vec![
                ConstraintVariable::Link(direct),
                ConstraintVariable::Link(first),
                ConstraintVariable::Link(second),
            ],
        }
    }

    /// Evaluate the constraint on elements bound to [`Self::variables`].
    ///
    /// Returns `false` when the element list does not fit the constraint.
    pub fn is_fulfilled(&self, elements: &[BoundElement<'_>]) -> bool {
        match self {
            Self::LinkScalar { attribute, operator, value, .. } => link_at(elements, 0)
                .and_then(|l| l.link.attribute(*attribute))
                .is_some_and(|actual| operator.evaluate(actual, *value)),
            Self::LinkPair { attribute, operator, .. } => {
                match (attribute_at(elements, 0, *attribute), attribute_at(elements, 1, *attribute)) {
                    (Some(lhs), Some(rhs)) => operator.evaluate(lhs, rhs),
                    _ => false,
                }
            }
            Self::LinkPairScaled { attribute, operator, arithmetic, value, .. } => {
                match (attribute_at(elements, 0, *attribute), attribute_at(elements, 1, *attribute)) {
                    (Some(lhs), Some(rhs)) => operator.evaluate(lhs, arithmetic.apply(rhs, *value)),
                    _ => false,
                }
            }
            Self::NodeScalar { attribute, operator, value, .. } => match elements.first() {
                Some(BoundElement::Node(node)) => node
                    .attribute(*attribute)
                    .is_some_and(|actual| operator.evaluate(actual, *value)),
                _ => false,
            },
            Self::KtcTriangle { k, criterion, .. } => {
                match (link_at(elements, 0), link_at(elements, 1), link_at(elements, 2)) {
                    (Some(direct), Some(first), Some(second)) => {
                        ktc_triangle_holds(&direct, &first, &second, *k, *criterion)
                    }
                    _ => false,
                }
            }
        }
    }
}

/// kTC decision for one triangle.
///
/// With the [`KtcCriterion::Weight`] criterion, `direct` must rank strictly
/// above both legs by (weight, tie-break id) and
/// `weight(direct) > k * min(weight(first), weight(second))`.
///
/// With [`KtcCriterion::ExpectedLifetime`], `direct` must rank strictly below
/// both legs by lifetime (ties still resolved towards the greater id) and
/// `k * lifetime(direct) < max(lifetime(first), lifetime(second))`.
pub fn ktc_triangle_holds(
    direct: &BoundLink<'_>,
    first: &BoundLink<'_>,
    second: &BoundLink<'_>,
    k: f64,
    criterion: KtcCriterion,
) -> bool {
    let attribute = criterion.attribute();
    let (Some(d), Some(a), Some(b)) = (
        direct.link.attribute(attribute),
        first.link.attribute(attribute),
        second.link.attribute(attribute),
    ) else {
        return false;
    };

    let worst = is_worse(criterion, (d, direct.tie_break_id()), (a, first.tie_break_id()))
        && is_worse(criterion, (d, direct.tie_break_id()), (b, second.tie_break_id()));
    if !worst {
        return false;
    }
    match criterion {
        KtcCriterion::Weight => d > k * a.min(b),
        KtcCriterion::ExpectedLifetime => k * d < a.max(b),
    }
}

fn is_worse(criterion: KtcCriterion, lhs: (f64, &LinkId), rhs: (f64, &LinkId)) -> bool {
    let by_value = match criterion {
        KtcCriterion::Weight => lhs.0.total_cmp(&rhs.0),
        KtcCriterion::ExpectedLifetime => rhs.0.total_cmp(&lhs.0),
    };
    by_value.then_with(|| lhs.1.cmp(rhs.1)) == Ordering::Greater
}

fn link_at<'a>(elements: &[BoundElement<'a>], index: usize) -> Option<BoundLink<'a>> {
    match elements.get(index) {
        Some(BoundElement::Link(link)) => Some(*link),
        _ => None,
    }
}

fn attribute_at(elements: &[BoundElement<'_>], index: usize, attribute: LinkAttribute) -> Option<f64> {
    link_at(elements, index).and_then(|l| l.link.attribute(attribute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinkAttributes, NodeId};

    fn link(id: &str, weight: f64) -> Link {
        Link::new(
            LinkId::new(id),
            NodeId::new("a"),
            NodeId::new("b"),
            LinkAttributes::from_weight(weight).with_expected_lifetime(weight),
        )
    }

    fn bound(link: &Link) -> BoundLink<'_> {
        BoundLink { link, reverse: None }
    }

    #[test]
    fn test_comparison_operators() {
        assert!(ComparisonOperator::Less.evaluate(1.0, 2.0));
        assert!(ComparisonOperator::LessOrEqual.evaluate(2.0, 2.0));
        assert!(ComparisonOperator::Equal.evaluate(2.0, 2.0));
        assert!(ComparisonOperator::NotEqual.evaluate(2.0, 3.0));
        assert!(ComparisonOperator::GreaterOrEqual.evaluate(3.0, 3.0));
        assert!(ComparisonOperator::Greater.evaluate(3.0, 2.0));
        assert!(!ComparisonOperator::NotEqual.evaluate(f64::NAN, 1.0));
        assert_eq!(ComparisonOperator::from_str(">="), Some(ComparisonOperator::GreaterOrEqual));
    }

    #[test]
    fn test_distance_ktc_predicate() {
        // e1-2 = 15, e1-3 = 20, e2-3 = 17: e1-3 is longest
        let e12 = link("e12", 15.0);
        let e13 = link("e13", 20.0);
        let e23 = link("e23", 17.0);
        let holds = |k| ktc_triangle_holds(&bound(&e13), &bound(&e12), &bound(&e23), k, KtcCriterion::Weight);
        assert!(holds(1.3));
        assert!(!holds(1.5));
        // a leg is never dropped
        assert!(!ktc_triangle_holds(&bound(&e12), &bound(&e13), &bound(&e23), 1.0, KtcCriterion::Weight));
    }

    #[test]
    fn test_distance_ktc_uses_shorter_leg() {
        let direct = link("e23", 150.0);
        let first = link("e12", 100.0);
        let second = link("e13", 120.0);
        assert!(ktc_triangle_holds(&bound(&direct), &bound(&first), &bound(&second), 1.41, KtcCriterion::Weight));
    }

    #[test]
    fn test_tie_resolved_towards_greater_id() {
        let low = link("e1", 10.0);
        let high = link("e2", 10.0);
        let leg = link("e3", 5.0);
        assert!(ktc_triangle_holds(&bound(&high), &bound(&low), &bound(&leg), 1.1, KtcCriterion::Weight));
        assert!(!ktc_triangle_holds(&bound(&low), &bound(&high), &bound(&leg), 1.1, KtcCriterion::Weight));
    }

    #[test]
    fn test_tie_break_id_uses_pair_minimum() {
        let forward = link("z", 1.0);
        let backward = link("a", 1.0);
        let pair = BoundLink { link: &forward, reverse: Some(&backward) };
        assert_eq!(pair.tie_break_id().as_str(), "a");
        assert_eq!(bound(&forward).tie_break_id().as_str(), "z");
    }

    #[test]
    fn test_energy_ktc_predicate() {
        let direct = link("d", 10.0);
        let first = link("f", 40.0);
        let second = link("s", 25.0);
        let holds = |k| {
            ktc_triangle_holds(&bound(&direct), &bound(&first), &bound(&second), k, KtcCriterion::ExpectedLifetime)
        };
        assert!(holds(3.0));
        assert!(!holds(4.0));
        // the longer-lived legs are never dropped
        assert!(!ktc_triangle_holds(&bound(&first), &bound(&direct), &bound(&second), 1.0, KtcCriterion::ExpectedLifetime));
    }

    #[test]
    fn test_undefined_attribute_never_fulfils() {
        let defined = link("e1", 10.0);
        let undefined = Link::new(
            LinkId::new("e2"),
            NodeId::new("a"),
            NodeId::new("b"),
            LinkAttributes::default(),
        );
        let constraint = Constraint::LinkPair {
            lhs: "l".into(),
            rhs: "r".into(),
            attribute: LinkAttribute::Weight,
            operator: ComparisonOperator::NotEqual,
        };
        let elements = [
            BoundElement::Link(bound(&defined)),
            BoundElement::Link(bound(&undefined)),
        ];
        assert!(!constraint.is_fulfilled(&elements));
    }

    #[test]
    fn test_scaled_pair_constraint() {
        let lhs = link("e1", 30.0);
        let rhs = link("e2", 10.0);
        let constraint = Constraint::LinkPairScaled {
            lhs: "l".into(),
            rhs: "r".into(),
            attribute: LinkAttribute::Weight,
            operator: ComparisonOperator::Greater,
            arithmetic: ArithmeticOperator::Multiply,
            value: 2.5,
        };
        let elements = [BoundElement::Link(bound(&lhs)), BoundElement::Link(bound(&rhs))];
        assert!(constraint.is_fulfilled(&elements));
    }

    #[test]
    fn test_mismatched_elements_are_rejected() {
        let node = Node::new(NodeId::new("n"), Some(1.0));
        let constraint = Constraint::LinkScalar {
            link: "l".into(),
            attribute: LinkAttribute::Weight,
            operator: ComparisonOperator::Equal,
            value: 1.0,
        };
        assert!(!constraint.is_fulfilled(&[BoundElement::Node(&node)]));
        assert!(!constraint.is_fulfilled(&[]));
    }

    #[test]
    fn test_serde_tagging() {
        let constraint = Constraint::ktc_triangle("e", "e1", "e2", 1.5, KtcCriterion::Weight);
        let json = serde_json::to_value(&constraint).unwrap();
        assert_eq!(json["kind"], "ktc_triangle");
        assert_eq!(json["criterion"], "weight");
        let back: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(back, constraint);
    }
}
