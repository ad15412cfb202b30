//! Comparison operators accepted in criteria.
//!
//! The [`Operator`] set is closed. Parsing is case-insensitive, so
//! `"not like"` and `"NOT LIKE"` name the same operator.

use std::fmt;
use std::str::FromStr;

use crate::error::CriteriaError;

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<>`, kept distinct from `!=` so queries render what the caller wrote.
    NeAlt,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `BETWEEN`
    Between,
    /// `NOT BETWEEN`
    NotBetween,
    /// `INSTANCEOF`
    InstanceOf,
}

/// How an operator's operand is rendered and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One parameter: `field OP :p`.
    Scalar,
    /// One list parameter in parentheses: `field OP (:p)`.
    List,
    /// Two parameters: `field OP :p1 AND :p2`.
    Range,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 16] = [
        Operator::Eq,
        Operator::Ne,
        Operator::NeAlt,
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::Is,
        Operator::IsNot,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::NotBetween,
        Operator::InstanceOf,
    ];

    /// Parses an operator, ignoring ASCII case.
    pub fn parse(op: &str) -> Result<Self, CriteriaError> {
        let upper = op.to_ascii_uppercase();
        Operator::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == upper)
            .ok_or(CriteriaError::InvalidOperator(upper))
    }

    /// Returns the operand shape of this operator.
    pub fn shape(self) -> Shape {
        match self {
            Operator::In | Operator::NotIn => Shape::List,
            Operator::Between | Operator::NotBetween => Shape::Range,
            _ => Shape::Scalar,
        }
    }

    /// Returns the canonical (upper-case) spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::NeAlt => "<>",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::InstanceOf => "INSTANCEOF",
        }
    }
}

impl FromStr for Operator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
