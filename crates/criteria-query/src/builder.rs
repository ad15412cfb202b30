//! Query builder seam and the in-crate query representation.
//!
//! The translator only ever talks to a [`QueryBuilder`]. [`SelectQuery`]
//! records every call and renders the result as an object-query string;
//! an ORM integration implements the trait over its own builder instead.

use std::collections::BTreeMap;
use std::fmt;

use crate::op::Operator;
use crate::ordering::{Dir, OrderBy};
use crate::value::Value;

/// Receiver of translated query parts.
///
/// Calls arrive in query order: `from`, optionally
/// `select_count_distinct`, then joins, predicates and parameters
/// interleaved as paths are walked, then orderings and pagination.
pub trait QueryBuilder {
    /// Sets the root entity and its alias, selecting the root.
    fn from(&mut self, entity: &str, alias: &str);

    /// Replaces the selection with `COUNT(DISTINCT alias)`.
    fn select_count_distinct(&mut self, alias: &str);

    /// Adds `INNER JOIN join alias`, where `join` is `parent_alias.association`.
    fn inner_join(&mut self, join: &str, alias: &str);

    /// Adds a predicate, combined with the previous ones by `AND`.
    fn and_where(&mut self, predicate: Predicate);

    /// Binds a parameter referenced by a predicate.
    fn set_parameter(&mut self, name: &str, value: Value);

    /// Appends an ordering on an aliased field.
    fn add_order_by(&mut self, field: &str, dir: Dir);

    /// Sets the maximum number of results; `None` means unbounded.
    fn set_max_results(&mut self, limit: Option<usize>);

    /// Sets the number of results to skip; `None` means zero.
    fn set_first_result(&mut self, offset: Option<usize>);
}

/// Parameter placeholder(s) of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `:p`
    Param(String),
    /// `(:p)`, a single parameter bound to a list.
    List(String),
    /// `:start AND :end`
    Range(String, String),
}

impl Operand {
    /// Names of the parameters this operand references.
    pub fn parameters(&self) -> Vec<&str> {
        match self {
            Operand::Param(name) | Operand::List(name) => vec![name.as_str()],
            Operand::Range(start, end) => vec![start.as_str(), end.as_str()],
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Param(name) => write!(f, ":{name}"),
            Operand::List(name) => write!(f, "(:{name})"),
            Operand::Range(start, end) => write!(f, ":{start} AND :{end}"),
        }
    }
}

/// A single parameterized condition on an aliased field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Aliased field, e.g. `_t1.city`.
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Parameter placeholder(s).
    pub operand: Operand,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.operand)
    }
}

/// An inner join of an association onto a new alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// `parent_alias.association`
    pub join: String,
    /// Alias of the joined entity.
    pub alias: String,
}

/// What a query selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// The root entity.
    #[default]
    Root,
    /// `COUNT(DISTINCT alias)`.
    CountDistinct(String),
}

/// Recorded query, renderable as an object-query string.
///
/// ```
/// use criteria_query::{Criteria, EntityMetadata, Repository, Schema};
///
/// let schema = Schema::new().entity(EntityMetadata::new("User").fields(["id", "name"]));
/// let users = Repository::new(&schema, "User").unwrap();
///
/// let query = users.find_count_by(&Criteria::new()).unwrap();
/// assert_eq!(query.to_string(), "SELECT COUNT(DISTINCT _t0) FROM User _t0");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    entity: String,
    alias: String,
    selection: Selection,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    parameters: BTreeMap<String, Value>,
    orderings: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl SelectQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        SelectQuery::default()
    }

    /// Root entity name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Root alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Inner joins, in registration order.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Predicates, in the order they were added.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Bound parameters by name.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Looks up a bound parameter.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Orderings on aliased fields.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    /// Maximum number of results, if set.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of results to skip, if set.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl QueryBuilder for SelectQuery {
    fn from(&mut self, entity: &str, alias: &str) {
        self.entity = entity.to_string();
        self.alias = alias.to_string();
        self.selection = Selection::Root;
    }

    fn select_count_distinct(&mut self, alias: &str) {
        self.selection = Selection::CountDistinct(alias.to_string());
    }

    fn inner_join(&mut self, join: &str, alias: &str) {
        self.joins.push(Join {
            join: join.to_string(),
            alias: alias.to_string(),
        });
    }

    fn and_where(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    fn set_parameter(&mut self, name: &str, value: Value) {
        self.parameters.insert(name.to_string(), value);
    }

    fn add_order_by(&mut self, field: &str, dir: Dir) {
        self.orderings.push(OrderBy::new(field, dir));
    }

    fn set_max_results(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    fn set_first_result(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selection {
            Selection::Root => write!(f, "SELECT {}", self.alias)?,
            Selection::CountDistinct(alias) => write!(f, "SELECT COUNT(DISTINCT {alias})")?,
        }
        write!(f, " FROM {} {}", self.entity, self.alias)?;

        for join in &self.joins {
            write!(f, " INNER JOIN {} {}", join.join, join.alias)?;
        }

        for (i, predicate) in self.predicates.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {keyword} {predicate}")?;
        }

        for (i, order_by) in self.orderings.iter().enumerate() {
            let sep = if i == 0 { " ORDER BY " } else { ", " };
            write!(f, "{sep}{order_by}")?;
        }

        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_rendering() {
        assert_eq!(Operand::Param("p".into()).to_string(), ":p");
        assert_eq!(Operand::List("p".into()).to_string(), "(:p)");
        assert_eq!(
            Operand::Range("a".into(), "b".into()).to_string(),
            ":a AND :b"
        );
        assert_eq!(Operand::Range("a".into(), "b".into()).parameters(), ["a", "b"]);
    }

    #[test]
    fn predicate_rendering() {
        let predicate = Predicate {
            field: "_t0.age".into(),
            op: Operator::NotBetween,
            operand: Operand::Range("p1".into(), "p2".into()),
        };
        assert_eq!(predicate.to_string(), "_t0.age NOT BETWEEN :p1 AND :p2");
    }

    #[test]
    fn records_and_renders_every_part() {
        let mut query = SelectQuery::new();
        query.from("User", "u0");
        query.inner_join("u0.address", "u1");
        query.and_where(Predicate {
            field: "u1.city".into(),
            op: Operator::Eq,
            operand: Operand::Param("p".into()),
        });
        query.and_where(Predicate {
            field: "u0.role".into(),
            op: Operator::In,
            operand: Operand::List("q".into()),
        });
        query.set_parameter("p", Value::from("Paris"));
        query.set_parameter("q", Value::from(vec!["a", "b"]));
        query.add_order_by("u0.name", Dir::Asc);
        query.add_order_by("u1.city", Dir::Desc);
        query.set_max_results(Some(10));
        query.set_first_result(Some(20));

        assert_eq!(
            query.to_string(),
            "SELECT u0 FROM User u0 INNER JOIN u0.address u1 \
             WHERE u1.city = :p AND u0.role IN (:q) \
             ORDER BY u0.name ASC, u1.city DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(query.parameter("p"), Some(&Value::from("Paris")));
        assert_eq!(query.entity(), "User");
        assert_eq!(query.alias(), "u0");
        assert_eq!(query.limit(), Some(10));
        assert_eq!(query.offset(), Some(20));
    }

    #[test]
    fn count_selection() {
        let mut query = SelectQuery::new();
        query.from("User", "u0");
        query.select_count_distinct("u0");
        assert_eq!(query.selection(), &Selection::CountDistinct("u0".into()));
        assert_eq!(query.to_string(), "SELECT COUNT(DISTINCT u0) FROM User u0");
    }
}
