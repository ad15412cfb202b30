//! Criteria Query - translate associative criteria into entity queries.
//!
//! A criteria map names fields of a root entity, optionally through
//! associations (`address.city`), and pairs each with a value or a map of
//! operators to values. This crate turns such a map into a parameterized
//! object query:
//!
//! - Field paths are checked against entity metadata; association segments
//!   become inner joins, each joined once per query
//! - Every operator is checked against the kind of its value
//! - Values are bound as named parameters and never appear in query text
//! - Ordering shares joins with the criteria; limit and offset pass through
//!
//! # Quick Start
//!
//! ```rust
//! use criteria_query::{Criteria, EntityMetadata, Repository, Schema, Sort, Value};
//!
//! let schema = Schema::new()
//!     .entity(
//!         EntityMetadata::new("User")
//!             .fields(["id", "name", "age"])
//!             .association("address", "Address"),
//!     )
//!     .entity(EntityMetadata::new("Address").fields(["id", "city"]));
//!
//! let criteria: Criteria = serde_json::from_str(
//!     r#"{"address.city": "Paris", "age": {">=": 18, "<": 65}}"#,
//! )
//! .unwrap();
//!
//! let users = Repository::new(&schema, "User").unwrap();
//! let query = users
//!     .find_by(&criteria, Some(&Sort::new().desc("age")), None, None)
//!     .unwrap();
//!
//! assert_eq!(query.joins().len(), 1);
//! assert_eq!(query.predicates().len(), 3);
//! assert_eq!(query.parameters().len(), 3);
//! assert!(query.parameters().values().any(|v| v == &Value::from("Paris")));
//! assert!(query.to_string().ends_with("ORDER BY _t0.age DESC"));
//! ```
//!
//! # Criteria Semantics
//!
//! A bare value is shorthand for a single operator chosen by its shape:
//!
//! ```text
//! null        → IS
//! [a, b, ...] → IN      (an empty list adds no condition)
//! anything    → =
//! ```
//!
//! An operator map adds one condition per entry, in order. All conditions
//! of all fields are combined with `AND`.
//!
//! # Value Kinds and Operators
//!
//! | Kind | Operators |
//! |------|-----------|
//! | boolean | `=`, `!=`, `<>`, `IS`, `IS NOT` |
//! | integer, double | `=`, `!=`, `<>`, `<`, `>`, `<=`, `>=` |
//! | string, datetime | comparison operators, `LIKE`, `NOT LIKE` |
//! | string naming an entity | string operators, `INSTANCEOF` |
//! | array | `IN`, `NOT IN` |
//! | two-item array of comparable values | `IN`, `NOT IN`, `BETWEEN`, `NOT BETWEEN` |
//! | entity reference | `=`, `!=`, `<>` |
//! | null | `IS`, `IS NOT` |
//!
//! # Integration
//!
//! The translator only talks to the [`MetadataSource`] and [`QueryBuilder`]
//! traits. [`Schema`] and [`SelectQuery`] implement them in-crate; an ORM
//! integration implements them over its own mapping and query builder and
//! calls [`Repository::translate_into`].

mod builder;
mod config;
mod criteria;
mod error;
mod joins;
mod kind;
mod metadata;
mod op;
mod ordering;
mod repository;
mod translate;
mod value;

// Re-export public API
pub use builder::{Join, Operand, Predicate, QueryBuilder, Selection, SelectQuery};
pub use config::TranslatorOptions;
pub use criteria::{Criteria, FieldCriteria};
pub use error::{CriteriaError, Result};
pub use joins::{AliasGenerator, JoinRegistry, NewJoin};
pub use kind::Kind;
pub use metadata::{ClassMetadata, Entity, EntityMetadata, MetadataSource, Schema};
pub use op::{Operator, Shape};
pub use ordering::{Dir, OrderBy, Sort};
pub use repository::Repository;
pub use translate::parameter_name;
pub use value::{EntityRef, Identifier, Number, Timestamp, Value};

pub use criteria_query_macros::Entity;
