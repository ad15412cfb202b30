//! Value kinds and the operators each kind admits.

use std::fmt;

use crate::metadata::MetadataSource;
use crate::op::Operator;
use crate::value::{Number, Value};

use Operator::*;

const COMPARISON: &[Operator] = &[Eq, Ne, NeAlt, Lt, Gt, Lte, Gte];
const TEXT: &[Operator] = &[Eq, Ne, NeAlt, Lt, Gt, Lte, Gte, Like, NotLike];

/// Type class of a criteria value.
///
/// Classification needs the metadata source: a string that names a known
/// entity and a reference to a known entity classify differently from
/// plain strings and unknown references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Boolean,
    Integer,
    Double,
    String,
    /// A string naming a known entity.
    StringEntity,
    Array,
    /// A two-item list whose items are both range-able.
    ArrayRange,
    DateTime,
    /// A reference to a known entity.
    Entity,
    /// A reference to an entity the source does not know. Admits nothing.
    Object,
    Null,
}

impl Kind {
    /// Classifies `value`.
    pub fn of<M: MetadataSource + ?Sized>(value: &Value, source: &M) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(Number::F64(_)) => Kind::Double,
            Value::Number(_) => Kind::Integer,
            Value::String(s) if source.has_metadata_for(s) => Kind::StringEntity,
            Value::String(_) => Kind::String,
            Value::Timestamp(_) => Kind::DateTime,
            Value::Entity(e) if source.has_metadata_for(&e.entity) => Kind::Entity,
            Value::Entity(_) => Kind::Object,
            Value::List(items) if is_range(items, source) => Kind::ArrayRange,
            Value::List(_) => Kind::Array,
        }
    }

    /// Operators this kind admits.
    pub fn operators(self) -> &'static [Operator] {
        match self {
            Kind::Boolean => &[Eq, Ne, NeAlt, Is, IsNot],
            Kind::Integer | Kind::Double => COMPARISON,
            Kind::String | Kind::DateTime => TEXT,
            Kind::StringEntity => &[Eq, Ne, NeAlt, Lt, Gt, Lte, Gte, Like, NotLike, InstanceOf],
            Kind::Array => &[In, NotIn],
            Kind::ArrayRange => &[In, NotIn, Between, NotBetween],
            Kind::Entity => &[Eq, Ne, NeAlt],
            Kind::Object => &[],
            Kind::Null => &[Is, IsNot],
        }
    }

    /// Returns `true` if `op` may be applied to a value of this kind.
    pub fn admits(self, op: Operator) -> bool {
        self.operators().contains(&op)
    }

    /// Returns `true` if a value of this kind may be a `BETWEEN` bound.
    pub fn is_rangeable(self) -> bool {
        matches!(
            self,
            Kind::Boolean
                | Kind::Integer
                | Kind::Double
                | Kind::String
                | Kind::StringEntity
                | Kind::DateTime
        )
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::StringEntity => "string/entity",
            Kind::Array => "array",
            Kind::ArrayRange => "array/range",
            Kind::DateTime => "datetime",
            Kind::Entity => "entity",
            Kind::Object => "object",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_range<M: MetadataSource + ?Sized>(items: &[Value], source: &M) -> bool {
    match items {
        [start, end] => Kind::of(start, source).is_rangeable() && Kind::of(end, source).is_rangeable(),
        _ => false,
    }
}
