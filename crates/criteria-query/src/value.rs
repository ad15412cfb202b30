//! Owned criteria values.
//!
//! A [`Value`] is what a caller compares a field against. Values are never
//! interpolated into query text; the translator binds them as parameters.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::Serialize;

/// A criteria value.
///
/// # Example
///
/// ```
/// use criteria_query::{Number, Value};
///
/// assert_eq!(Value::from(42i32), Value::Number(Number::I64(42)));
/// assert_eq!(Value::from("ada"), Value::String("ada".into()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// assert_eq!(
///     Value::from(vec![1u8, 2]),
///     Value::List(vec![Value::Number(Number::U64(1)), Value::Number(Number::U64(2))]),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value. Only `IS` and `IS NOT` accept it.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value. A string naming a known entity also enables `INSTANCEOF`.
    String(String),
    /// Point in time.
    Timestamp(Timestamp),
    /// Reference to an entity instance.
    Entity(EntityRef),
    /// List of values, used by `IN`, `NOT IN`, `BETWEEN` and `NOT BETWEEN`.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a `List` value.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the list items, if present.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Numeric value.
///
/// Integers and floats are kept apart because they admit the same operators
/// but classify as different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Returns `true` for the integer variants.
    pub fn is_integer(self) -> bool {
        !matches!(self, Number::F64(_))
    }
}

impl From<i8> for Number {
    fn from(n: i8) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i16> for Number {
    fn from(n: i16) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u8> for Number {
    fn from(n: u8) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u16> for Number {
    fn from(n: u16) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::F64(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use criteria_query::Timestamp;
///
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// assert!(Timestamp(1000) < Timestamp(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a timestamp from seconds since Unix epoch, saturating at the
    /// `i64` millisecond range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

/// Reference to a persisted entity instance.
///
/// Builders bind it by identifier. Whether `entity` is actually known is
/// decided at translation time against the metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    /// Entity name, e.g. `User`.
    pub entity: String,
    /// Identifier of the instance.
    pub id: Identifier,
}

impl EntityRef {
    /// Creates a new entity reference.
    pub fn new(entity: impl Into<String>, id: impl Into<Identifier>) -> Self {
        EntityRef {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key.
    Uint(u64),
    /// String key (UUIDs, slugs, ...).
    Str(String),
}

impl From<i32> for Identifier {
    fn from(id: i32) -> Self {
        Identifier::Int(id as i64)
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Identifier::Int(id)
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Identifier::Uint(id as u64)
    }
}

impl From<u64> for Identifier {
    fn from(id: u64) -> Self {
        Identifier::Uint(id)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier::Str(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Identifier::Str(id)
    }
}

// Conversions from common types to Value

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<EntityRef> for Value {
    fn from(e: EntityRef) -> Self {
        Value::Entity(e)
    }
}

impl From<i8> for Value {
    fn from(n: i8) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Decodes self-describing input into a [`Value`].
///
/// Maps are rejected: at value position they have no meaning, and at field
/// position they are handled by `FieldCriteria` before reaching here.
pub(crate) struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number, a string or a list")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::I64(n)))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        // Non-negative literals arrive here; they stay `I64` when they fit.
        Ok(Value::Number(match i64::try_from(n) {
            Ok(n) => Number::I64(n),
            Err(_) => Number::U64(n),
        }))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Number(Number::F64(n)))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_checks() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
        assert!(Value::List(vec![]).is_list());
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(1i32).as_str(), None);
        assert_eq!(
            Value::from(vec![1i32]).as_list(),
            Some(&[Value::Number(Number::I64(1))][..])
        );
    }

    #[test]
    fn number_integer_check() {
        assert!(Number::I64(-1).is_integer());
        assert!(Number::U64(1).is_integer());
        assert!(!Number::F64(1.0).is_integer());
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u32), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(1).as_millis(), 1000);
        assert_eq!(Timestamp::from_millis(5000).as_secs(), 5);
    }

    #[test]
    fn timestamp_from_secs_saturates() {
        assert_eq!(Timestamp::from_secs(i64::MAX / 100), Timestamp(i64::MAX));
        assert_eq!(Timestamp::from_secs(i64::MIN / 100), Timestamp(i64::MIN));
    }

    #[test]
    fn entity_ref_identifiers() {
        assert_eq!(EntityRef::new("User", 7).id, Identifier::Int(7));
        assert_eq!(
            EntityRef::new("User", "abc").id,
            Identifier::Str("abc".into())
        );
    }

    #[test]
    fn deserialize_scalars_and_lists() {
        let value: Value = serde_json::from_str(r#"[null, true, 3, -4, 1.5, "x"]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Null,
                Value::Bool(true),
                Value::Number(Number::I64(3)),
                Value::Number(Number::I64(-4)),
                Value::Number(Number::F64(1.5)),
                Value::String("x".into()),
            ])
        );
    }

    #[test]
    fn deserialize_large_unsigned_stays_unsigned() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value, Value::Number(Number::U64(u64::MAX)));
    }

    #[test]
    fn deserialize_rejects_maps() {
        let result: Result<Value, _> = serde_json::from_str(r#"{"a": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialize_is_untagged() {
        let value = Value::List(vec![
            Value::Null,
            Value::from(2i64),
            Value::Timestamp(Timestamp(5)),
            Value::Entity(EntityRef::new("User", 9)),
        ]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[null,2,5,{"entity":"User","id":9}]"#
        );
    }
}
