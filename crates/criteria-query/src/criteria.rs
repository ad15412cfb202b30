//! Associative criteria.
//!
//! [`Criteria`] maps field paths to [`FieldCriteria`]. A field criteria is
//! either a bare value, which expands to `IS`, `IN` or `=` depending on the
//! value, or an explicit operator map:
//!
//! ```
//! use criteria_query::{Criteria, Value};
//!
//! let json = r#"{
//!     "name": "Ada",
//!     "deletedAt": null,
//!     "role": ["admin", "owner"],
//!     "age": {">=": 18, "<": 65},
//!     "address.city": {"like": "Lon%"}
//! }"#;
//! let criteria: Criteria = serde_json::from_str(json).unwrap();
//!
//! let built = Criteria::new()
//!     .with("name", "Ada")
//!     .with("deletedAt", Value::Null)
//!     .with("role", vec!["admin", "owner"])
//!     .gte("age", 18)
//!     .lt("age", 65)
//!     .op("address.city", "like", "Lon%");
//!
//! assert_eq!(criteria, built);
//! ```

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::op::Operator;
use crate::value::{Value, ValueVisitor};

/// Criteria for a single field path.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCriteria {
    /// Shorthand: `Null` means `IS`, a list means `IN`, anything else `=`.
    Value(Value),
    /// Explicit operator → value pairs, in insertion order.
    ///
    /// Operators are kept as written and validated at translation time.
    Operators(Vec<(String, Value)>),
}

impl FieldCriteria {
    /// Expands the criteria into `(OPERATOR, value)` pairs.
    ///
    /// Operator keys are upper-cased; keys that collide after upper-casing
    /// keep the first position and the last value. An empty list or an
    /// empty operator map yields nothing.
    pub fn conditions(&self) -> Vec<(String, &Value)> {
        match self {
            FieldCriteria::Value(Value::List(items)) if items.is_empty() => Vec::new(),
            FieldCriteria::Value(value) => {
                let op = match value {
                    Value::Null => Operator::Is,
                    Value::List(_) => Operator::In,
                    _ => Operator::Eq,
                };
                vec![(op.as_str().to_string(), value)]
            }
            FieldCriteria::Operators(pairs) => {
                let mut conditions: Vec<(String, &Value)> = Vec::with_capacity(pairs.len());
                for (op, value) in pairs {
                    let op = op.to_ascii_uppercase();
                    match conditions.iter_mut().find(|(existing, _)| *existing == op) {
                        Some(slot) => slot.1 = value,
                        None => conditions.push((op, value)),
                    }
                }
                conditions
            }
        }
    }

    /// Adds an operator, converting a shorthand value into its explicit form.
    fn push(&mut self, op: &str, value: Value) {
        if let FieldCriteria::Value(_) = self {
            let expanded = self
                .conditions()
                .into_iter()
                .map(|(op, value)| (op, value.clone()))
                .collect();
            *self = FieldCriteria::Operators(expanded);
        }
        if let FieldCriteria::Operators(pairs) = self {
            match pairs.iter_mut().find(|(existing, _)| existing == op) {
                Some(slot) => slot.1 = value,
                None => pairs.push((op.to_string(), value)),
            }
        }
    }
}

impl From<Value> for FieldCriteria {
    fn from(value: Value) -> Self {
        FieldCriteria::Value(value)
    }
}

/// Ordered field path → [`FieldCriteria`] map.
///
/// Field paths are dot-separated association chains ending in a field,
/// e.g. `address.city.name`. Conditions on different paths, and on the same
/// path with different operators, are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, FieldCriteria)>,
}

impl Criteria {
    /// Creates empty criteria. Empty criteria match every entity.
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Sets a shorthand value for a field path, replacing any previous
    /// criteria for that path in place.
    pub fn with(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_criteria(field, FieldCriteria::Value(value.into()))
    }

    /// Sets the criteria of a field path, replacing any previous criteria
    /// for that path in place.
    pub fn with_criteria(mut self, field: &str, criteria: FieldCriteria) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| existing == field) {
            Some(slot) => slot.1 = criteria,
            None => self.entries.push((field.to_string(), criteria)),
        }
        self
    }

    /// Adds an operator condition to a field path.
    ///
    /// The operator is validated at translation time, so an unknown
    /// spelling surfaces as `InvalidOperator` there.
    pub fn op(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| existing == field) {
            Some((_, criteria)) => criteria.push(op, value),
            None => self.entries.push((
                field.to_string(),
                FieldCriteria::Operators(vec![(op.to_string(), value)]),
            )),
        }
        self
    }

    fn with_op(self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.op(field, op.as_str(), value)
    }

    /// Adds an `=` condition.
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Eq, value)
    }

    /// Adds a `!=` condition.
    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Ne, value)
    }

    /// Adds a `<` condition.
    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Lt, value)
    }

    /// Adds a `<=` condition.
    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Lte, value)
    }

    /// Adds a `>` condition.
    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Gt, value)
    }

    /// Adds a `>=` condition.
    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Gte, value)
    }

    /// Adds a `LIKE` condition.
    pub fn like(self, field: &str, pattern: &str) -> Self {
        self.with_op(field, Operator::Like, pattern)
    }

    /// Adds a `NOT LIKE` condition.
    pub fn not_like(self, field: &str, pattern: &str) -> Self {
        self.with_op(field, Operator::NotLike, pattern)
    }

    /// Adds an `IS NULL` condition.
    pub fn is_null(self, field: &str) -> Self {
        self.with_op(field, Operator::Is, Value::Null)
    }

    /// Adds an `IS NOT NULL` condition.
    pub fn is_not_null(self, field: &str) -> Self {
        self.with_op(field, Operator::IsNot, Value::Null)
    }

    /// Adds an `IN` condition.
    pub fn in_list<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with_op(field, Operator::In, list)
    }

    /// Adds a `NOT IN` condition.
    pub fn not_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with_op(field, Operator::NotIn, list)
    }

    /// Adds a `BETWEEN` condition (inclusive bounds).
    pub fn between(self, field: &str, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        self.with_op(field, Operator::Between, vec![start.into(), end.into()])
    }

    /// Adds a `NOT BETWEEN` condition.
    pub fn not_between(self, field: &str, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        self.with_op(field, Operator::NotBetween, vec![start.into(), end.into()])
    }

    /// Adds an `INSTANCEOF` condition against an entity name.
    pub fn instance_of(self, field: &str, entity: &str) -> Self {
        self.with_op(field, Operator::InstanceOf, entity)
    }

    /// Iterates over `(field path, criteria)` entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldCriteria)> {
        self.entries
            .iter()
            .map(|(field, criteria)| (field.as_str(), criteria))
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of field paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'de> Deserialize<'de> for FieldCriteria {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FieldCriteriaVisitor)
    }
}

struct FieldCriteriaVisitor;

impl<'de> Visitor<'de> for FieldCriteriaVisitor {
    type Value = FieldCriteria;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a value or a map of operators to values")
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_unit().map(FieldCriteria::Value)
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_none().map(FieldCriteria::Value)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<FieldCriteria, D::Error>
    where
        D: Deserializer<'de>,
    {
        FieldCriteria::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_bool(b).map(FieldCriteria::Value)
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_i64(n).map(FieldCriteria::Value)
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_u64(n).map(FieldCriteria::Value)
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_f64(n).map(FieldCriteria::Value)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_str(s).map(FieldCriteria::Value)
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<FieldCriteria, E> {
        ValueVisitor.visit_string(s).map(FieldCriteria::Value)
    }

    fn visit_seq<A>(self, seq: A) -> Result<FieldCriteria, A::Error>
    where
        A: SeqAccess<'de>,
    {
        ValueVisitor.visit_seq(seq).map(FieldCriteria::Value)
    }

    fn visit_map<A>(self, mut map: A) -> Result<FieldCriteria, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((op, value)) = map.next_entry::<String, Value>()? {
            pairs.push((op, value));
        }
        Ok(FieldCriteria::Operators(pairs))
    }
}

impl<'de> Deserialize<'de> for Criteria {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CriteriaVisitor;

        impl<'de> Visitor<'de> for CriteriaVisitor {
            type Value = Criteria;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field paths to criteria")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Criteria, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut criteria = Criteria::new();
                while let Some((field, field_criteria)) =
                    map.next_entry::<String, FieldCriteria>()?
                {
                    criteria = criteria.with_criteria(&field, field_criteria);
                }
                Ok(criteria)
            }
        }

        deserializer.deserialize_map(CriteriaVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn ops(criteria: &FieldCriteria) -> Vec<(String, Value)> {
        criteria
            .conditions()
            .into_iter()
            .map(|(op, value)| (op, value.clone()))
            .collect()
    }

    #[test]
    fn shorthand_expansion() {
        assert_eq!(
            ops(&FieldCriteria::Value(Value::Null)),
            [("IS".to_string(), Value::Null)]
        );
        assert_eq!(
            ops(&FieldCriteria::Value(Value::from(vec![1i64, 2]))),
            [("IN".to_string(), Value::from(vec![1i64, 2]))]
        );
        assert_eq!(
            ops(&FieldCriteria::Value(Value::from("x"))),
            [("=".to_string(), Value::from("x"))]
        );
    }

    #[test]
    fn empty_list_and_empty_map_yield_nothing() {
        assert!(FieldCriteria::Value(Value::from(Vec::<i64>::new())).conditions().is_empty());
        assert!(FieldCriteria::Operators(vec![]).conditions().is_empty());
    }

    #[test]
    fn operator_keys_are_upper_cased_and_merged() {
        let criteria = FieldCriteria::Operators(vec![
            ("like".into(), Value::from("a%")),
            (">".into(), Value::from(1i64)),
            ("LIKE".into(), Value::from("b%")),
        ]);
        assert_eq!(
            ops(&criteria),
            [
                ("LIKE".to_string(), Value::from("b%")),
                (">".to_string(), Value::from(1i64)),
            ]
        );
    }

    #[test]
    fn builder_merges_operators_per_field() {
        let criteria = Criteria::new().gte("age", 18).lt("age", 65).eq("name", "x");
        assert_eq!(criteria.len(), 2);

        let (field, age) = criteria.iter().next().unwrap();
        assert_eq!(field, "age");
        assert_eq!(
            age,
            &FieldCriteria::Operators(vec![
                (">=".into(), Value::from(18)),
                ("<".into(), Value::from(65)),
            ])
        );
    }

    #[test]
    fn builder_expands_shorthand_before_adding() {
        let criteria = Criteria::new().with("deletedAt", Value::Null).ne("deletedAt", "x");
        let (_, deleted) = criteria.iter().next().unwrap();
        assert_eq!(
            deleted,
            &FieldCriteria::Operators(vec![
                ("IS".into(), Value::Null),
                ("!=".into(), Value::from("x")),
            ])
        );
    }

    #[test]
    fn with_replaces_in_place() {
        let criteria = Criteria::new().eq("a", 1).eq("b", 2).with("a", 3);
        let entries: Vec<_> = criteria.iter().map(|(f, c)| (f, c.clone())).collect();
        assert_eq!(
            entries,
            [
                ("a", FieldCriteria::Value(Value::from(3))),
                (
                    "b",
                    FieldCriteria::Operators(vec![("=".into(), Value::from(2))])
                ),
            ]
        );
    }

    #[test]
    fn range_helpers_build_two_item_lists() {
        let criteria = Criteria::new().between("age", 18, 65);
        let (_, age) = criteria.iter().next().unwrap();
        assert_eq!(
            age,
            &FieldCriteria::Operators(vec![(
                "BETWEEN".into(),
                Value::List(vec![
                    Value::Number(Number::I64(18)),
                    Value::Number(Number::I64(65))
                ])
            )])
        );
    }

    #[test]
    fn deserialize_preserves_order() {
        let criteria: Criteria = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let fields: Vec<_> = criteria.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ["z", "a", "m"]);
    }

    #[test]
    fn deserialize_operator_maps() {
        let criteria: Criteria =
            serde_json::from_str(r#"{"age": {"not between": [1, 2], "!=": null}}"#).unwrap();
        let (_, age) = criteria.iter().next().unwrap();
        assert_eq!(
            age,
            &FieldCriteria::Operators(vec![
                ("not between".into(), Value::from(vec![1i64, 2])),
                ("!=".into(), Value::Null),
            ])
        );
    }

    #[test]
    fn deserialize_from_yaml() {
        let yaml = "name: Ada\nage:\n  '>': 30\n";
        let criteria: Criteria = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(criteria, Criteria::new().with("name", "Ada").gt("age", 30));
    }

    #[test]
    fn deserialize_rejects_nested_maps_as_values() {
        let result = serde_json::from_str::<Criteria>(r#"{"age": {"=": {"x": 1}}}"#);
        assert!(result.is_err());
    }
}
