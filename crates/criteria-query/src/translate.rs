//! Criteria walking and condition building.
//!
//! A [`Translation`] carries the state of one query: the root metadata and
//! the join registry. It resolves field paths to aliased fields, validates
//! each operator against the value's [`Kind`], and forwards joins,
//! predicates, parameters and orderings to a [`QueryBuilder`].

use crate::builder::{Operand, Predicate, QueryBuilder};
use crate::config::TranslatorOptions;
use crate::criteria::Criteria;
use crate::error::{CriteriaError, Result};
use crate::joins::JoinRegistry;
use crate::kind::Kind;
use crate::metadata::{ClassMetadata, MetadataSource};
use crate::op::{Operator, Shape};
use crate::ordering::Sort;
use crate::value::Value;

/// Derives the parameter name for a condition.
///
/// The name depends only on the aliased field, the operator and the value,
/// so identical conditions share a parameter and values never appear in
/// query text.
///
/// ```
/// use criteria_query::{parameter_name, Operator, Value};
///
/// let a = parameter_name("parameter_", "_t0.name", Operator::Eq, &Value::from("Ada"));
/// let b = parameter_name("parameter_", "_t0.name", Operator::Eq, &Value::from("Ada"));
/// let c = parameter_name("parameter_", "_t0.name", Operator::Ne, &Value::from("Ada"));
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert!(a.starts_with("parameter_"));
/// assert_eq!(a.len(), "parameter_".len() + 32);
/// ```
pub fn parameter_name(prefix: &str, field: &str, op: Operator, value: &Value) -> String {
    let digest = md5::compute(format!("{field}\u{1f}{op}\u{1f}{value:?}"));
    format!("{prefix}{digest:x}")
}

pub(crate) struct Translation<'a, M: MetadataSource> {
    source: &'a M,
    options: &'a TranslatorOptions,
    root: &'a M::Metadata,
    joins: JoinRegistry,
}

impl<'a, M: MetadataSource> Translation<'a, M> {
    pub(crate) fn new(source: &'a M, options: &'a TranslatorOptions, entity: &str) -> Result<Self> {
        let root = source
            .metadata_for(entity)
            .ok_or_else(|| CriteriaError::UnknownEntity(entity.to_string()))?;
        Ok(Translation {
            source,
            options,
            root,
            joins: JoinRegistry::new(&options.alias_prefix),
        })
    }

    pub(crate) fn root_name(&self) -> &'a str {
        self.root.name()
    }

    pub(crate) fn root_alias(&self) -> &str {
        self.joins.root_alias()
    }

    pub(crate) fn join_count(&self) -> usize {
        self.joins.len()
    }

    /// Adds every condition of `criteria`, in order.
    pub(crate) fn apply_criteria<B: QueryBuilder>(
        &mut self,
        builder: &mut B,
        criteria: &Criteria,
    ) -> Result<()> {
        for (path, field_criteria) in criteria.iter() {
            let field = self.resolve(builder, path)?;
            for (op, value) in field_criteria.conditions() {
                let op = Operator::parse(&op)?;
                if !Kind::of(value, self.source).admits(op) {
                    return Err(CriteriaError::InvalidOperatorValue(op));
                }
                self.add_condition(builder, &field, op, value)?;
            }
        }
        Ok(())
    }

    /// Adds every ordering of `sort`, sharing joins with the criteria.
    pub(crate) fn apply_order<B: QueryBuilder>(&mut self, builder: &mut B, sort: &Sort) -> Result<()> {
        for order_by in sort.iter() {
            let field = self.resolve(builder, &order_by.field)?;
            tracing::trace!(field = %field, dir = %order_by.dir, "added ordering");
            builder.add_order_by(&field, order_by.dir);
        }
        Ok(())
    }

    /// Resolves a field path to `alias.leaf`, joining every association on
    /// the way.
    fn resolve<B: QueryBuilder>(&mut self, builder: &mut B, path: &str) -> Result<String> {
        let source = self.source;
        let mut metadata = self.root;
        let mut alias = self.joins.root_alias().to_string();

        let (associations, leaf) = match path.rsplit_once('.') {
            Some((associations, leaf)) => (Some(associations), leaf),
            None => (None, path),
        };

        if let Some(associations) = associations {
            let mut walked = String::with_capacity(associations.len());
            for association in associations.split('.') {
                let target = match metadata.association_target(association) {
                    Some(target) if metadata.has_association(association) => target,
                    _ => {
                        return Err(CriteriaError::UnknownAssociation {
                            entity: metadata.name().to_string(),
                            association: association.to_string(),
                        })
                    }
                };

                if !walked.is_empty() {
                    walked.push('.');
                }
                walked.push_str(association);

                let (next, created) = self.joins.join(&walked, &alias, association);
                if let Some(join) = created {
                    tracing::debug!(path = %walked, join = %join.join, alias = %join.alias, "registered inner join");
                    builder.inner_join(&join.join, &join.alias);
                }
                alias = next;

                metadata = source
                    .metadata_for(target)
                    .ok_or_else(|| CriteriaError::UnknownEntity(target.to_string()))?;
            }
        }

        if !(metadata.has_field(leaf) || metadata.has_association(leaf)) {
            return Err(CriteriaError::UnknownField {
                entity: metadata.name().to_string(),
                field: leaf.to_string(),
            });
        }

        Ok(format!("{alias}.{leaf}"))
    }

    fn add_condition<B: QueryBuilder>(
        &self,
        builder: &mut B,
        field: &str,
        op: Operator,
        value: &Value,
    ) -> Result<()> {
        let prefix = &self.options.parameter_prefix;

        let bound: Vec<(String, &Value)> = match op.shape() {
            Shape::Scalar | Shape::List => vec![(parameter_name(prefix, field, op, value), value)],
            Shape::Range => match value.as_list() {
                Some([start, end]) => vec![
                    (parameter_name(prefix, field, op, start), start),
                    (parameter_name(prefix, field, op, end), end),
                ],
                _ => return Err(CriteriaError::InvalidOperatorValue(op)),
            },
        };

        let operand = match (op.shape(), bound.as_slice()) {
            (Shape::Scalar, [(name, _)]) => Operand::Param(name.clone()),
            (Shape::List, [(name, _)]) => Operand::List(name.clone()),
            (Shape::Range, [(start, _), (end, _)]) => Operand::Range(start.clone(), end.clone()),
            _ => return Err(CriteriaError::InvalidOperatorValue(op)),
        };

        let predicate = Predicate {
            field: field.to_string(),
            op,
            operand,
        };
        tracing::trace!(predicate = %predicate, "added condition");
        builder.and_where(predicate);

        for (name, value) in bound {
            builder.set_parameter(&name, value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SelectQuery;
    use crate::metadata::{EntityMetadata, Schema};

    fn schema() -> Schema {
        Schema::new()
            .entity(
                EntityMetadata::new("User")
                    .fields(["id", "name"])
                    .association("address", "Address"),
            )
            .entity(
                EntityMetadata::new("Address")
                    .fields(["id", "street"])
                    .association("city", "City"),
            )
            .entity(EntityMetadata::new("City").fields(["id", "name"]))
    }

    fn resolve(translation: &mut Translation<'_, Schema>, path: &str) -> Result<String> {
        let mut query = SelectQuery::new();
        translation.resolve(&mut query, path)
    }

    #[test]
    fn resolve_plain_field() {
        let schema = schema();
        let options = TranslatorOptions::default();
        let mut translation = Translation::new(&schema, &options, "User").unwrap();
        assert_eq!(resolve(&mut translation, "name").unwrap(), "_t0.name");
        assert_eq!(resolve(&mut translation, "address").unwrap(), "_t0.address");
        assert_eq!(translation.join_count(), 0);
    }

    #[test]
    fn resolve_nested_path() {
        let schema = schema();
        let options = TranslatorOptions::default();
        let mut translation = Translation::new(&schema, &options, "User").unwrap();
        assert_eq!(resolve(&mut translation, "address.city.name").unwrap(), "_t2.name");
        assert_eq!(resolve(&mut translation, "address.street").unwrap(), "_t1.street");
        assert_eq!(translation.join_count(), 2);
    }

    #[test]
    fn resolve_errors() {
        let schema = schema();
        let options = TranslatorOptions::default();
        let mut translation = Translation::new(&schema, &options, "User").unwrap();

        assert_eq!(
            resolve(&mut translation, "nmae").unwrap_err(),
            CriteriaError::UnknownField {
                entity: "User".into(),
                field: "nmae".into()
            }
        );
        assert_eq!(
            resolve(&mut translation, "name.first").unwrap_err(),
            CriteriaError::UnknownAssociation {
                entity: "User".into(),
                association: "name".into()
            }
        );
        assert_eq!(
            resolve(&mut translation, "address.zip").unwrap_err(),
            CriteriaError::UnknownField {
                entity: "Address".into(),
                field: "zip".into()
            }
        );
        assert!(matches!(
            resolve(&mut translation, "address..name"),
            Err(CriteriaError::UnknownAssociation { .. })
        ));
        assert!(matches!(
            resolve(&mut translation, "address."),
            Err(CriteriaError::UnknownField { .. })
        ));
    }

    #[test]
    fn unknown_root_entity() {
        let schema = schema();
        let options = TranslatorOptions::default();
        assert!(matches!(
            Translation::new(&schema, &options, "Order"),
            Err(CriteriaError::UnknownEntity(name)) if name == "Order"
        ));
    }

    #[test]
    fn dangling_association_target() {
        let schema = Schema::new().entity(EntityMetadata::new("User").association("team", "Team"));
        let options = TranslatorOptions::default();
        let mut translation = Translation::new(&schema, &options, "User").unwrap();
        assert_eq!(
            resolve(&mut translation, "team.name").unwrap_err(),
            CriteriaError::UnknownEntity("Team".into())
        );
    }

    #[test]
    fn parameter_names_depend_on_every_input() {
        let value = Value::from(1i64);
        let base = parameter_name("p_", "_t0.id", Operator::Eq, &value);
        assert_ne!(base, parameter_name("q_", "_t0.id", Operator::Eq, &value));
        assert_ne!(base, parameter_name("p_", "_t1.id", Operator::Eq, &value));
        assert_ne!(base, parameter_name("p_", "_t0.id", Operator::Gt, &value));
        assert_ne!(base, parameter_name("p_", "_t0.id", Operator::Eq, &Value::from(2i64)));
        assert_ne!(base, parameter_name("p_", "_t0.id", Operator::Eq, &Value::from(1.0f64)));
    }
}
