//! Find operations over one root entity.

use crate::builder::{QueryBuilder, SelectQuery};
use crate::config::TranslatorOptions;
use crate::criteria::Criteria;
use crate::error::{CriteriaError, Result};
use crate::metadata::MetadataSource;
use crate::ordering::Sort;
use crate::translate::Translation;

/// Translates criteria against a single root entity.
///
/// A repository holds no per-query state. Every call starts a fresh
/// translation with its own aliases and joins, so one repository can serve
/// any number of queries, from any number of threads if `M` allows it.
///
/// ```
/// use criteria_query::{Criteria, EntityMetadata, Repository, Schema, Sort};
///
/// let schema = Schema::new()
///     .entity(
///         EntityMetadata::new("User")
///             .fields(["id", "name"])
///             .association("address", "Address"),
///     )
///     .entity(EntityMetadata::new("Address").fields(["id", "city"]));
///
/// let users = Repository::new(&schema, "User").unwrap();
/// let query = users
///     .find_by(
///         &Criteria::new().like("address.city", "Lon%"),
///         Some(&Sort::new().asc("name")),
///         Some(10),
///         None,
///     )
///     .unwrap();
///
/// let rendered = query.to_string();
/// assert!(rendered.starts_with(
///     "SELECT _t0 FROM User _t0 INNER JOIN _t0.address _t1 WHERE _t1.city LIKE :parameter_"
/// ));
/// assert!(rendered.ends_with(" ORDER BY _t0.name ASC LIMIT 10"));
/// ```
#[derive(Debug, Clone)]
pub struct Repository<M: MetadataSource> {
    source: M,
    entity: String,
    options: TranslatorOptions,
}

impl<M: MetadataSource> Repository<M> {
    /// Creates a repository for `entity` with default options.
    ///
    /// Fails with [`CriteriaError::UnknownEntity`] if `source` has no
    /// metadata for `entity`.
    pub fn new(source: M, entity: impl Into<String>) -> Result<Self> {
        let entity = entity.into();
        if !source.has_metadata_for(&entity) {
            return Err(CriteriaError::UnknownEntity(entity));
        }
        Ok(Repository {
            source,
            entity,
            options: TranslatorOptions::default(),
        })
    }

    /// Replaces the translator options after validating them.
    pub fn with_options(mut self, options: TranslatorOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Root entity name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Metadata source.
    pub fn source(&self) -> &M {
        &self.source
    }

    /// Translator options in effect.
    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Selects root entities matching `criteria`.
    pub fn find_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&Sort>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<SelectQuery> {
        let mut query = SelectQuery::new();
        self.translate_into(&mut query, criteria, order_by, limit, offset)?;
        Ok(query)
    }

    /// Selects at most one root entity matching `criteria`.
    pub fn find_one_by(&self, criteria: &Criteria, order_by: Option<&Sort>) -> Result<SelectQuery> {
        self.find_by(criteria, order_by, Some(1), Some(0))
    }

    /// Counts distinct root entities matching `criteria`.
    pub fn find_count_by(&self, criteria: &Criteria) -> Result<SelectQuery> {
        let mut query = SelectQuery::new();
        self.count_into(&mut query, criteria)?;
        Ok(query)
    }

    /// Counts all root entities.
    pub fn find_count_all(&self) -> Result<SelectQuery> {
        self.find_count_by(&Criteria::new())
    }

    /// Runs the [`find_by`](Self::find_by) translation against an external
    /// builder.
    ///
    /// On error the builder may hold a partial query and should be
    /// discarded.
    pub fn translate_into<B: QueryBuilder>(
        &self,
        builder: &mut B,
        criteria: &Criteria,
        order_by: Option<&Sort>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<()> {
        let mut translation = Translation::new(&self.source, &self.options, &self.entity)?;
        builder.from(translation.root_name(), translation.root_alias());

        translation.apply_criteria(builder, criteria)?;
        if let Some(sort) = order_by {
            translation.apply_order(builder, sort)?;
        }
        builder.set_max_results(limit);
        builder.set_first_result(offset);

        tracing::debug!(
            entity = %self.entity,
            conditions = criteria.len(),
            joins = translation.join_count(),
            ?limit,
            ?offset,
            "translated find"
        );
        Ok(())
    }

    /// Runs the [`find_count_by`](Self::find_count_by) translation against
    /// an external builder.
    pub fn count_into<B: QueryBuilder>(&self, builder: &mut B, criteria: &Criteria) -> Result<()> {
        let mut translation = Translation::new(&self.source, &self.options, &self.entity)?;
        builder.from(translation.root_name(), translation.root_alias());
        builder.select_count_distinct(translation.root_alias());

        translation.apply_criteria(builder, criteria)?;

        tracing::debug!(
            entity = %self.entity,
            conditions = criteria.len(),
            joins = translation.join_count(),
            "translated count"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityMetadata, Schema};

    fn schema() -> Schema {
        Schema::new().entity(EntityMetadata::new("User").fields(["id", "name"]))
    }

    #[test]
    fn unknown_entity() {
        let schema = schema();
        assert_eq!(
            Repository::new(&schema, "Order").unwrap_err(),
            CriteriaError::UnknownEntity("Order".into())
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let schema = schema();
        let options = TranslatorOptions {
            alias_prefix: "a b".into(),
            ..TranslatorOptions::default()
        };
        let result = Repository::new(&schema, "User").unwrap().with_options(options);
        assert!(matches!(
            result,
            Err(CriteriaError::InvalidOption { option: "alias_prefix", .. })
        ));
    }

    #[test]
    fn owned_source() {
        let users = Repository::new(schema(), "User").unwrap();
        assert_eq!(users.entity(), "User");
        assert_eq!(users.options(), &TranslatorOptions::default());
        assert_eq!(
            users.find_count_all().unwrap().to_string(),
            "SELECT COUNT(DISTINCT _t0) FROM User _t0"
        );
    }

    #[test]
    fn custom_prefixes() {
        let users = Repository::new(schema(), "User")
            .unwrap()
            .with_options(TranslatorOptions {
                alias_prefix: "u".into(),
                parameter_prefix: "p_".into(),
            })
            .unwrap();
        let query = users
            .find_by(&Criteria::new().eq("name", "Ada"), None, None, None)
            .unwrap();
        assert!(query.to_string().starts_with("SELECT u0 FROM User u0 WHERE u0.name = :p_"));
        assert!(query.parameters().keys().all(|name| name.starts_with("p_")));
    }
}
