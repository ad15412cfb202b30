//! Entity metadata seams.
//!
//! The translator never inspects entities directly. It asks a
//! [`MetadataSource`] for the [`ClassMetadata`] of an entity and follows
//! associations by name. [`Schema`] and [`EntityMetadata`] are the in-crate
//! implementations; an ORM integration can implement the traits over its
//! own mapping information instead.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::{CriteriaError, Result};

/// Mapping information of a single entity.
pub trait ClassMetadata {
    /// Entity name, used in error messages and the `FROM` clause.
    fn name(&self) -> &str;

    /// Returns `true` if `field` is a mapped field.
    fn has_field(&self, field: &str) -> bool;

    /// Returns `true` if `association` is a mapped association.
    fn has_association(&self, association: &str) -> bool;

    /// Returns the target entity name of an association.
    fn association_target(&self, association: &str) -> Option<&str>;
}

/// Lookup of entity metadata by name.
pub trait MetadataSource {
    /// Metadata type handed out by this source.
    type Metadata: ClassMetadata;

    /// Returns the metadata of `entity`, if it is known.
    fn metadata_for(&self, entity: &str) -> Option<&Self::Metadata>;

    /// Returns `true` if `name` names a known entity.
    fn has_metadata_for(&self, name: &str) -> bool {
        self.metadata_for(name).is_some()
    }
}

/// Types that describe themselves as entities.
///
/// Usually derived:
///
/// ```
/// use criteria_query::{ClassMetadata, Entity};
///
/// #[derive(Entity)]
/// struct User {
///     #[criteria(id)]
///     id: i64,
///     name: String,
///     #[criteria(association = "Address")]
///     address: Address,
/// }
///
/// #[derive(Entity)]
/// struct Address {
///     city: String,
/// }
///
/// let user = User::metadata();
/// assert_eq!(User::ENTITY, "User");
/// assert!(user.has_field(User::NAME));
/// assert_eq!(user.association_target(User::ADDRESS), Some("Address"));
/// ```
pub trait Entity {
    /// Entity name.
    const ENTITY: &'static str;

    /// Returns the mapping information of this entity.
    fn metadata() -> EntityMetadata;
}

/// Concrete [`ClassMetadata`]: a name, a field set and an association map.
///
/// ```
/// use criteria_query::{ClassMetadata, EntityMetadata};
///
/// let user = EntityMetadata::new("User")
///     .fields(["id", "name"])
///     .association("address", "Address");
///
/// assert!(user.has_field("name"));
/// assert!(user.has_association("address"));
/// assert_eq!(user.association_target("address"), Some("Address"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    name: String,
    fields: BTreeSet<String>,
    associations: BTreeMap<String, String>,
}

impl EntityMetadata {
    /// Creates metadata for `name` with no fields or associations.
    pub fn new(name: impl Into<String>) -> Self {
        EntityMetadata {
            name: name.into(),
            fields: BTreeSet::new(),
            associations: BTreeMap::new(),
        }
    }

    /// Adds a field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into());
        self
    }

    /// Adds several fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds an association pointing at `target`.
    pub fn association(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.associations.insert(name.into(), target.into());
        self
    }

    /// Iterates over field names in lexical order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Iterates over `(association, target)` pairs in lexical order.
    pub fn associations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.associations
            .iter()
            .map(|(name, target)| (name.as_str(), target.as_str()))
    }
}

impl ClassMetadata for EntityMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    fn has_association(&self, association: &str) -> bool {
        self.associations.contains_key(association)
    }

    fn association_target(&self, association: &str) -> Option<&str> {
        self.associations.get(association).map(String::as_str)
    }
}

/// Registry of entity metadata, keyed by entity name.
///
/// A schema can be assembled in code or deserialized:
///
/// ```yaml
/// entities:
///   User:
///     fields: [id, name]
///     associations:
///       address: Address
///   Address:
///     fields: [id, city]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SchemaDef")]
pub struct Schema {
    entities: BTreeMap<String, EntityMetadata>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Adds (or replaces) an entity.
    pub fn entity(mut self, metadata: EntityMetadata) -> Self {
        self.entities.insert(metadata.name.clone(), metadata);
        self
    }

    /// Adds the metadata of a type implementing [`Entity`].
    pub fn register<E: Entity>(self) -> Self {
        self.entity(E::metadata())
    }

    /// Iterates over entity names in lexical order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Checks that every association targets a registered entity.
    pub fn validate(&self) -> Result<()> {
        for metadata in self.entities.values() {
            for (_, target) in metadata.associations() {
                if !self.entities.contains_key(target) {
                    return Err(CriteriaError::UnknownEntity(target.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl MetadataSource for Schema {
    type Metadata = EntityMetadata;

    fn metadata_for(&self, entity: &str) -> Option<&EntityMetadata> {
        self.entities.get(entity)
    }
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    type Metadata = S::Metadata;

    fn metadata_for(&self, entity: &str) -> Option<&S::Metadata> {
        (**self).metadata_for(entity)
    }

    fn has_metadata_for(&self, name: &str) -> bool {
        (**self).has_metadata_for(name)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDef {
    #[serde(default)]
    entities: BTreeMap<String, EntityDef>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityDef {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    associations: BTreeMap<String, String>,
}

impl From<SchemaDef> for Schema {
    fn from(def: SchemaDef) -> Self {
        let entities = def
            .entities
            .into_iter()
            .map(|(name, entity)| {
                let metadata = EntityMetadata {
                    name: name.clone(),
                    fields: entity.fields.into_iter().collect(),
                    associations: entity.associations,
                };
                (name, metadata)
            })
            .collect();
        Schema { entities }
    }
}
