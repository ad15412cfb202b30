//! Proc macros for Criteria Query.
//!
//! # Available Macros
//!
//! - [`Entity`] - Generate entity metadata and field constants from a struct
//!
//! The generated code refers to `::criteria_query`, so the macro is normally
//! used through its re-export, `criteria_query::Entity`.
//!
//! # Examples
//!
//! For working examples, see `criteria-query/tests/entity_derive.rs`.

mod entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Entity` trait for a struct.
///
/// Every named field becomes a mapped field unless it is skipped or marked
/// as an association.
///
/// # Struct Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `entity = "..."` | Entity name (default: the struct name) |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Leave the field out of the metadata |
/// | `rename = "..."` | Use a custom name in criteria |
/// | `association = "..."` | Map the field as an association to the named entity |
/// | `id` | Identifier field; enables `From<&T> for Value` |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `User::NAME`, `User::ADDRESS`)
/// 2. `Entity::ENTITY` and `Entity::metadata()`
/// 3. With an `id` field: `From<&User> for Value`, producing an entity
///    reference. The id type must be `Clone` and convert into `Identifier`.
///
/// # Example
///
/// ```ignore
/// use criteria_query::{Criteria, Entity, Repository, Schema, Value};
///
/// #[derive(Entity)]
/// struct User {
///     #[criteria(id)]
///     id: i64,
///     name: String,
///     #[criteria(association = "Group")]
///     group: Group,
///     #[criteria(skip)]
///     cache: Vec<u8>,
/// }
///
/// #[derive(Entity)]
/// struct Group {
///     #[criteria(id)]
///     id: i64,
///     name: String,
/// }
///
/// let schema = Schema::new().register::<User>().register::<Group>();
/// let users = Repository::new(&schema, User::ENTITY).unwrap();
///
/// let criteria = Criteria::new().eq(User::NAME, "Ada");
/// let query = users.find_by(&criteria, None, None, None).unwrap();
/// ```
#[proc_macro_derive(Entity, attributes(criteria))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::entity_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
