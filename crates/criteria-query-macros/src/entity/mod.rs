//! Implementation of the `#[derive(Entity)]` macro.
//!
//! Generates entity metadata and field name constants from struct
//! annotations.

mod attrs;
mod derive;

pub use derive::entity_derive_impl;
