//! Error types for criteria translation.

use thiserror::Error;

use crate::op::Operator;

/// Errors that can occur while translating criteria into a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    /// The repository was created for an entity the metadata source does not know.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The leaf of a field path is neither a field nor an association.
    #[error("Unknown field: {entity}#{field}")]
    UnknownField { entity: String, field: String },

    /// A non-leaf segment of a field path is not an association.
    #[error("Unknown association: {entity}#{association}")]
    UnknownAssociation { entity: String, association: String },

    /// The operator is not part of the supported set.
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// The value's kind does not admit the operator.
    #[error("Invalid value type specified for operator \"{0}\".")]
    InvalidOperatorValue(Operator),

    /// An ordering direction other than `ASC` or `DESC`.
    #[error("Invalid order direction: {0}")]
    InvalidDirection(String),

    /// A translator option that would not render as a plain identifier.
    #[error("Invalid value for option {option}: {value:?}")]
    InvalidOption { option: &'static str, value: String },
}

/// Result type for criteria operations.
pub type Result<T> = std::result::Result<T, CriteriaError>;
