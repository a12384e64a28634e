use thiserror::Error;

/// Errors produced by entity model operations.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("field name uses the reserved key convention: {0}")]
    ReservedField(String),

    #[error("object id is already set and immutable")]
    IdentityAlreadySet,
}
