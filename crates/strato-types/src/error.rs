use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("object id must not be empty")]
    EmptyObjectId,

    #[error("latitude out of range: {0} (expected -90.0..=90.0)")]
    LatitudeOutOfRange(f64),

    #[error("longitude out of range: {0} (expected -180.0..=180.0)")]
    LongitudeOutOfRange(f64),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
