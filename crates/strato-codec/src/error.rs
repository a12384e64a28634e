use thiserror::Error;

/// Conversion failures raised by encode/decode.
///
/// These surface immediately to the caller of a single-entity conversion;
/// batch response parsing records them per key instead (see
/// `strato-protocol`).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown class tag: {0}")]
    UnknownClass(String),

    #[error("object node carries no class tag and no expected class was supplied")]
    MissingClassTag,

    #[error("shape mismatch at `{field}`: expected {expected}, found {found}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("object graph nested past depth {limit}; cyclic graphs are not supported")]
    CyclicGraph { limit: usize },

    #[error("non-finite number {0} has no JSON representation")]
    NonFiniteNumber(f64),

    #[error("serde bridge error: {0}")]
    Serde(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
