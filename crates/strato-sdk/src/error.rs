use strato_protocol::Outcome;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("unexpected status {status}: classified {outcome:?}")]
    UnexpectedStatus { status: u16, outcome: Outcome },

    #[error("conversion error: {0}")]
    Codec(#[from] strato_codec::CodecError),

    #[error("protocol error: {0}")]
    Protocol(#[from] strato_protocol::ProtocolError),

    #[error("model error: {0}")]
    Model(#[from] strato_model::ModelError),
}

pub type SdkResult<T> = Result<T, SdkError>;
