//! Transport codec for the Strato client SDK.
//!
//! Converts entity graphs to and from the JSON wire form: reserved-key
//! metadata embedding, geo-point and date special forms, reference
//! flattening for repeated nodes, and a serde bridge for typed structs.

pub mod codec;
pub mod error;

pub use codec::{json_kind, TransportCodec, MAX_NESTING_DEPTH};
pub use error::{CodecError, CodecResult};
