//! High-level facade for the Strato client SDK.
//!
//! Applications register their classes at bootstrap, implement [`Transport`]
//! over their HTTP stack, and use [`DataStore`] to persist and load
//! entities. The core pipeline is: encode → transport → reconcile.

pub mod error;
pub mod store;
pub mod transport;

pub use error::{SdkError, SdkResult};
pub use store::{BatchSaveResult, DataStore};
pub use transport::{endpoints, Transport, TransportReply};

// Re-export key types
pub use strato_codec::{CodecError, TransportCodec};
pub use strato_model::{Entity, FieldValue, Persistable};
pub use strato_protocol::{BatchResponse, Disposition, OperationKind, Outcome};
pub use strato_registry::{ClassRegistry, Resolution};
pub use strato_types::{GeoPoint, ObjectId, Timestamp};
