use serde_json::Value;

use crate::error::SdkResult;

/// HTTP endpoint paths of the Strato backend.
pub mod endpoints {
    pub const BATCH: &str = "/v1/data/batch";
    pub const OBJECT: &str = "/v1/data/object";
}

/// Raw reply from the HTTP collaborator.
#[derive(Clone, Debug)]
pub struct TransportReply {
    pub body: String,
    pub status: u16,
}

/// Seam to the external HTTP collaborator.
///
/// Connection handling, credentials, retries, and timeouts all live behind
/// this trait; the SDK core only issues a request body and receives a raw
/// JSON body plus status code back.
pub trait Transport: Send + Sync {
    fn execute(&self, endpoint: &str, body: &Value) -> SdkResult<TransportReply>;
}
