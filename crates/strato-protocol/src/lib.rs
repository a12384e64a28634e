//! Response protocol for the Strato client SDK.
//!
//! Parses raw batch-response bodies into structured, queryable
//! [`BatchResponse`] values and classifies HTTP status codes into named
//! outcomes per operation kind.

pub mod error;
pub mod response;
pub mod status;

pub use error::{ProtocolError, ProtocolResult};
pub use response::{BatchResponse, Disposition, SuccessEntry};
pub use status::{classify, is_success, OperationKind, Outcome};
