//! Foundation types for the Strato client SDK.
//!
//! This crate provides the identity, geo, and temporal types shared by every
//! other Strato crate, plus the reserved key names of the JSON wire format.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Server-assigned or client-generated object identifier
//! - [`GeoPoint`] — Two-coordinate geographic value (wire special form)
//! - [`Timestamp`] — RFC 3339 instant (wire special form)

pub mod error;
pub mod geo;
pub mod keys;
pub mod object_id;
pub mod timestamp;

pub use error::TypeError;
pub use geo::GeoPoint;
pub use object_id::ObjectId;
pub use timestamp::Timestamp;
