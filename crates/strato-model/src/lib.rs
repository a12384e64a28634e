//! Entity model for the Strato client SDK.
//!
//! An [`Entity`] is the dynamic form of a persistable object: a class tag, an
//! optional identity, and a graph of [`FieldValue`]s. Typed application
//! structs participate through the [`Persistable`] trait and the codec's
//! serde bridge.

pub mod entity;
pub mod error;
pub mod persist;
pub mod value;

pub use entity::Entity;
pub use error::ModelError;
pub use persist::Persistable;
pub use value::FieldValue;
