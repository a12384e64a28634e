use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier for a stored object.
///
/// An `ObjectId` is either assigned by the backend when a record is first
/// persisted, or generated client-side as a random UUID before the first
/// save. An entity that has no `ObjectId` yet is *transient*: it does not
/// map to any stored record.
///
/// Id equality alone does not imply object equality; the same id namespace
/// may be reused across collections, so entity comparison also considers the
/// class tag and field graph.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyObjectId);
        }
        Ok(Self(id))
    }

    /// Generate a random client-side identifier (UUID v4).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
