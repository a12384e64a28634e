use strato_types::{GeoPoint, ObjectId, Timestamp};

use crate::entity::Entity;

/// A single application field value within an entity graph.
///
/// Integral JSON numbers map to `Int`, all other numbers to `Float`; the
/// codec applies this rule uniformly on decode.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(Timestamp),
    Geo(GeoPoint),
    List(Vec<FieldValue>),
    Entity(Box<Entity>),
    /// A by-id reference to an entity not nested inline, produced when the
    /// codec flattens a repeated node on an encoding path.
    Reference {
        class_tag: String,
        object_id: ObjectId,
    },
}

impl FieldValue {
    /// Short shape name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Geo(_) => "geo",
            Self::List(_) => "list",
            Self::Entity(_) => "entity",
            Self::Reference { .. } => "reference",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(v: Timestamp) -> Self {
        Self::Date(v)
    }
}

impl From<GeoPoint> for FieldValue {
    fn from(v: GeoPoint) -> Self {
        Self::Geo(v)
    }
}

impl From<Entity> for FieldValue {
    fn from(v: Entity) -> Self {
        Self::Entity(Box::new(v))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
