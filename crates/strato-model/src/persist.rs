use serde::de::DeserializeOwned;
use serde::Serialize;
use strato_types::ObjectId;

/// Capability trait for typed persistable structs.
///
/// Application types implement this instead of inheriting a base class: the
/// codec operates purely over the capability, converting implementors to and
/// from the dynamic [`Entity`](crate::Entity) form through serde. Equality of
/// two persisted values is defined over their entity forms (class tag,
/// identity, field graph), not over the native struct.
///
/// Implementors that carry an identity serialize it under the reserved
/// `__id__` key (`#[serde(rename = "__id__")]`) so it maps to the entity
/// identity rather than to an application field.
pub trait Persistable: Serialize + DeserializeOwned {
    /// Logical type tag emitted on the wire. Usually the short collection
    /// name registered with the class registry.
    fn class_tag() -> &'static str;

    /// The bound identity, if the value maps to a stored record.
    fn object_id(&self) -> Option<ObjectId>;

    /// `true` once the value is bound to a stored record.
    fn has_identity(&self) -> bool {
        self.object_id().is_some()
    }
}
