use std::collections::BTreeMap;
use std::fmt;

use strato_types::{keys, ObjectId};

use crate::error::ModelError;
use crate::value::FieldValue;

/// The dynamic form of a persistable object.
///
/// An entity carries a class tag, an optional identity, and a graph of
/// application fields. An entity without an identity is *transient*: it has
/// not yet been mapped to a stored record.
///
/// Equality covers the class tag, identity, field graph, and linked services;
/// local bookkeeping (dirty flag, owner) is excluded. Identity alone is not
/// enough because the backend may reuse the same id namespace across
/// collections.
#[derive(Clone)]
pub struct Entity {
    class_tag: String,
    object_id: Option<ObjectId>,
    fields: BTreeMap<String, FieldValue>,
    services: Vec<String>,
    dirty: bool,
    owner_id: Option<String>,
}

impl Entity {
    /// Create a transient entity with the given class tag.
    pub fn new(class_tag: impl Into<String>) -> Self {
        Self {
            class_tag: class_tag.into(),
            object_id: None,
            fields: BTreeMap::new(),
            services: Vec::new(),
            dirty: false,
            owner_id: None,
        }
    }

    /// Create an entity that already maps to a stored record.
    pub fn with_id(class_tag: impl Into<String>, id: ObjectId) -> Self {
        let mut e = Self::new(class_tag);
        e.object_id = Some(id);
        e
    }

    pub fn class_tag(&self) -> &str {
        &self.class_tag
    }

    pub fn object_id(&self) -> Option<&ObjectId> {
        self.object_id.as_ref()
    }

    /// `true` until the entity is bound to a stored record.
    pub fn is_transient(&self) -> bool {
        self.object_id.is_none()
    }

    /// Bind the identity. The id is immutable once set.
    pub fn assign_id(&mut self, id: ObjectId) -> Result<(), ModelError> {
        if self.object_id.is_some() {
            return Err(ModelError::IdentityAlreadySet);
        }
        self.object_id = Some(id);
        Ok(())
    }

    /// Set an application field. Reserved key names are rejected so wire
    /// metadata can never collide with application data.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if keys::is_reserved(&name) {
            return Err(ModelError::ReservedField(name));
        }
        self.fields.insert(name, value.into());
        self.dirty = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let prior = self.fields.remove(name);
        if prior.is_some() {
            self.dirty = true;
        }
        prior
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    // ---- User-like entity metadata ----

    /// Linked external-service names (user-like entities).
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn add_service(&mut self, service: impl Into<String>) {
        let service = service.into();
        if !self.services.contains(&service) {
            self.services.push(service);
        }
    }

    pub(crate) fn set_services(&mut self, services: Vec<String>) {
        self.services = services;
    }

    /// Replace the linked-service list wholesale (used by the codec).
    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.set_services(services);
        self
    }

    // ---- Local bookkeeping ----

    /// `true` when the entity has unsaved local changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn set_owner_id(&mut self, owner: impl Into<String>) {
        self.owner_id = Some(owner.into());
    }

    /// Reconcile a round-tripped server copy into this entity: adopts the
    /// server identity if this entity was transient, replaces fields with the
    /// server's versions, and clears the dirty flag.
    pub fn apply_update(&mut self, server_copy: &Entity) -> Result<(), ModelError> {
        if self.object_id.is_none() {
            if let Some(id) = server_copy.object_id() {
                self.object_id = Some(id.clone());
            }
        }
        for (name, value) in server_copy.fields() {
            self.fields.insert(name.to_owned(), value.clone());
        }
        if !server_copy.services.is_empty() {
            self.services = server_copy.services.clone();
        }
        self.dirty = false;
        Ok(())
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.class_tag == other.class_tag
            && self.object_id == other.object_id
            && self.fields == other.fields
            && self.services == other.services
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("class_tag", &self.class_tag)
            .field("object_id", &self.object_id)
            .field("fields", &self.fields)
            .field("services", &self.services)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Entity {
        let mut e = Entity::new("Player");
        e.set("name", "ada").unwrap();
        e.set("score", 100i64).unwrap();
        e
    }

    #[test]
    fn new_entity_is_transient() {
        let e = Entity::new("Player");
        assert!(e.is_transient());
        assert_eq!(e.class_tag(), "Player");
    }

    #[test]
    fn assign_id_is_write_once() {
        let mut e = Entity::new("Player");
        e.assign_id(ObjectId::new("p1").unwrap()).unwrap();
        assert!(!e.is_transient());
        let err = e.assign_id(ObjectId::new("p2").unwrap()).unwrap_err();
        assert_eq!(err, ModelError::IdentityAlreadySet);
        assert_eq!(e.object_id().unwrap().as_str(), "p1");
    }

    #[test]
    fn set_rejects_reserved_names() {
        let mut e = Entity::new("Player");
        let err = e.set("__class__", 1i64).unwrap_err();
        assert_eq!(err, ModelError::ReservedField("__class__".into()));
    }

    #[test]
    fn set_marks_dirty() {
        let mut e = Entity::new("Player");
        assert!(!e.is_dirty());
        e.set("name", "ada").unwrap();
        assert!(e.is_dirty());
        e.mark_clean();
        assert!(!e.is_dirty());
    }

    #[test]
    fn equality_covers_tag_id_and_fields() {
        let a = player();
        let b = player();
        assert_eq!(a, b);

        let mut c = player();
        c.set("score", 101i64).unwrap();
        assert_ne!(a, c);

        let mut d = player();
        d.assign_id(ObjectId::new("p1").unwrap()).unwrap();
        assert_ne!(a, d);

        let mut e = Entity::new("Npc");
        e.set("name", "ada").unwrap();
        e.set("score", 100i64).unwrap();
        assert_ne!(a, e);
    }

    #[test]
    fn equality_ignores_bookkeeping() {
        let a = player();
        let mut b = player();
        b.mark_clean();
        b.set_owner_id("owner-1");
        assert_eq!(a, b);
    }

    #[test]
    fn same_id_different_tag_not_equal() {
        let a = Entity::with_id("Player", ObjectId::new("shared").unwrap());
        let b = Entity::with_id("Npc", ObjectId::new("shared").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn add_service_deduplicates() {
        let mut e = Entity::new("User");
        e.add_service("github");
        e.add_service("github");
        e.add_service("google");
        assert_eq!(e.services(), ["github", "google"]);
    }

    #[test]
    fn apply_update_adopts_identity_and_fields() {
        let mut local = player();
        assert!(local.is_dirty());

        let mut server = player();
        server.assign_id(ObjectId::new("p9").unwrap()).unwrap();
        server.set("score", 250i64).unwrap();

        local.apply_update(&server).unwrap();
        assert_eq!(local.object_id().unwrap().as_str(), "p9");
        assert_eq!(local.get("score"), Some(&FieldValue::Int(250)));
        assert!(!local.is_dirty());
    }

    #[test]
    fn apply_update_keeps_existing_identity() {
        let mut local = Entity::with_id("Player", ObjectId::new("mine").unwrap());
        let server = Entity::with_id("Player", ObjectId::new("other").unwrap());
        local.apply_update(&server).unwrap();
        assert_eq!(local.object_id().unwrap().as_str(), "mine");
    }

    #[test]
    fn remove_returns_prior_value() {
        let mut e = player();
        assert_eq!(e.remove("score"), Some(FieldValue::Int(100)));
        assert_eq!(e.remove("score"), None);
        assert_eq!(e.field_count(), 1);
    }
}
