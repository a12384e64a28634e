//! Class registry for the Strato client SDK.
//!
//! The registry decouples wire type tags from native type names: the same
//! record shape can be produced by differently-named types across SDK
//! versions, and application code can use short stable tags instead of
//! brittle fully-qualified names.
//!
//! Registration is explicit, caller-invoked bootstrap; there is no implicit
//! scanning. A process-wide instance is available through
//! [`ClassRegistry::global`], and independent instances can be created for
//! tests.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// A registered (tag, native type) association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Logical type tag used on the wire.
    pub tag: String,
    /// Fully-qualified native type name.
    pub native_name: String,
    type_id: Option<TypeId>,
}

/// Result of a tag lookup. Resolution failure is a sentinel, not an error;
/// callers decide whether it escalates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Tag (or native name) is registered.
    Registered(TypeDescriptor),
    /// Unregistered, but the tag is itself a fully-qualified native path.
    Native(String),
    /// Neither registered nor resolvable as a native name.
    Unknown,
}

impl Resolution {
    /// The effective tag to carry forward, if resolution succeeded.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Registered(d) => Some(&d.tag),
            Self::Native(name) => Some(name),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

#[derive(Default)]
struct Tables {
    by_tag: HashMap<String, TypeDescriptor>,
    tag_by_type: HashMap<TypeId, String>,
    tag_by_native: HashMap<String, String>,
}

impl Tables {
    /// Drop every entry belonging to the descriptor currently registered
    /// under `tag`. Keeps the three maps coupled under one mutation.
    fn evict_tag(&mut self, tag: &str) {
        if let Some(old) = self.by_tag.remove(tag) {
            if let Some(type_id) = old.type_id {
                if self.tag_by_type.get(&type_id).map(String::as_str) == Some(tag) {
                    self.tag_by_type.remove(&type_id);
                }
            }
            if self.tag_by_native.get(&old.native_name).map(String::as_str) == Some(tag) {
                self.tag_by_native.remove(&old.native_name);
            }
        }
    }

    fn insert(&mut self, descriptor: TypeDescriptor) {
        // Last write wins on both sides: unhook any prior association for
        // this tag and for this type before inserting.
        self.evict_tag(&descriptor.tag);
        if let Some(type_id) = descriptor.type_id {
            if let Some(old_tag) = self.tag_by_type.remove(&type_id) {
                tracing::debug!(tag = %old_tag, new_tag = %descriptor.tag, "re-registering type under new tag");
                self.evict_tag(&old_tag);
            }
            self.tag_by_type.insert(type_id, descriptor.tag.clone());
        } else if let Some(old_tag) = self.tag_by_native.remove(&descriptor.native_name) {
            self.evict_tag(&old_tag);
        }
        self.tag_by_native
            .insert(descriptor.native_name.clone(), descriptor.tag.clone());
        self.by_tag.insert(descriptor.tag.clone(), descriptor);
    }
}

/// Bidirectional tag ↔ type mapping.
///
/// Both directions mutate under a single lock so a reader can never observe
/// a tag registered on one side but not the other.
pub struct ClassRegistry {
    tables: RwLock<Tables>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// The process-wide registry shared by independently-compiled modules.
    pub fn global() -> &'static ClassRegistry {
        static GLOBAL: OnceLock<ClassRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ClassRegistry::new)
    }

    /// Associate `tag` with the native type `T`. Overwrites any prior
    /// association for either side; last write wins.
    pub fn register<T: 'static>(&self, tag: impl Into<String>) {
        let descriptor = TypeDescriptor {
            tag: tag.into(),
            native_name: std::any::type_name::<T>().to_owned(),
            type_id: Some(TypeId::of::<T>()),
        };
        self.tables
            .write()
            .expect("class registry lock poisoned")
            .insert(descriptor);
    }

    /// Associate `tag` with a native type known only by name, for dynamic
    /// entities with no corresponding Rust struct.
    pub fn register_named(&self, tag: impl Into<String>, native_name: impl Into<String>) {
        let descriptor = TypeDescriptor {
            tag: tag.into(),
            native_name: native_name.into(),
            type_id: None,
        };
        self.tables
            .write()
            .expect("class registry lock poisoned")
            .insert(descriptor);
    }

    /// Resolve a wire tag. Falls back to treating the tag as a
    /// fully-qualified native type name: first among registered native
    /// names, then any `::`-qualified path is accepted as-is.
    pub fn resolve(&self, tag: &str) -> Resolution {
        let tables = self.tables.read().expect("class registry lock poisoned");
        if let Some(descriptor) = tables.by_tag.get(tag) {
            return Resolution::Registered(descriptor.clone());
        }
        if let Some(registered_tag) = tables.tag_by_native.get(tag) {
            if let Some(descriptor) = tables.by_tag.get(registered_tag) {
                return Resolution::Registered(descriptor.clone());
            }
        }
        if tag.contains("::") {
            return Resolution::Native(tag.to_owned());
        }
        Resolution::Unknown
    }

    /// The wire tag for `T`: the registered tag, or the fully-qualified
    /// native name when `T` was never registered.
    pub fn tag_for<T: 'static>(&self) -> String {
        let tables = self.tables.read().expect("class registry lock poisoned");
        tables
            .tag_by_type
            .get(&TypeId::of::<T>())
            .cloned()
            .unwrap_or_else(|| std::any::type_name::<T>().to_owned())
    }

    /// `true` if the tag is registered or resolvable as a native name.
    pub fn is_known(&self, tag: &str) -> bool {
        !self.resolve(tag).is_unknown()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player;
    struct Npc;

    #[test]
    fn register_then_resolve() {
        let reg = ClassRegistry::new();
        reg.register::<Player>("Player");
        match reg.resolve("Player") {
            Resolution::Registered(d) => {
                assert_eq!(d.tag, "Player");
                assert!(d.native_name.ends_with("Player"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert_eq!(reg.tag_for::<Player>(), "Player");
        assert!(reg.is_known("Player"));
    }

    #[test]
    fn unregistered_type_falls_back_to_native_name() {
        let reg = ClassRegistry::new();
        let tag = reg.tag_for::<Npc>();
        assert_eq!(tag, std::any::type_name::<Npc>());
    }

    #[test]
    fn resolve_accepts_qualified_native_paths() {
        let reg = ClassRegistry::new();
        let native = std::any::type_name::<Npc>();
        assert!(native.contains("::"));
        assert_eq!(reg.resolve(native), Resolution::Native(native.to_owned()));
        assert!(reg.is_known(native));
    }

    #[test]
    fn resolve_by_registered_native_name() {
        let reg = ClassRegistry::new();
        reg.register::<Player>("Player");
        let native = std::any::type_name::<Player>();
        match reg.resolve(native) {
            Resolution::Registered(d) => assert_eq!(d.tag, "Player"),
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn unknown_is_a_sentinel() {
        let reg = ClassRegistry::new();
        let res = reg.resolve("NoSuchTag");
        assert!(res.is_unknown());
        assert_eq!(res.tag(), None);
        assert!(!reg.is_known("NoSuchTag"));
    }

    #[test]
    fn last_write_wins_for_tag() {
        let reg = ClassRegistry::new();
        reg.register::<Player>("Thing");
        reg.register::<Npc>("Thing");
        match reg.resolve("Thing") {
            Resolution::Registered(d) => assert!(d.native_name.ends_with("Npc")),
            other => panic!("unexpected resolution: {other:?}"),
        }
        // The displaced type reverts to its native-name fallback.
        assert_eq!(reg.tag_for::<Player>(), std::any::type_name::<Player>());
        assert_eq!(reg.tag_for::<Npc>(), "Thing");
    }

    #[test]
    fn last_write_wins_for_type() {
        let reg = ClassRegistry::new();
        reg.register::<Player>("OldTag");
        reg.register::<Player>("NewTag");
        assert_eq!(reg.tag_for::<Player>(), "NewTag");
        assert!(reg.resolve("OldTag").is_unknown());
    }

    #[test]
    fn register_named_for_dynamic_types() {
        let reg = ClassRegistry::new();
        reg.register_named("Order", "shop::records::Order");
        match reg.resolve("Order") {
            Resolution::Registered(d) => assert_eq!(d.native_name, "shop::records::Order"),
            other => panic!("unexpected resolution: {other:?}"),
        }
        match reg.resolve("shop::records::Order") {
            Resolution::Registered(d) => assert_eq!(d.tag, "Order"),
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn concurrent_reads_and_writes() {
        let reg = std::sync::Arc::new(ClassRegistry::new());
        let writer = {
            let reg = reg.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    reg.register::<Player>("Player");
                }
            })
        };
        let reader = {
            let reg = reg.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    // Both directions are coupled under one lock: whenever
                    // the tag resolves, the reverse mapping must agree.
                    if let Resolution::Registered(d) = reg.resolve("Player") {
                        assert_eq!(d.tag, "Player");
                        assert_eq!(reg.tag_for::<Player>(), "Player");
                    }
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
    }
}
