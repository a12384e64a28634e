//! Reserved keys of the JSON wire format.
//!
//! Reserved keys are double-underscore-wrapped so they cannot collide with
//! application field names; the entity model rejects application fields that
//! use the convention.

/// Logical type tag of an object node.
pub const CLASS_KEY: &str = "__class__";

/// Server-assigned or client object identifier.
pub const ID_KEY: &str = "__id__";

/// Linked external-service names (user-like entities only).
pub const SERVICES_KEY: &str = "__services__";

/// Marks an object node as a flattened by-id reference.
pub const REF_KEY: &str = "__ref__";

/// Returns `true` for keys following the reserved naming convention.
pub fn is_reserved(key: &str) -> bool {
    key.starts_with("__") && key.ends_with("__") && key.len() >= 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_key_names() {
        assert_eq!(CLASS_KEY, "__class__");
        assert_eq!(ID_KEY, "__id__");
        assert_eq!(SERVICES_KEY, "__services__");
        assert_eq!(REF_KEY, "__ref__");
    }

    #[test]
    fn reserved_detection() {
        assert!(is_reserved(CLASS_KEY));
        assert!(is_reserved(ID_KEY));
        assert!(is_reserved("__anything__"));
        assert!(!is_reserved("name"));
        assert!(!is_reserved("__leading_only"));
        assert!(!is_reserved("trailing_only__"));
    }

    #[test]
    fn bare_double_underscore_is_reserved() {
        // "____" wraps an empty name; still reserved by convention.
        assert!(is_reserved("____"));
        assert!(!is_reserved("__"));
    }
}
