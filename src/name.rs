//! Qualified XML names
//!
//! A [`QualifiedName`] is the composite key used to address named,
//! namespace-qualified declarations (elements, attributes, types).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A `(local name, namespace)` pair with structural equality.
///
/// "No namespace" has a single representation: an empty namespace string is
/// stored as `None`, so `("a", None)` and `("a", Some(""))` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    local_name: String,
    namespace: Option<String>,
}

impl QualifiedName {
    /// Create a qualified name, normalizing an empty namespace to none
    pub fn new(local_name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(String::from),
        }
    }

    /// Create a name with no namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(local_name, None)
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Check that `name` is usable as an XML local name (an NCName).
///
/// Letters, digits, `_`, `-`, `.` and the middle dot are accepted. Combining
/// marks and the remaining extender characters of the XML grammar are not.
pub fn is_valid_local_name(name: &str) -> bool {
    static NCNAME: OnceLock<Regex> = OnceLock::new();
    let re = NCNAME.get_or_init(|| {
        Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-\x{B7}]*$").expect("NCName pattern is valid")
    });
    re.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(name: &QualifiedName) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_namespace_is_no_namespace() {
        let absent = QualifiedName::new("item", None);
        let empty = QualifiedName::new("item", Some(""));
        assert_eq!(absent, empty);
        assert_eq!(hash_of(&absent), hash_of(&empty));
        assert_eq!(empty.namespace(), None);
    }

    #[test]
    fn test_namespace_distinguishes_names() {
        let a = QualifiedName::new("item", Some("urn:a"));
        let b = QualifiedName::new("item", Some("urn:b"));
        assert_ne!(a, b);
        assert_ne!(a, QualifiedName::local("item"));
    }

    #[test]
    fn test_display() {
        assert_eq!(QualifiedName::new("item", Some("urn:a")).to_string(), "{urn:a}item");
        assert_eq!(QualifiedName::local("item").to_string(), "item");
    }

    #[test]
    fn test_local_name_validation() {
        assert!(is_valid_local_name("Person"));
        assert!(is_valid_local_name("_first-name.v2"));
        assert!(is_valid_local_name("名前"));
        assert!(!is_valid_local_name(""));
        assert!(!is_valid_local_name("2fast"));
        assert!(!is_valid_local_name("xs:string"));
        assert!(!is_valid_local_name("has space"));
    }
}
