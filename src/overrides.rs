//! Override Registry
//!
//! Maps `(type, member)` pairs to a customization bundle. The type-level
//! bundle lives under the empty member name. Registration is insert-once:
//! a second bundle for the same pair is a configuration bug and is rejected
//! instead of replacing the first.

use std::collections::hash_map::{self, HashMap};
use std::fmt::Display;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::types::TypeKey;

/// Member name under which the type-level bundle is stored
pub const TYPE_LEVEL: &str = "";

/// Two-level registry of customization bundles.
///
/// `T` is the type identity; it defaults to [`TypeKey`] but any hashable,
/// displayable key works (manifests key types by name).
#[derive(Debug, Clone)]
pub struct OverrideRegistry<B, T = TypeKey> {
    entries: HashMap<T, HashMap<String, B>>,
}

impl<B, T> Default for OverrideRegistry<B, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<B, T> OverrideRegistry<B, T>
where
    T: Eq + Hash + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the type-level bundle for `ty`
    pub fn add_type(&mut self, ty: T, bundle: B) -> Result<()> {
        self.add(ty, TYPE_LEVEL, bundle)
    }

    /// Register the bundle for `member` of `ty`.
    ///
    /// Fails with [`MetadataError::OverrideConflict`] if the pair already has
    /// a bundle; the registered bundle stays in place.
    pub fn add(&mut self, ty: T, member: &str, bundle: B) -> Result<()> {
        let type_name = ty.to_string();
        let members = self.entries.entry(ty).or_default();
        match members.entry(member.to_string()) {
            hash_map::Entry::Occupied(_) => {
                warn!(type_name = %type_name, member, "rejected duplicate override");
                Err(MetadataError::OverrideConflict {
                    type_name,
                    member: member.to_string(),
                })
            }
            hash_map::Entry::Vacant(vacant) => {
                debug!(type_name = %type_name, member, "registered override");
                vacant.insert(bundle);
                Ok(())
            }
        }
    }

    /// The type-level bundle for `ty`
    pub fn lookup_type(&self, ty: &T) -> Option<&B> {
        self.lookup(ty, TYPE_LEVEL)
    }

    /// The bundle for `member` of `ty`, if either is registered
    pub fn lookup(&self, ty: &T, member: &str) -> Option<&B> {
        self.entries.get(ty).and_then(|members| members.get(member))
    }

    /// Registered `(member, bundle)` pairs for `ty`, type-level entry included
    pub fn members<'a>(&'a self, ty: &T) -> impl Iterator<Item = (&'a str, &'a B)> + 'a {
        self.entries
            .get(ty)
            .into_iter()
            .flat_map(|members| members.iter().map(|(name, bundle)| (name.as_str(), bundle)))
    }

    /// Types with at least one registered bundle
    pub fn types(&self) -> impl Iterator<Item = &T> {
        self.entries.keys()
    }

    /// Total number of registered bundles
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person;
    struct Address;

    fn person() -> TypeKey {
        TypeKey::of::<Person>()
    }

    #[test]
    fn test_type_and_member_levels_are_separate() {
        let mut registry = OverrideRegistry::new();
        registry.add_type(person(), "type-level").unwrap();
        registry.add(person(), "Field", "member-level").unwrap();

        assert_eq!(registry.lookup_type(&person()), Some(&"type-level"));
        assert_eq!(registry.lookup(&person(), TYPE_LEVEL), Some(&"type-level"));
        assert_eq!(registry.lookup(&person(), "Field"), Some(&"member-level"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_member_only_leaves_type_level_absent() {
        let mut registry = OverrideRegistry::new();
        registry.add(person(), "Field", 1).unwrap();
        assert!(registry.lookup_type(&person()).is_none());
    }

    #[test]
    fn test_duplicate_member_is_rejected() {
        let mut registry = OverrideRegistry::new();
        registry.add(person(), "Field", "b1").unwrap();

        let err = registry.add(person(), "Field", "b2").unwrap_err();
        match err {
            MetadataError::OverrideConflict { type_name, member } => {
                assert!(type_name.ends_with("Person"));
                assert_eq!(member, "Field");
            }
            other => panic!("Expected OverrideConflict, got {:?}", other),
        }
        assert_eq!(registry.lookup(&person(), "Field"), Some(&"b1"));
    }

    #[test]
    fn test_duplicate_type_level_is_rejected() {
        let mut registry = OverrideRegistry::new();
        registry.add_type(person(), 1).unwrap();
        assert!(registry.add_type(person(), 2).is_err());
        assert!(registry.add(person(), TYPE_LEVEL, 3).is_err());
        assert_eq!(registry.lookup_type(&person()), Some(&1));
    }

    #[test]
    fn test_missing_type_or_member_is_absent() {
        let mut registry: OverrideRegistry<i32> = OverrideRegistry::new();
        assert!(registry.lookup(&person(), "Field").is_none());
        assert!(registry.is_empty());

        registry.add(person(), "Field", 1).unwrap();
        assert!(registry.lookup(&person(), "Other").is_none());
        assert!(registry.lookup(&TypeKey::of::<Address>(), "Field").is_none());
    }

    #[test]
    fn test_same_member_on_different_types() {
        let mut registry = OverrideRegistry::new();
        registry.add(person(), "Street", 1).unwrap();
        registry.add(TypeKey::of::<Address>(), "Street", 2).unwrap();
        assert_eq!(registry.lookup(&TypeKey::of::<Address>(), "Street"), Some(&2));
        assert_eq!(registry.types().count(), 2);
    }

    #[test]
    fn test_string_keyed_registry() {
        let mut registry: OverrideRegistry<u8, String> = OverrideRegistry::new();
        registry.add_type("Person".to_string(), 1).unwrap();
        registry.add("Person".to_string(), "Name", 2).unwrap();

        let mut members: Vec<_> = registry.members(&"Person".to_string()).collect();
        members.sort();
        assert_eq!(members, vec![("", &1), ("Name", &2)]);
    }
}
