//! Name Table
//!
//! Indexes declarations by [`QualifiedName`]. Two insertion paths exist:
//! [`NameTable::add`] refuses to replace an existing entry, while
//! [`NameTable::set`] overwrites. Keep them apart at call sites.

use std::collections::hash_map::{self, HashMap};

use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::name::QualifiedName;

/// Read-only lookup by qualified name.
///
/// Lets code that only resolves names take a table without being able to
/// mutate it.
pub trait NameLookup<V> {
    fn lookup(&self, local_name: &str, namespace: Option<&str>) -> Option<&V>;
}

/// Mapping from qualified name to an associated value
#[derive(Debug, Clone)]
pub struct NameTable<V> {
    entries: HashMap<QualifiedName, V>,
}

impl<V> Default for NameTable<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> NameTable<V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, failing if the name is already taken.
    ///
    /// The existing value is left untouched on failure.
    pub fn add(&mut self, local_name: &str, namespace: Option<&str>, value: V) -> Result<()> {
        let key = QualifiedName::new(local_name, namespace);
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(occupied) => {
                warn!(name = %occupied.key(), "rejected duplicate name registration");
                Err(MetadataError::DuplicateName {
                    name: occupied.key().to_string(),
                })
            }
            hash_map::Entry::Vacant(vacant) => {
                debug!(name = %vacant.key(), "registered name");
                vacant.insert(value);
                Ok(())
            }
        }
    }

    /// Get the value stored under a name
    pub fn get(&self, local_name: &str, namespace: Option<&str>) -> Option<&V> {
        self.entries.get(&QualifiedName::new(local_name, namespace))
    }

    /// Insert or replace a value, returning the replaced one
    pub fn set(&mut self, local_name: &str, namespace: Option<&str>, value: V) -> Option<V> {
        self.entries.insert(QualifiedName::new(local_name, namespace), value)
    }

    /// Insert `value` unless an equivalent declaration already exists.
    ///
    /// When the name is free the value is stored and returned. When it is
    /// taken, `compare(existing, &value)` decides: `Ok` returns the existing
    /// entry and drops `value`, `Err(reason)` reports a conflict carrying
    /// that reason.
    pub fn reconcile<F>(
        &mut self,
        local_name: &str,
        namespace: Option<&str>,
        value: V,
        compare: F,
    ) -> Result<&V>
    where
        F: FnOnce(&V, &V) -> std::result::Result<(), String>,
    {
        let key = QualifiedName::new(local_name, namespace);
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(occupied) => match compare(occupied.get(), &value) {
                Ok(()) => Ok(occupied.into_mut()),
                Err(reason) => {
                    warn!(name = %occupied.key(), %reason, "cannot reconcile declarations");
                    Err(MetadataError::NameConflict {
                        name: occupied.key().to_string(),
                        reason,
                    })
                }
            },
            hash_map::Entry::Vacant(vacant) => Ok(vacant.insert(value)),
        }
    }

    pub fn contains(&self, local_name: &str, namespace: Option<&str>) -> bool {
        self.entries.contains_key(&QualifiedName::new(local_name, namespace))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over names and values
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &V)> {
        self.entries.iter()
    }

    /// Copy every stored value into a new vector.
    ///
    /// This is a snapshot, not a view: later insertions do not show up in a
    /// vector that was already returned.
    pub fn values_snapshot(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.entries.values().cloned().collect()
    }

    /// Like [`values_snapshot`](Self::values_snapshot), converting each value
    /// to the requested element type
    pub fn snapshot_as<U>(&self) -> Vec<U>
    where
        V: Clone,
        U: From<V>,
    {
        self.entries.values().cloned().map(U::from).collect()
    }
}

impl<V> NameLookup<V> for NameTable<V> {
    fn lookup(&self, local_name: &str, namespace: Option<&str>) -> Option<&V> {
        self.get(local_name, namespace)
    }
}
