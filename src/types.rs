//! Type identities and the type catalog
//!
//! Rust has no runtime subtyping, so assignability between registered types
//! is declared up front in a [`TypeCatalog`]. The catalog plays the role of
//! the host type system for [`Coercer`](crate::coerce::Coercer).

use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

/// Stable identity of a Rust type
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Readable type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a type treats the absence of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Reference-like: absence is a valid value
    Reference,
    /// Value-like: a value must always be present
    Value,
    /// Optional wrapper around a value type
    Nullable { underlying: TypeKey },
}

impl TypeKind {
    pub fn accepts_absent(&self) -> bool {
        !matches!(self, TypeKind::Value)
    }
}

/// A registered type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub kind: TypeKind,
    /// Types this one is directly assignable to
    pub supertypes: Vec<TypeKey>,
}

/// Registered types and their assignability edges
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<TypeKey, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with the scalar types XML defaults are written in
    pub fn with_primitives() -> Self {
        let mut catalog = Self::new();
        catalog.register_value::<bool>();
        catalog.register_value::<i8>();
        catalog.register_value::<i16>();
        catalog.register_value::<i32>();
        catalog.register_value::<i64>();
        catalog.register_value::<u8>();
        catalog.register_value::<u16>();
        catalog.register_value::<u32>();
        catalog.register_value::<u64>();
        catalog.register_value::<f32>();
        catalog.register_value::<f64>();
        catalog.register_value::<char>();
        catalog.register_reference::<String>();
        catalog
    }

    /// Register a type, replacing any previous descriptor for it
    pub fn register(&mut self, key: TypeKey, kind: TypeKind) -> &mut TypeDescriptor {
        debug!(type_name = key.name(), ?kind, "registered type");
        let descriptor = TypeDescriptor {
            key,
            kind,
            supertypes: Vec::new(),
        };
        match self.types.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(descriptor);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(descriptor),
        }
    }

    pub fn register_reference<T: Any>(&mut self) -> &mut TypeDescriptor {
        self.register(TypeKey::of::<T>(), TypeKind::Reference)
    }

    pub fn register_value<T: Any>(&mut self) -> &mut TypeDescriptor {
        self.register(TypeKey::of::<T>(), TypeKind::Value)
    }

    /// Register `Option<T>` as the nullable form of `T`
    pub fn register_nullable<T: Any>(&mut self) -> &mut TypeDescriptor {
        self.register(
            TypeKey::of::<Option<T>>(),
            TypeKind::Nullable {
                underlying: TypeKey::of::<T>(),
            },
        )
    }

    /// Declare that `sub` is assignable to `sup`.
    ///
    /// `sub` is registered as a reference type if it is not known yet.
    pub fn declare_subtype(&mut self, sub: TypeKey, sup: TypeKey) {
        let descriptor = self.types.entry(sub).or_insert_with(|| TypeDescriptor {
            key: sub,
            kind: TypeKind::Reference,
            supertypes: Vec::new(),
        });
        if !descriptor.supertypes.contains(&sup) {
            descriptor.supertypes.push(sup);
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Whether a value of type `from` can be used where `to` is expected.
    ///
    /// Reflexive, transitive over declared supertypes, and a nullable type
    /// accepts values assignable to its underlying type.
    pub fn is_assignable(&self, from: &TypeKey, to: &TypeKey) -> bool {
        if from == to {
            return true;
        }
        if let Some(TypeDescriptor {
            kind: TypeKind::Nullable { underlying },
            ..
        }) = self.types.get(to)
        {
            if self.is_assignable(from, underlying) {
                return true;
            }
        }

        let mut seen = HashSet::new();
        let mut pending = vec![*from];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(descriptor) = self.types.get(&current) else {
                continue;
            };
            for sup in &descriptor.supertypes {
                if sup == to {
                    return true;
                }
                pending.push(*sup);
            }
        }
        false
    }
}
