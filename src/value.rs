//! Type-erased runtime values

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::types::TypeKey;

/// A shared runtime value tagged with its concrete type.
///
/// Clones share the same allocation, so passing a `Value` through unchanged
/// preserves identity (see [`Value::ptr_eq`]).
#[derive(Clone)]
pub struct Value {
    type_key: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            inner: Arc::new(value),
        }
    }

    /// The concrete type of the wrapped value
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_key == TypeKey::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_key.name())
            .finish_non_exhaustive()
    }
}
