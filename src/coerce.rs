//! Type Coercion
//!
//! Decides whether a runtime [`Value`] can stand in for a target type, either
//! as-is (assignability in the [`TypeCatalog`]) or through a one-argument
//! conversion registered for the target type.
//!
//! Resolution order for [`Coercer::try_convert`]:
//! 1. the target must be a registered type
//! 2. an absent value is accepted only by types that allow absence
//! 3. an assignable value is returned unchanged
//! 4. the first registered conversion whose parameter accepts the value is
//!    invoked; its result must be assignable to the target
//! 5. otherwise the coercion is unavailable

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BoxError, MetadataError, Result};
use crate::types::{TypeCatalog, TypeKey};
use crate::value::Value;

type ConvertFn = dyn Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync;

/// A registered one-argument conversion
#[derive(Clone)]
pub struct ConversionOp {
    pub parameter: TypeKey,
    pub returns: TypeKey,
    /// Typed conversions only see values whose concrete type is `parameter`
    exact_parameter: bool,
    invoke: Arc<ConvertFn>,
}

impl ConversionOp {
    fn accepts(&self, catalog: &TypeCatalog, source: &TypeKey) -> bool {
        if self.exact_parameter {
            *source == self.parameter
        } else {
            catalog.is_assignable(source, &self.parameter)
        }
    }
}

impl fmt::Debug for ConversionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOp")
            .field("parameter", &self.parameter.name())
            .field("returns", &self.returns.name())
            .finish()
    }
}

/// Outcome of a coercion attempt
#[derive(Debug, Clone)]
pub enum Coercion {
    /// No value was supplied and the target accepts absence
    Absent,
    /// The value already fits the target and is passed through
    Unchanged(Value),
    /// A conversion produced a new value
    Converted(Value),
    /// No way to produce the target type from the value
    Unavailable,
}

impl Coercion {
    pub fn succeeded(&self) -> bool {
        !matches!(self, Coercion::Unavailable)
    }

    /// The resulting value, if the coercion succeeded with one
    pub fn value(&self) -> Option<&Value> {
        match self {
            Coercion::Unchanged(value) | Coercion::Converted(value) => Some(value),
            Coercion::Absent | Coercion::Unavailable => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Coercion::Unchanged(value) | Coercion::Converted(value) => Some(value),
            Coercion::Absent | Coercion::Unavailable => None,
        }
    }
}

/// Resolves coercions against a type catalog and a conversion table
#[derive(Debug, Clone, Default)]
pub struct Coercer {
    catalog: TypeCatalog,
    /// target type -> conversions, in registration order
    conversions: HashMap<TypeKey, Vec<ConversionOp>>,
}

impl Coercer {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            conversions: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    /// Register a fallible conversion from `U` to `T`.
    ///
    /// The conversion borrows the value as a `U`, so it applies only to values
    /// whose concrete type is `U`. Use [`register_dynamic`](Self::register_dynamic)
    /// for conversions that also accept subtypes of the parameter.
    ///
    /// Errors returned by `convert` surface from [`try_convert`](Self::try_convert)
    /// as [`MetadataError::ConversionFailed`].
    pub fn register_conversion<U, T, E, F>(&mut self, convert: F)
    where
        U: Any + Send + Sync,
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&U) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let parameter = TypeKey::of::<U>();
        let returns = TypeKey::of::<T>();
        let invoke = move |value: &Value| -> std::result::Result<Value, BoxError> {
            let input = value.downcast_ref::<U>().ok_or_else(|| -> BoxError {
                format!("expected {}, got {}", parameter, value.type_key()).into()
            })?;
            convert(input).map(Value::new).map_err(Into::into)
        };
        self.push(ConversionOp {
            parameter,
            returns,
            exact_parameter: true,
            invoke: Arc::new(invoke),
        });
    }

    /// Register a conversion over type-erased values.
    ///
    /// It is a candidate for any value assignable to `parameter`. A returned
    /// value that is not assignable to the target fails the coercion with
    /// [`MetadataError::ConversionFailed`].
    pub fn register_dynamic<F>(&mut self, parameter: TypeKey, returns: TypeKey, convert: F)
    where
        F: Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.push(ConversionOp {
            parameter,
            returns,
            exact_parameter: false,
            invoke: Arc::new(convert),
        });
    }

    /// Register a conversion from `U` to `T` that cannot fail
    pub fn register_infallible<U, T, F>(&mut self, convert: F)
    where
        U: Any + Send + Sync,
        T: Any + Send + Sync,
        F: Fn(&U) -> T + Send + Sync + 'static,
    {
        self.register_conversion::<U, T, std::convert::Infallible, _>(move |input| Ok(convert(input)));
    }

    fn push(&mut self, op: ConversionOp) {
        debug!(from = op.parameter.name(), to = op.returns.name(), "registered conversion");
        self.conversions.entry(op.returns).or_default().push(op);
    }

    /// Conversions registered for `target`, in registration order
    pub fn conversions_to(&self, target: &TypeKey) -> &[ConversionOp] {
        self.conversions
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Try to produce a value of type `target` from `value`.
    ///
    /// `Coercion::Unavailable` is an ordinary outcome. Errors are reserved for
    /// an unregistered target and for a conversion that itself failed.
    pub fn try_convert(&self, target: &TypeKey, value: Option<&Value>) -> Result<Coercion> {
        let descriptor = self
            .catalog
            .get(target)
            .ok_or_else(|| MetadataError::UnknownTargetType(target.to_string()))?;

        let Some(value) = value else {
            return Ok(if descriptor.kind.accepts_absent() {
                Coercion::Absent
            } else {
                Coercion::Unavailable
            });
        };

        let source = value.type_key();
        if self.catalog.is_assignable(&source, target) {
            return Ok(Coercion::Unchanged(value.clone()));
        }

        let candidate = self.conversions_to(target).iter().find(|op| {
            self.catalog.is_assignable(&op.returns, target) && op.accepts(&self.catalog, &source)
        });
        let Some(op) = candidate else {
            debug!(from = source.name(), to = target.name(), "no conversion available");
            return Ok(Coercion::Unavailable);
        };

        let outcome = (op.invoke)(value).and_then(|converted| {
            if self.catalog.is_assignable(&converted.type_key(), target) {
                Ok(converted)
            } else {
                Err(format!(
                    "conversion returned {}, which is not assignable to {}",
                    converted.type_key(),
                    target
                )
                .into())
            }
        });
        match outcome {
            Ok(converted) => Ok(Coercion::Converted(converted)),
            Err(source_error) => {
                warn!(from = source.name(), to = target.name(), error = %source_error, "conversion failed");
                Err(MetadataError::ConversionFailed {
                    from: source.to_string(),
                    to: target.to_string(),
                    source: source_error,
                })
            }
        }
    }
}
