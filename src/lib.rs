//! XML Metadata Resolution
//!
//! Lookup and coercion primitives an XML serializer calls while building its
//! type mappings.
//!
//! ## Features
//!
//! - **Name Tables**: Declarations indexed by `(local name, namespace)`, with
//!   duplicate-rejecting `add` kept apart from overwriting `set`
//! - **Override Registry**: One customization bundle per `(type, member)`,
//!   conflicts reported instead of silently replaced
//! - **Type Coercion**: Assignability checks plus registered one-argument
//!   conversions, resolved by table lookup
//! - **Member Resolution**: Overrides, defaults and default-value coercion
//!   combined into a member mapping
//!
//! ## Example
//!
//! ```
//! use xml_metadata::{OverrideRegistry, TypeKey, XmlAttributes};
//!
//! struct Person;
//!
//! let mut overrides = OverrideRegistry::new();
//! overrides
//!     .add(TypeKey::of::<Person>(), "Name", XmlAttributes::new().with_order(0).unwrap())
//!     .unwrap();
//!
//! assert!(overrides.lookup(&TypeKey::of::<Person>(), "Name").is_some());
//! assert!(overrides.add(TypeKey::of::<Person>(), "Name", XmlAttributes::new()).is_err());
//! ```

pub mod attributes;
pub mod coerce;
pub mod config;
pub mod error;
pub mod manifest;
pub mod name;
pub mod name_table;
pub mod overrides;
pub mod resolver;
pub mod settings;
pub mod types;
pub mod value;

pub use attributes::{DefaultValue, XmlAttributes};
pub use coerce::{Coercer, Coercion, ConversionOp};
pub use config::MetadataConfig;
pub use error::{MetadataError, Result};
pub use manifest::OverrideManifest;
pub use name::QualifiedName;
pub use name_table::{NameLookup, NameTable};
pub use overrides::OverrideRegistry;
pub use resolver::{MemberMapping, MetadataResolver};
pub use types::{TypeCatalog, TypeDescriptor, TypeKey, TypeKind};
pub use value::Value;
