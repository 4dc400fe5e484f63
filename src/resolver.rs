//! Member Resolution
//!
//! Combines the override registry, the element name table and the coercer
//! into the per-member lookup a serializer performs while building its
//! mappings:
//!
//! 1. take the member's override bundle, or the empty default bundle
//! 2. derive element name, namespace, nullability and order
//! 3. coerce the declared default value to the member type
//! 4. optionally declare the element by qualified name, reusing an
//!    equivalent earlier declaration

use tracing::debug;

use crate::attributes::XmlAttributes;
use crate::coerce::Coercer;
use crate::config::MetadataConfig;
use crate::error::{MetadataError, Result};
use crate::name_table::NameTable;
use crate::overrides::OverrideRegistry;
use crate::types::{TypeCatalog, TypeKey, TypeKind};
use crate::value::Value;

/// Resolved serialization metadata for one member
#[derive(Debug, Clone)]
pub struct MemberMapping {
    pub owner: TypeKey,
    pub member: String,
    pub member_type: TypeKey,
    pub element_name: String,
    pub namespace: Option<String>,
    pub is_nullable: bool,
    pub order: Option<i32>,
    pub data_type: Option<String>,
    /// Default value, already coerced to `member_type`
    pub default: Option<Value>,
    /// Textual form of the declared default, used to compare declarations
    pub default_text: Option<String>,
    pub ignore: bool,
}

/// Per-member metadata resolution over a finished override registry
#[derive(Debug)]
pub struct MetadataResolver {
    overrides: OverrideRegistry<XmlAttributes>,
    coercer: Coercer,
    default_namespace: Option<String>,
    elements: NameTable<MemberMapping>,
    defaults: XmlAttributes,
}

impl MetadataResolver {
    pub fn new(overrides: OverrideRegistry<XmlAttributes>, coercer: Coercer) -> Self {
        Self {
            overrides,
            coercer,
            default_namespace: None,
            elements: NameTable::new(),
            defaults: XmlAttributes::default(),
        }
    }

    /// Apply the `[resolver]` section of the configuration
    pub fn with_config(self, config: &MetadataConfig) -> Self {
        self.with_default_namespace(config.resolver.default_namespace.clone())
    }

    /// Namespace used when neither the member nor its type names one
    pub fn with_default_namespace(mut self, namespace: Option<String>) -> Self {
        self.default_namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn overrides(&self) -> &OverrideRegistry<XmlAttributes> {
        &self.overrides
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Declared elements, by qualified name
    pub fn elements(&self) -> &NameTable<MemberMapping> {
        &self.elements
    }

    /// Override for `ty`, or the empty bundle
    pub fn attributes_for_type(&self, ty: &TypeKey) -> &XmlAttributes {
        self.overrides.lookup_type(ty).unwrap_or(&self.defaults)
    }

    /// Override for `member` of `ty`, or the empty bundle
    pub fn attributes_for_member(&self, ty: &TypeKey, member: &str) -> &XmlAttributes {
        self.overrides.lookup(ty, member).unwrap_or(&self.defaults)
    }

    /// Resolve the mapping for `member` of `owner`, whose declared type is
    /// `member_type`
    pub fn import_member(
        &self,
        owner: TypeKey,
        member: &str,
        member_type: TypeKey,
    ) -> Result<MemberMapping> {
        let attrs = self.attributes_for_member(&owner, member);
        let kind = self
            .coercer
            .catalog()
            .get(&member_type)
            .map(|descriptor| descriptor.kind)
            .ok_or_else(|| MetadataError::UnknownTargetType(member_type.to_string()))?;

        let is_nullable = match (attrs.is_nullable, kind) {
            (Some(false), TypeKind::Nullable { underlying }) => {
                return Err(MetadataError::InvalidAttribute(format!(
                    "is_nullable may not be false for {}.{} of nullable type {}; use {} instead",
                    owner, member, member_type, underlying
                )));
            }
            (Some(true), TypeKind::Value) => {
                return Err(MetadataError::InvalidAttribute(format!(
                    "is_nullable may not be true for {}.{} of value type {}",
                    owner, member, member_type
                )));
            }
            (Some(explicit), _) => explicit,
            (None, kind) => matches!(kind, TypeKind::Nullable { .. }),
        };

        let (default, default_text) = match &attrs.default_value {
            Some(declared) => {
                let coerced = self
                    .coercer
                    .try_convert(&member_type, Some(&declared.to_value()))?
                    .into_value()
                    .ok_or_else(|| MetadataError::InvalidDefault {
                        value: declared.to_string(),
                        type_name: member_type.to_string(),
                    })?;
                (Some(coerced), Some(declared.to_string()))
            }
            None => (None, None),
        };

        let namespace = attrs
            .namespace
            .clone()
            .or_else(|| self.attributes_for_type(&owner).namespace.clone())
            .or_else(|| self.default_namespace.clone())
            .filter(|ns| !ns.is_empty());

        debug!(owner = owner.name(), member, "imported member");
        Ok(MemberMapping {
            owner,
            member: member.to_string(),
            member_type,
            element_name: attrs
                .element_name
                .clone()
                .unwrap_or_else(|| member.to_string()),
            namespace,
            is_nullable,
            order: attrs.order,
            data_type: attrs.data_type.clone(),
            default,
            default_text,
            ignore: attrs.ignore,
        })
    }

    /// Declare `mapping` as a named element.
    ///
    /// An earlier declaration under the same qualified name is reused when it
    /// has the same member type, or one is the nullable form of the other,
    /// and both declare the same default. Anything else is a conflict.
    pub fn declare_element(&mut self, mapping: MemberMapping) -> Result<&MemberMapping> {
        let name = mapping.element_name.clone();
        let namespace = mapping.namespace.clone();
        let catalog = self.coercer.catalog();
        self.elements
            .reconcile(&name, namespace.as_deref(), mapping, |existing, new| {
                if base_type(catalog, existing.member_type) != base_type(catalog, new.member_type) {
                    return Err(format!(
                        "declared as {} and as {}",
                        existing.member_type, new.member_type
                    ));
                }
                if existing.default_text != new.default_text {
                    return Err(format!(
                        "default value {} differs from {}",
                        existing.default_text.as_deref().unwrap_or("(none)"),
                        new.default_text.as_deref().unwrap_or("(none)")
                    ));
                }
                Ok(())
            })
    }

    /// All declared elements, for schema emission
    pub fn declared_elements(&self) -> Vec<MemberMapping> {
        self.elements.values_snapshot()
    }
}

/// The type a nullable wrapper stands for, or the type itself
fn base_type(catalog: &TypeCatalog, ty: TypeKey) -> TypeKey {
    match catalog.get(&ty).map(|descriptor| descriptor.kind) {
        Some(TypeKind::Nullable { underlying }) => underlying,
        _ => ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::DefaultValue;

    struct Person;

    fn person() -> TypeKey {
        TypeKey::of::<Person>()
    }

    fn resolver(overrides: OverrideRegistry<XmlAttributes>) -> MetadataResolver {
        let mut catalog = TypeCatalog::with_primitives();
        catalog.register_nullable::<i32>();
        let mut coercer = Coercer::new(catalog);
        coercer.register_conversion::<i64, i32, _, _>(|v| i32::try_from(*v));
        MetadataResolver::new(overrides, coercer)
    }

    #[test]
    fn test_defaults_without_overrides() {
        let resolver = resolver(OverrideRegistry::new());
        let mapping = resolver
            .import_member(person(), "Name", TypeKey::of::<String>())
            .unwrap();

        assert_eq!(mapping.element_name, "Name");
        assert_eq!(mapping.namespace, None);
        assert!(!mapping.is_nullable);
        assert!(mapping.default.is_none());

        let age = resolver
            .import_member(person(), "Age", TypeKey::of::<i32>())
            .unwrap();
        assert!(!age.is_nullable);

        let score = resolver
            .import_member(person(), "Score", TypeKey::of::<Option<i32>>())
            .unwrap();
        assert!(score.is_nullable);
    }

    #[test]
    fn test_explicit_nullable_on_reference_type() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add(person(), "Name", XmlAttributes::new().with_nullable(true))
            .unwrap();
        let mapping = resolver(overrides)
            .import_member(person(), "Name", TypeKey::of::<String>())
            .unwrap();
        assert!(mapping.is_nullable);
    }

    #[test]
    fn test_value_member_cannot_be_declared_nullable() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add(person(), "Age", XmlAttributes::new().with_nullable(true))
            .unwrap();
        let resolver = resolver(overrides);

        let err = resolver
            .import_member(person(), "Age", TypeKey::of::<i32>())
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidAttribute(ref msg) if msg.contains("Age")));
    }

    #[test]
    fn test_with_config_sets_default_namespace() {
        let mut config = MetadataConfig::default();
        config.resolver.default_namespace = Some("urn:configured".to_string());

        let resolver = resolver(OverrideRegistry::new()).with_config(&config);
        let mapping = resolver
            .import_member(person(), "Name", TypeKey::of::<String>())
            .unwrap();
        assert_eq!(mapping.namespace.as_deref(), Some("urn:configured"));
    }

    #[test]
    fn test_member_override_and_type_namespace() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add_type(person(), XmlAttributes::new().with_namespace("urn:people"))
            .unwrap();
        overrides
            .add(
                person(),
                "Name",
                XmlAttributes::new().with_element_name("full-name").unwrap(),
            )
            .unwrap();

        let resolver = resolver(overrides).with_default_namespace(Some("urn:default".into()));
        let mapping = resolver
            .import_member(person(), "Name", TypeKey::of::<String>())
            .unwrap();
        assert_eq!(mapping.element_name, "full-name");
        assert_eq!(mapping.namespace.as_deref(), Some("urn:people"));
    }

    #[test]
    fn test_default_value_is_coerced() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add(person(), "Age", XmlAttributes::new().with_default(DefaultValue::Integer(18)))
            .unwrap();
        overrides
            .add(person(), "Height", XmlAttributes::new().with_default(DefaultValue::Integer(i64::MAX)))
            .unwrap();
        overrides
            .add(person(), "Born", XmlAttributes::new().with_default(DefaultValue::Text("x".into())))
            .unwrap();

        let resolver = resolver(overrides);
        let age = resolver.import_member(person(), "Age", TypeKey::of::<i32>()).unwrap();
        assert_eq!(age.default.unwrap().downcast_ref::<i32>(), Some(&18));
        assert_eq!(age.default_text.as_deref(), Some("18"));

        let overflow = resolver.import_member(person(), "Height", TypeKey::of::<i32>());
        assert!(matches!(overflow, Err(MetadataError::ConversionFailed { .. })));

        let mismatch = resolver.import_member(person(), "Born", TypeKey::of::<i32>());
        assert!(matches!(mismatch, Err(MetadataError::InvalidDefault { .. })));
    }

    #[test]
    fn test_nullable_member_cannot_be_declared_non_nullable() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add(person(), "Score", XmlAttributes::new().with_nullable(false))
            .unwrap();
        let resolver = resolver(overrides);

        let err = resolver
            .import_member(person(), "Score", TypeKey::of::<Option<i32>>())
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidAttribute(_)));
    }

    #[test]
    fn test_unknown_member_type() {
        let resolver = resolver(OverrideRegistry::new());
        let err = resolver
            .import_member(person(), "Friend", person())
            .unwrap_err();
        assert!(matches!(err, MetadataError::UnknownTargetType(_)));
    }

    #[test]
    fn test_declare_element_reconciles() {
        let mut resolver = resolver(OverrideRegistry::new());
        let name = resolver
            .import_member(person(), "Name", TypeKey::of::<String>())
            .unwrap();
        let clash = resolver
            .import_member(person(), "Name", TypeKey::of::<i32>())
            .unwrap();

        resolver.declare_element(name.clone()).unwrap();
        let reused = resolver.declare_element(name).unwrap();
        assert_eq!(reused.member_type, TypeKey::of::<String>());

        let err = resolver.declare_element(clash).unwrap_err();
        match err {
            MetadataError::NameConflict { name, reason } => {
                assert_eq!(name, "Name");
                assert!(reason.contains("String"));
                assert!(reason.contains("i32"));
            }
            other => panic!("Expected NameConflict, got {:?}", other),
        }
        assert_eq!(resolver.declared_elements().len(), 1);
    }

    #[test]
    fn test_nullable_declaration_reconciles_with_base_type() {
        let mut resolver = resolver(OverrideRegistry::new());
        let plain = resolver
            .import_member(person(), "Score", TypeKey::of::<i32>())
            .unwrap();
        let nullable = resolver
            .import_member(person(), "Score", TypeKey::of::<Option<i32>>())
            .unwrap();

        resolver.declare_element(plain).unwrap();
        let reused = resolver.declare_element(nullable).unwrap();
        assert_eq!(reused.member_type, TypeKey::of::<i32>());
        assert_eq!(resolver.declared_elements().len(), 1);
    }

    #[test]
    fn test_mismatched_defaults_are_reported() {
        let mut overrides = OverrideRegistry::new();
        overrides
            .add(person(), "Age", XmlAttributes::new().with_default(DefaultValue::Integer(18)))
            .unwrap();
        overrides
            .add(
                person(),
                "Years",
                XmlAttributes::new()
                    .with_element_name("Age")
                    .unwrap()
                    .with_default(DefaultValue::Integer(21)),
            )
            .unwrap();
        let mut resolver = resolver(overrides);

        let age = resolver.import_member(person(), "Age", TypeKey::of::<i32>()).unwrap();
        let years = resolver.import_member(person(), "Years", TypeKey::of::<i32>()).unwrap();
        resolver.declare_element(age).unwrap();

        let err = resolver.declare_element(years).unwrap_err();
        match err {
            MetadataError::NameConflict { reason, .. } => {
                assert_eq!(reason, "default value 18 differs from 21");
            }
            other => panic!("Expected NameConflict, got {:?}", other),
        }
    }
}
