//! Override manifests
//!
//! A manifest describes type and member overrides in a file, so a registry
//! can be populated without code. TOML and JSON are accepted; the format is
//! picked from the file extension.
//!
//! ```toml
//! [[types]]
//! name = "Person"
//! [types.attributes]
//! namespace = "urn:people"
//!
//! [[types.members]]
//! name = "Name"
//! [types.members.attributes]
//! element_name = "full-name"
//! order = 0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::attributes::XmlAttributes;
use crate::error::Result;
use crate::overrides::OverrideRegistry;

/// Overrides for one type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeOverride {
    /// Type name used as the registry key
    pub name: String,
    /// Type-level bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<XmlAttributes>,
    #[serde(default)]
    pub members: Vec<MemberOverride>,
}

/// Override for one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberOverride {
    pub name: String,
    #[serde(default)]
    pub attributes: XmlAttributes,
}

/// File-backed description of an override registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideManifest {
    #[serde(default)]
    pub types: Vec<TypeOverride>,
}

impl OverrideManifest {
    /// Load a manifest from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build a registry keyed by type name.
    ///
    /// Every bundle is validated and inserted with
    /// [`OverrideRegistry::add`], so a type or member listed twice fails with
    /// the same conflict error as a duplicate registration in code.
    pub fn build_registry(&self) -> Result<OverrideRegistry<XmlAttributes, String>> {
        let mut registry = OverrideRegistry::new();
        for ty in &self.types {
            if let Some(attributes) = &ty.attributes {
                attributes.validate()?;
                registry.add_type(ty.name.clone(), attributes.clone())?;
            }
            for member in &ty.members {
                member.attributes.validate()?;
                registry.add(ty.name.clone(), &member.name, member.attributes.clone())?;
            }
        }
        info!(
            types = self.types.len(),
            bundles = registry.len(),
            "built override registry"
        );
        Ok(registry)
    }
}
