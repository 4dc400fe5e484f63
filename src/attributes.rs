//! XML customization attributes
//!
//! [`XmlAttributes`] is the bundle stored in the override registry for a type
//! or member: naming, nullability, ordering, data-type hint and default value.
//! The registry itself treats it as opaque.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, Result};
use crate::name::is_valid_local_name;
use crate::value::Value;

/// Order value meaning "not explicitly ordered"
pub const UNORDERED: i32 = -1;

/// Default value as written in an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl DefaultValue {
    /// Wrap the literal as a runtime value of its natural type
    pub fn to_value(&self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::new(*b),
            DefaultValue::Integer(i) => Value::new(*i),
            DefaultValue::Float(f) => Value::new(*f),
            DefaultValue::Text(s) => Value::new(s.clone()),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(b) => write!(f, "{}", b),
            DefaultValue::Integer(i) => write!(f, "{}", i),
            DefaultValue::Float(x) => write!(f, "{}", x),
            DefaultValue::Text(s) => f.write_str(s),
        }
    }
}

/// Customization bundle for a type or member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XmlAttributes {
    /// Element name replacing the member or type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_name: Option<String>,
    /// Namespace of the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Explicit nullability; `None` derives it from the member type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    /// Position among sibling members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// XSD data type hint (e.g. "date", "NMTOKEN")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    /// Exclude the member from serialization
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore: bool,
}

impl XmlAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_element_name(&name)?;
        self.element_name = Some(name);
        Ok(self)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = Some(nullable);
        self
    }

    /// Set the member order; values below [`UNORDERED`] are rejected
    pub fn with_order(mut self, order: i32) -> Result<Self> {
        check_order(order)?;
        self.order = Some(order);
        Ok(self)
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Result<Self> {
        let data_type = data_type.into();
        if data_type.is_empty() {
            return Err(MetadataError::InvalidAttribute(
                "data type must not be empty".to_string(),
            ));
        }
        self.data_type = Some(data_type);
        Ok(self)
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Re-run the setter checks, for bundles built by deserialization
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.element_name {
            check_element_name(name)?;
        }
        if let Some(order) = self.order {
            check_order(order)?;
        }
        if matches!(&self.data_type, Some(data_type) if data_type.is_empty()) {
            return Err(MetadataError::InvalidAttribute(
                "data type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_element_name(name: &str) -> Result<()> {
    if is_valid_local_name(name) {
        Ok(())
    } else {
        Err(MetadataError::InvalidAttribute(format!(
            "'{}' is not a valid XML local name",
            name
        )))
    }
}

fn check_order(order: i32) -> Result<()> {
    if order < UNORDERED {
        return Err(MetadataError::InvalidAttribute(format!(
            "order {} is below the minimum of {}",
            order, UNORDERED
        )));
    }
    Ok(())
}
