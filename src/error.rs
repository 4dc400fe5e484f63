//! Error types for metadata resolution

use thiserror::Error;

/// Result type for metadata operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Boxed error produced by a registered conversion
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Metadata resolution errors
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Name already registered: {name}")]
    DuplicateName { name: String },

    #[error("Cannot reconcile declarations for {name}: {reason}")]
    NameConflict { name: String, reason: String },

    #[error("Override already registered for type {type_name}, member '{member}'")]
    OverrideConflict { type_name: String, member: String },

    #[error("Target type {0} is not registered in the type catalog")]
    UnknownTargetType(String),

    #[error("Conversion from {from} to {to} failed: {source}")]
    ConversionFailed {
        from: String,
        to: String,
        #[source]
        source: BoxError,
    },

    #[error("Default value {value} is not valid for member type {type_name}")]
    InvalidDefault { value: String, type_name: String },

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
