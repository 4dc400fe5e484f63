//! Configuration management for metadata resolution
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (xml-metadata.toml)
//! - Environment variables (XML_METADATA__*)
//!
//! ## Example config file (xml-metadata.toml):
//! ```toml
//! [resolver]
//! default_namespace = "urn:example:orders"
//!
//! [serializer]
//! legacy_generation = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Serializer engine settings
    #[serde(default)]
    pub serializer: SerializerConfig,
}

/// Resolver configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Namespace for members whose type and overrides name none
    #[serde(default)]
    pub default_namespace: Option<String>,
}

/// Serializer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Use the legacy serializer generation path; unset leaves the choice to
    /// the engine
    #[serde(default)]
    pub legacy_generation: Option<bool>,
}

impl MetadataConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "xml-metadata.toml",
            ".xml-metadata.toml",
            "config/xml-metadata.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "xml-metadata") {
            let xdg_config = config_dir.config_dir().join("xml-metadata.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (XML_METADATA__*)
        builder = builder.add_source(
            Environment::with_prefix("XML_METADATA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
