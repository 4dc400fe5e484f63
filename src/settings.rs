//! Process-wide serializer settings
//!
//! The configuration is read at most once per process; later calls return the
//! cached value even if the files or environment change.

use std::sync::OnceLock;

use tracing::warn;

use crate::config::MetadataConfig;

static LEGACY_GENERATION: OnceLock<Option<bool>> = OnceLock::new();

/// Whether the engine should use the legacy serializer generation path.
///
/// `None` when the setting is absent or the configuration cannot be loaded.
pub fn legacy_generation() -> Option<bool> {
    *LEGACY_GENERATION.get_or_init(|| match MetadataConfig::load() {
        Ok(config) => config.serializer.legacy_generation,
        Err(err) => {
            warn!(error = %err, "failed to load serializer settings");
            None
        }
    })
}
