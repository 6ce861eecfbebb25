//! Configuration module for Tessel.
//!
//! Provides the configuration types and JSONC file loading. A missing file
//! is not an error for the daemon: it falls back to defaults.

pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    AdvisorConfig, AnimationConfig, ConfigError, FocusConfig, MonitorsConfig, RulesConfig, SnapConfig,
    TesselConfig, TilingConfig, config_paths, load_config, load_config_from_path,
};

/// Loads the configuration from `custom` or the default search paths.
///
/// Falls back to the defaults when no file exists. Read, parse and
/// validation errors are returned.
///
/// # Errors
///
/// Returns any `ConfigError` other than `NotFound`.
pub fn load_or_default(custom: Option<&Path>) -> Result<(TesselConfig, Option<PathBuf>), ConfigError> {
    let result = custom.map_or_else(load_config, load_config_from_path);
    match result {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "config: loaded");
            Ok((config, Some(path)))
        }
        Err(ConfigError::NotFound) if custom.is_none() => {
            tracing::info!("config: no file found, using defaults");
            Ok((TesselConfig::default(), None))
        }
        Err(err) => Err(err),
    }
}

/// JSON schema of the configuration file.
#[must_use]
pub fn schema() -> schemars::Schema { schemars::schema_for!(TesselConfig) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.jsonc");
        assert!(matches!(load_or_default(Some(&missing)), Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_schema_names_sections() {
        let schema = serde_json::to_value(schema()).unwrap();
        let properties = schema.get("properties").unwrap();
        for section in ["monitors", "tiling", "snap", "focus", "rules", "animation", "advisor"] {
            assert!(properties.get(section).is_some(), "missing {section}");
        }
    }
}
