//! Root configuration and file loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AdvisorConfig, AnimationConfig, FocusConfig, MonitorsConfig, RulesConfig, SnapConfig, TilingConfig};

/// Root configuration structure for Tessel.
///
/// Every section is optional; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TesselConfig {
    /// Monitor topology and window distribution.
    pub monitors: MonitorsConfig,

    /// Tiling engine settings and custom layouts.
    pub tiling: TilingConfig,

    /// Snap zones and thresholds.
    pub snap: SnapConfig,

    /// Focus prediction.
    pub focus: FocusConfig,

    /// Window rules and the evaluation worker pool.
    pub rules: RulesConfig,

    /// Window animations.
    pub animation: AnimationConfig,

    /// External placement advisor.
    pub advisor: AdvisorConfig,
}

impl TesselConfig {
    /// Checks values that deserialize fine but cannot run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| Err(ConfigError::Invalid(format!("{field}: {reason}")));

        if self.rules.workers == 0 {
            return invalid("rules.workers", "must be at least 1");
        }
        if self.rules.queue_capacity == 0 {
            return invalid("rules.queueCapacity", "must be at least 1");
        }
        if self.rules.evaluation_timeout_ms == 0 {
            return invalid("rules.evaluationTimeoutMs", "must be positive");
        }
        if self.animation.target_fps == 0 {
            return invalid("animation.targetFps", "must be at least 1");
        }
        if self.animation.max_concurrent == 0 {
            return invalid("animation.maxConcurrent", "must be at least 1");
        }
        if self.snap.threshold_px <= 0.0 {
            return invalid("snap.thresholdPx", "must be positive");
        }
        if self.snap.magnetic_multiplier < 1.0 {
            return invalid("snap.magneticMultiplier", "must be at least 1");
        }
        if !(0.05..=0.95).contains(&self.tiling.master_ratio) {
            return invalid("tiling.masterRatio", "must be between 0.05 and 0.95");
        }
        if self.tiling.gap < 0.0 {
            return invalid("tiling.gap", "must not be negative");
        }
        if !(0.0..=1.0).contains(&self.focus.min_confidence) {
            return invalid("focus.minConfidence", "must be between 0 and 1");
        }
        if self.focus.retrain_interval_ms == 0 {
            return invalid("focus.retrainIntervalMs", "must be positive");
        }
        if self.monitors.poll_interval_ms == 0 {
            return invalid("monitors.pollIntervalMs", "must be positive");
        }
        if self.advisor.enabled && self.advisor.timeout_ms == 0 {
            return invalid("advisor.timeoutMs", "must be positive when the advisor is enabled");
        }
        Ok(())
    }

    /// Advisor time budget per call.
    #[must_use]
    pub const fn advisor_timeout(&self) -> Duration { Duration::from_millis(self.advisor.timeout_ms) }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/tessel/config.jsonc, \
         the platform config directory, or ~/.tessel.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".tessel.jsonc", ".tessel.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/tessel/` when set
/// 2. `~/.config/tessel/`
/// 3. the platform config directory (`dirs::config_dir()`)
/// 4. `~/.tessel.jsonc` or `~/.tessel.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join("tessel"), &mut paths);
    }
    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("tessel"), &mut paths);
    }
    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("tessel"), &mut paths);
    }
    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

fn push_dir(dir: PathBuf, paths: &mut Vec<PathBuf>) {
    for filename in CONFIG_FILE_NAMES {
        let path = dir.join(filename);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
}

/// Loads and validates the first configuration file found.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no file exists, or the error from
/// [`load_config_from_path`] for the first file found.
pub fn load_config() -> Result<(TesselConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }
    Err(ConfigError::NotFound)
}

/// Loads and validates a JSONC configuration file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `Io` or
/// `Parse` if it cannot be read, and `Invalid` if validation fails.
pub fn load_config_from_path(path: &Path) -> Result<(TesselConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: TesselConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok((config, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TesselConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monitors.strategy, "balanced");
        assert_eq!(config.rules.workers, 4);
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = TesselConfig::default();
        config.rules.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rules.workers"));
    }

    #[test]
    fn test_validate_rejects_zero_fps() {
        let mut config = TesselConfig::default();
        config.animation.target_fps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_jsonc_with_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                // distribution
                "monitors": {{ "strategy": "primary-focused" }},
                /* tiling */
                "tiling": {{ "gap": 12, "preferredAlgorithm": "grid" }}
            }}"#
        )
        .unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(config.monitors.strategy, "primary-focused");
        assert!((config.tiling.gap - 12.0).abs() < f64::EPSILON);
        assert_eq!(config.snap, SnapConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join("nope.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(load_config_from_path(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "snap": {{ "thresholdPx": 0 }} }}"#).unwrap();
        assert!(matches!(load_config_from_path(file.path()), Err(ConfigError::Invalid(_))));
    }
}
