//! Snap configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::snap::SnapZone;

/// Snap manager configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    /// Distance in pixels within which a zone attracts the cursor.
    /// Default: 20
    pub threshold_px: f64,

    /// Threshold multiplier for magnetic zones (at least 1).
    /// Default: 1.5
    pub magnetic_multiplier: f64,

    /// Snap attempts kept for statistics.
    /// Default: 100
    pub history_limit: usize,

    /// Extra zones; a zone with a built-in id replaces it.
    pub custom_zones: Vec<SnapZone>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            threshold_px: 20.0,
            magnetic_multiplier: 1.5,
            history_limit: 100,
            custom_zones: Vec::new(),
        }
    }
}
