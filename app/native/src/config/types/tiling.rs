//! Tiling and animation configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::animation::Easing;
use crate::placement::layout::{CustomLayout, DEFAULT_MASTER_RATIO, EngineSettings, Gaps};

/// Tiling engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TilingConfig {
    /// Base gap between tiled windows, in pixels.
    /// Default: 8
    pub gap: f64,

    /// Shrink gaps on crowded workspaces and small screens.
    /// Default: true
    pub smart_gaps: bool,

    /// Let the advisor and learned weights choose algorithms.
    /// When disabled, `preferredAlgorithm` is always used.
    /// Default: true
    pub ai_optimization: bool,

    /// Algorithm to prefer: master, grid, dwindle, columns, rows or monocle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_algorithm: Option<String>,

    /// Share of the area given to the master window.
    /// Default: 0.6
    pub master_ratio: f64,

    /// Tiling runs kept for statistics.
    /// Default: 100
    pub history_limit: usize,

    /// Re-tile a workspace whenever a window is created or closed.
    /// Default: true
    pub auto_tile: bool,

    /// Conditional layouts checked before any learned selection.
    pub custom_layouts: Vec<CustomLayout>,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            gap: 8.0,
            smart_gaps: true,
            ai_optimization: true,
            preferred_algorithm: None,
            master_ratio: DEFAULT_MASTER_RATIO,
            history_limit: 100,
            auto_tile: true,
            custom_layouts: Vec::new(),
        }
    }
}

impl TilingConfig {
    /// Engine settings derived from this section.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            preferred: self.preferred_algorithm.clone(),
            ai_optimization: self.ai_optimization,
            gaps: Gaps::new(self.gap, self.smart_gaps),
            master_ratio: self.master_ratio,
            history_limit: self.history_limit,
        }
    }
}

/// Window animation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Whether window changes are animated.
    /// Default: true
    pub enabled: bool,

    /// Frame rate of the animation loop.
    /// Default: 60
    pub target_fps: u32,

    /// Animations running at once; the rest wait in a queue.
    /// Default: 16
    pub max_concurrent: usize,

    /// Default duration in milliseconds.
    /// Default: 250
    pub duration_ms: u64,

    /// Default easing curve.
    /// Default: "cubic-out"
    pub easing: Easing,

    /// Shorten every animation to a quarter (at least 50 ms).
    /// Default: false
    pub reduced_motion: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_fps: 60,
            max_concurrent: 16,
            duration_ms: 250,
            easing: Easing::default(),
            reduced_motion: false,
        }
    }
}
