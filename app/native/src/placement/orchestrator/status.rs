//! Status snapshot of the whole placement engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::placement::animation::AnimatorStats;
use crate::placement::focus::PredictorStats;
use crate::placement::lifecycle::ComponentStatus;
use crate::placement::rules::RulesStats;

/// Everything `status()` reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub windows: usize,
    pub monitors: usize,
    pub primary_monitor: Option<u32>,
    pub focused_window: Option<u32>,
    pub strategy: String,
    pub rules: RulesStats,
    pub zones: usize,
    pub saved_layouts: usize,
    pub active_drags: usize,
    /// Normalised weight per tiling algorithm.
    pub algorithm_weights: BTreeMap<String, f64>,
    pub algorithm_success_rates: BTreeMap<String, f64>,
    pub tiling_success_rate: f64,
    pub snap_success_rate: f64,
    pub animation: AnimatorStats,
    pub focus: PredictorStats,
    pub components: Vec<ComponentStatus>,
    pub events_handled: u64,
}

impl StatusReport {
    /// Rolling animation frame rate.
    #[must_use]
    pub const fn fps(&self) -> f64 { self.animation.frames.fps }

    /// Frames that arrived later than one frame interval.
    #[must_use]
    pub const fn dropped_frames(&self) -> u64 { self.animation.frames.dropped_frames }

    /// Whether every background component is running.
    #[must_use]
    pub fn all_running(&self) -> bool { self.components.iter().all(|c| c.running) }
}
