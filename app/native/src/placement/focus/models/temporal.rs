//! Hour-of-day model.

use std::collections::HashMap;

use super::PredictionModel;
use crate::placement::WindowId;
use crate::placement::focus::types::{ContextFeatures, FocusEvent, WindowPrediction};

#[derive(Debug, Clone, Default)]
pub struct TemporalModel {
    /// Focus counts per hour, per window.
    by_hour: HashMap<u32, HashMap<WindowId, u64>>,
}

impl PredictionModel for TemporalModel {
    fn name(&self) -> &'static str { "temporal" }

    #[allow(clippy::cast_precision_loss)]
    fn predict(&self, context: &ContextFeatures, _history: &[FocusEvent]) -> Vec<WindowPrediction> {
        let Some(windows) = self.by_hour.get(&context.hour) else {
            return Vec::new();
        };
        let total: u64 = windows.values().sum();
        windows
            .iter()
            .map(|(window, count)| {
                WindowPrediction::new(
                    *window,
                    *count as f64 / (total + 1) as f64,
                    self.name(),
                    format!("focused {count} time(s) around {:02}:00", context.hour),
                )
            })
            .collect()
    }

    fn train(&mut self, history: &[FocusEvent]) {
        self.by_hour.clear();
        for event in history {
            *self
                .by_hour
                .entry(event.hour())
                .or_default()
                .entry(event.window_id)
                .or_default() += 1;
        }
    }

    fn fork(&self) -> Box<dyn PredictionModel> { Box::new(self.clone()) }
}
