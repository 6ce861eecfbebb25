//! Application frequency model.
//!
//! Confidence for an application is `count / (total + 1)`; the prediction
//! targets that application's most recently focused window.

use std::collections::HashMap;

use super::{PredictionModel, keep_best};
use crate::placement::WindowId;
use crate::placement::focus::types::{ContextFeatures, FocusEvent, WindowPrediction};

#[derive(Debug, Clone, Default)]
pub struct FrequencyModel {
    /// Focus count per lower-cased application.
    counts: HashMap<String, u64>,
    /// Most recently focused window per application.
    last_window: HashMap<String, WindowId>,
    total: u64,
}

impl FrequencyModel {
    /// Smoothed confidence for an application.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn confidence(&self, app: &str) -> f64 {
        let count = self.counts.get(&app.to_lowercase()).copied().unwrap_or(0);
        count as f64 / (self.total + 1) as f64
    }
}

impl PredictionModel for FrequencyModel {
    fn name(&self) -> &'static str { "frequency" }

    fn predict(&self, context: &ContextFeatures, _history: &[FocusEvent]) -> Vec<WindowPrediction> {
        let predictions = self
            .counts
            .iter()
            .filter_map(|(app, count)| {
                let window = self
                    .last_window
                    .get(app)
                    .copied()
                    .filter(|w| context.is_candidate(*w))
                    .or_else(|| context.windows_of(app).next())?;
                Some(WindowPrediction::new(
                    window,
                    self.confidence(app),
                    self.name(),
                    format!("{app} focused {count} of {} times", self.total),
                ))
            })
            .collect();
        keep_best(predictions)
    }

    fn train(&mut self, history: &[FocusEvent]) {
        self.counts.clear();
        self.last_window.clear();
        for event in history {
            let app = event.app.to_lowercase();
            *self.counts.entry(app.clone()).or_default() += 1;
            self.last_window.insert(app, event.window_id);
        }
        self.total = history.len() as u64;
    }

    fn fork(&self) -> Box<dyn PredictionModel> { Box::new(self.clone()) }
}
