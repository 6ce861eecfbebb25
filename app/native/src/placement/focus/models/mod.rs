//! Focus prediction models.
//!
//! Models learn from the focus history in [`PredictionModel::train`] and are
//! queried with [`PredictionModel::predict`]. Training always happens on a
//! [`PredictionModel::fork`] so the live model keeps answering meanwhile.

mod context;
mod frequency;
mod pattern;
mod temporal;

pub use context::ContextModel;
pub use frequency::FrequencyModel;
pub use pattern::{HALF_LIFE, MAX_ORDER, MIN_ORDER, PatternModel};
pub use temporal::TemporalModel;

use super::types::{ContextFeatures, FocusEvent, WindowPrediction};

/// A named focus predictor.
pub trait PredictionModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ranks likely next windows. `history` is oldest first.
    fn predict(&self, context: &ContextFeatures, history: &[FocusEvent]) -> Vec<WindowPrediction>;

    /// Rebuilds the model from `history` (oldest first).
    fn train(&mut self, history: &[FocusEvent]);

    /// Clones the model for off-line training.
    fn fork(&self) -> Box<dyn PredictionModel>;
}

/// Instantiates every built-in model.
#[must_use]
pub fn builtin_models() -> Vec<Box<dyn PredictionModel>> {
    vec![
        Box::new(FrequencyModel::default()),
        Box::new(PatternModel::default()),
        Box::new(TemporalModel::default()),
        Box::new(ContextModel::default()),
    ]
}

/// Keeps the highest-confidence prediction per window.
pub(crate) fn keep_best(predictions: Vec<WindowPrediction>) -> Vec<WindowPrediction> {
    let mut best: Vec<WindowPrediction> = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        match best.iter_mut().find(|p| p.window_id == prediction.window_id) {
            Some(existing) if existing.confidence >= prediction.confidence => {}
            Some(existing) => *existing = prediction,
            None => best.push(prediction),
        }
    }
    best
}
