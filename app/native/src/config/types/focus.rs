//! Focus prediction configuration types.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Focus predictor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FocusConfig {
    /// Focus changes kept for training.
    /// Default: 1000
    pub history_limit: usize,

    /// Interval between model retraining rounds, in milliseconds.
    /// Default: 300000 (5 minutes)
    pub retrain_interval_ms: u64,

    /// Predictions below this confidence are dropped.
    /// Default: 0.1
    pub min_confidence: f64,

    /// Fixed weight per model (frequency, pattern, temporal, context,
    /// advisor). Models without an entry are weighted by their accuracy; a
    /// weight of 0 disables a model.
    pub model_weights: BTreeMap<String, f64>,

    /// Predictions returned per query.
    /// Default: 5
    pub max_predictions: usize,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            retrain_interval_ms: 300_000,
            min_confidence: 0.1,
            model_weights: BTreeMap::new(),
            max_predictions: 5,
        }
    }
}
