//! Sequence pattern model over window n-grams.
//!
//! For every order `n` in `2..=4`, the model counts which window followed each
//! run of `n − 1` windows. A prediction's confidence averages the transition
//! probability with a recency score that halves every week since the pattern
//! was last seen.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{PredictionModel, keep_best};
use crate::placement::WindowId;
use crate::placement::focus::types::{ContextFeatures, FocusEvent, WindowPrediction};

/// Shortest n-gram (one window of context).
pub const MIN_ORDER: usize = 2;

/// Longest n-gram (three windows of context).
pub const MAX_ORDER: usize = 4;

/// Recency half-life.
pub const HALF_LIFE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct Transition {
    count: u64,
    last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternModel {
    /// Prefix of `n − 1` windows to the windows that followed it.
    transitions: HashMap<Vec<WindowId>, HashMap<WindowId, Transition>>,
}

/// `0.5^(age / half_life)`; 1.0 for events in the future.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recency(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = (now - last_seen).num_seconds().max(0) as f64;
    0.5_f64.powf(age / HALF_LIFE.as_secs_f64())
}

impl PatternModel {
    /// Number of distinct prefixes learned.
    #[must_use]
    pub fn prefix_count(&self) -> usize { self.transitions.len() }
}

impl PredictionModel for PatternModel {
    fn name(&self) -> &'static str { "pattern" }

    #[allow(clippy::cast_precision_loss)]
    fn predict(&self, context: &ContextFeatures, history: &[FocusEvent]) -> Vec<WindowPrediction> {
        let recent: Vec<WindowId> = history.iter().map(|e| e.window_id).collect();
        let mut predictions = Vec::new();

        for order in MIN_ORDER..=MAX_ORDER {
            let prefix_len = order - 1;
            if recent.len() < prefix_len {
                break;
            }
            let prefix = &recent[recent.len() - prefix_len..];
            let Some(followers) = self.transitions.get(prefix) else {
                continue;
            };

            let total: u64 = followers.values().map(|t| t.count).sum();
            for (window, transition) in followers {
                let probability = transition.count as f64 / total as f64;
                let score = (probability + recency(transition.last_seen, context.at)) / 2.0;
                predictions.push(WindowPrediction::new(
                    *window,
                    score,
                    self.name(),
                    format!("followed {prefix:?} {} time(s)", transition.count),
                ));
            }
        }
        keep_best(predictions)
    }

    fn train(&mut self, history: &[FocusEvent]) {
        self.transitions.clear();
        for order in MIN_ORDER..=MAX_ORDER {
            for window in history.windows(order) {
                let (prefix, next) = window.split_at(order - 1);
                let prefix: Vec<WindowId> = prefix.iter().map(|e| e.window_id).collect();
                let next = &next[0];
                let entry = self
                    .transitions
                    .entry(prefix)
                    .or_default()
                    .entry(next.window_id)
                    .or_insert(Transition { count: 0, last_seen: next.at });
                entry.count += 1;
                entry.last_seen = entry.last_seen.max(next.at);
            }
        }
    }

    fn fork(&self) -> Box<dyn PredictionModel> { Box::new(self.clone()) }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as TimeDelta;

    use super::*;
    use crate::placement::focus::models::fixtures::{base_time, candidates, events};

    #[test]
    fn test_recency_half_life() {
        let now = base_time();
        assert!((recency(now, now) - 1.0).abs() < 1e-9);
        assert!((recency(now - TimeDelta::weeks(1), now) - 0.5).abs() < 1e-9);
        assert!((recency(now + TimeDelta::hours(1), now) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_learns_repeating_cycle() {
        let cycle = [(1, "editor"), (2, "terminal"), (3, "browser")];
        let history: Vec<_> = events(&cycle.repeat(4));
        let mut model = PatternModel::default();
        model.train(&history);
        assert!(model.prefix_count() > 0);

        // History ends on window 3, so window 1 comes next.
        let context = ContextFeatures::new(history[history.len() - 1].at, candidates(&cycle));
        let predictions = model.predict(&context, &history);
        let best = predictions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .unwrap();
        assert_eq!(best.window_id, 1);
        assert!(best.confidence > 0.9);
    }

    #[test]
    fn test_no_history_no_prediction() {
        let model = PatternModel::default();
        let context = ContextFeatures::new(base_time(), candidates(&[(1, "a")]));
        assert!(model.predict(&context, &[]).is_empty());
    }
}
