//! Workspace and previous-application model.
//!
//! Learns which window tends to follow an application on a given workspace.

use std::collections::HashMap;

use super::PredictionModel;
use crate::placement::focus::types::{ContextFeatures, FocusEvent, WindowPrediction};
use crate::placement::{WindowId, WorkspaceId};

type ContextKey = (Option<WorkspaceId>, String);

#[derive(Debug, Clone, Default)]
pub struct ContextModel {
    transitions: HashMap<ContextKey, HashMap<WindowId, u64>>,
}

impl PredictionModel for ContextModel {
    fn name(&self) -> &'static str { "context" }

    #[allow(clippy::cast_precision_loss)]
    fn predict(&self, context: &ContextFeatures, _history: &[FocusEvent]) -> Vec<WindowPrediction> {
        let Some(app) = context.current_app.as_deref() else {
            return Vec::new();
        };
        let key = (context.workspace_id, app.to_lowercase());
        let Some(followers) = self.transitions.get(&key) else {
            return Vec::new();
        };
        let total: u64 = followers.values().sum();
        followers
            .iter()
            .map(|(window, count)| {
                WindowPrediction::new(
                    *window,
                    *count as f64 / (total + 1) as f64,
                    self.name(),
                    format!("follows {app} on this workspace {count} time(s)"),
                )
            })
            .collect()
    }

    fn train(&mut self, history: &[FocusEvent]) {
        self.transitions.clear();
        for pair in history.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            let key = (next.workspace(), previous.app.to_lowercase());
            *self.transitions.entry(key).or_default().entry(next.window_id).or_default() += 1;
        }
    }

    fn fork(&self) -> Box<dyn PredictionModel> { Box::new(self.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::focus::models::fixtures::{base_time, candidates, events};

    #[test]
    fn test_transitions_are_scoped_by_workspace() {
        let history: Vec<_> = events(&[(1, "editor"), (2, "terminal"), (1, "editor"), (2, "terminal")])
            .into_iter()
            .map(|e| e.on_workspace(3))
            .collect();

        let mut model = ContextModel::default();
        model.train(&history);

        let windows = candidates(&[(1, "editor"), (2, "terminal")]);
        let here = ContextFeatures::new(base_time(), windows.clone()).with_current(1, "Editor").on_workspace(3);
        let predictions = model.predict(&here, &history);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].window_id, 2);

        let elsewhere = ContextFeatures::new(base_time(), windows).with_current(1, "editor").on_workspace(4);
        assert!(model.predict(&elsewhere, &history).is_empty());
    }
}
