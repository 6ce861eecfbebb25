//! Focus predictor - ranks the windows most likely to be focused next.
//!
//! Focus changes are appended to a bounded history. An ensemble of models is
//! retrained from that history on a fixed interval, and before a prediction
//! whenever the history changed since the last round. Training happens on
//! forked copies that are swapped in afterwards; no lock is held while a
//! model trains.
//!
//! # Combination
//!
//! Each model's predictions are scaled by the model weight (the configured
//! weight, else the model's tracked top-1 accuracy), grouped by window and
//! averaged across the models that agree. The current window, windows that
//! are not candidates and results below the minimum confidence are dropped.

pub mod models;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
pub use models::{
    ContextModel, FrequencyModel, PatternModel, PredictionModel, TemporalModel, builtin_models,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Value, json};
pub use types::{
    ContextFeatures, FocusCandidate, FocusEvent, FocusSource, WORKSPACE_KEY, WindowPrediction,
};

use super::advisor::{self, AdvisorRequest, AdvisorTopic, SharedAdvisor};
use super::error::PlacementResult;
use super::history::BoundedHistory;
use super::lifecycle::{ComponentStatus, Lifecycle, TaskGroup};
use super::{WindowId, WorkspaceId};
use crate::config::FocusConfig;

/// Name under which advisor predictions are tracked.
pub const ADVISOR_MODEL: &str = "advisor";

/// Recent events sent to the advisor as context.
const ADVISOR_RECENT_EVENTS: usize = 10;

/// Top-1 hit counts for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Accuracy {
    pub hits: u64,
    pub attempts: u64,
}

impl Accuracy {
    /// Laplace-smoothed hit rate; 0.5 before any attempt.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(&self) -> f64 { (self.hits + 1) as f64 / (self.attempts + 2) as f64 }
}

/// Predictor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorSettings {
    pub history_limit: usize,
    pub retrain_interval: Duration,
    pub min_confidence: f64,
    /// Fixed weights per model name; others use tracked accuracy.
    pub model_weights: BTreeMap<String, f64>,
    pub max_predictions: usize,
}

impl From<&FocusConfig> for PredictorSettings {
    fn from(config: &FocusConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            retrain_interval: Duration::from_millis(config.retrain_interval_ms),
            min_confidence: config.min_confidence,
            model_weights: config.model_weights.clone(),
            max_predictions: config.max_predictions,
        }
    }
}

/// Snapshot for status reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictorStats {
    pub events: usize,
    pub training_runs: u64,
    pub last_trained: Option<DateTime<Utc>>,
    pub accuracy: BTreeMap<String, f64>,
}

struct PredictorInner {
    history: RwLock<BoundedHistory<FocusEvent>>,
    models: RwLock<Vec<Box<dyn PredictionModel>>>,
    accuracy: Mutex<BTreeMap<String, Accuracy>>,
    /// Each model's top pick from the latest prediction round.
    last_top: Mutex<BTreeMap<String, WindowId>>,
    settings: PredictorSettings,
    advisor: Option<SharedAdvisor>,
    advisor_timeout: Duration,
    training_runs: AtomicU64,
    last_trained: Mutex<Option<DateTime<Utc>>>,
    /// Bumped on every history change.
    revision: AtomicU64,
    /// History revision the live models were trained on.
    trained_revision: AtomicU64,
    tasks: TaskGroup,
}

/// Shared handle to the focus predictor.
#[derive(Clone)]
pub struct FocusPredictor {
    inner: Arc<PredictorInner>,
}

impl FocusPredictor {
    /// Creates a predictor with the built-in models.
    #[must_use]
    pub fn new(settings: PredictorSettings, advisor: Option<SharedAdvisor>, advisor_timeout: Duration) -> Self {
        Self::with_models(builtin_models(), settings, advisor, advisor_timeout)
    }

    /// Creates a predictor with a custom model set.
    #[must_use]
    pub fn with_models(
        models: Vec<Box<dyn PredictionModel>>,
        settings: PredictorSettings,
        advisor: Option<SharedAdvisor>,
        advisor_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PredictorInner {
                history: RwLock::new(BoundedHistory::new(settings.history_limit)),
                models: RwLock::new(models),
                accuracy: Mutex::new(BTreeMap::new()),
                last_top: Mutex::new(BTreeMap::new()),
                settings,
                advisor,
                advisor_timeout,
                training_runs: AtomicU64::new(0),
                last_trained: Mutex::new(None),
                revision: AtomicU64::new(0),
                trained_revision: AtomicU64::new(0),
                tasks: TaskGroup::new("focus"),
            }),
        }
    }

    /// Names of the active models.
    #[must_use]
    pub fn model_names(&self) -> Vec<&'static str> {
        self.inner.models.read().iter().map(|m| m.name()).collect()
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Records a focus change and scores the previous round's top picks.
    pub fn record(&self, event: FocusEvent) {
        let picks = std::mem::take(&mut *self.inner.last_top.lock());
        if !picks.is_empty() {
            let mut accuracy = self.inner.accuracy.lock();
            for (model, window) in picks {
                let entry = accuracy.entry(model).or_default();
                entry.attempts += 1;
                if window == event.window_id {
                    entry.hits += 1;
                }
            }
        }
        tracing::trace!("focus: window {} ({:?})", event.window_id, event.source);
        self.inner.history.write().push(event);
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// Drops every history entry for a closed window.
    pub fn forget_window(&self, window: WindowId) {
        self.inner.history.write().retain(|e| e.window_id != window);
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// Retained focus history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<FocusEvent> { self.inner.history.read().to_vec() }

    /// Number of retained events.
    #[must_use]
    pub fn history_len(&self) -> usize { self.inner.history.read().len() }

    // ========================================================================
    // Training
    // ========================================================================

    /// Retrains every model from the current history and swaps them in.
    pub fn retrain_now(&self) { self.inner.retrain(); }

    /// Number of completed training rounds.
    #[must_use]
    pub fn training_runs(&self) -> u64 { self.inner.training_runs.load(Ordering::Relaxed) }

    // ========================================================================
    // Prediction
    // ========================================================================

    /// Ranks the likely next windows for `context`.
    ///
    /// Models are retrained first if the history changed since they were
    /// last trained.
    pub async fn predict(&self, context: &ContextFeatures) -> Vec<WindowPrediction> {
        if self.inner.is_stale() {
            self.inner.retrain();
        }
        let mut per_model: Vec<(String, Vec<WindowPrediction>)> = {
            let history = self.inner.history.read();
            let events: Vec<FocusEvent> = history.to_vec();
            drop(history);
            self.inner
                .models
                .read()
                .iter()
                .map(|model| (model.name().to_string(), model.predict(context, &events)))
                .collect()
        };

        if let Some(advised) = self.ask_advisor(context).await {
            per_model.push((ADVISOR_MODEL.to_string(), advised));
        }

        self.remember_top_picks(&per_model, context);
        self.combine(per_model, context)
    }

    fn remember_top_picks(&self, per_model: &[(String, Vec<WindowPrediction>)], context: &ContextFeatures) {
        let mut last_top = self.inner.last_top.lock();
        last_top.clear();
        for (model, predictions) in per_model {
            let top = predictions
                .iter()
                .filter(|p| context.is_candidate(p.window_id))
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
            if let Some(top) = top {
                last_top.insert(model.clone(), top.window_id);
            }
        }
    }

    fn model_weight(&self, model: &str) -> f64 {
        if let Some(weight) = self.inner.settings.model_weights.get(model) {
            return *weight;
        }
        self.inner.accuracy.lock().get(model).copied().unwrap_or_default().rate()
    }

    #[allow(clippy::cast_precision_loss)]
    fn combine(
        &self,
        per_model: Vec<(String, Vec<WindowPrediction>)>,
        context: &ContextFeatures,
    ) -> Vec<WindowPrediction> {
        // window -> (sum of scaled confidence, contributing models, reasoning)
        let mut grouped: BTreeMap<WindowId, (f64, Vec<String>, Vec<String>)> = BTreeMap::new();

        for (model, predictions) in per_model {
            let weight = self.model_weight(&model);
            // A zero weight switches the model off.
            if weight <= 0.0 {
                continue;
            }
            for prediction in predictions {
                if Some(prediction.window_id) == context.current_window
                    || !context.is_candidate(prediction.window_id)
                {
                    continue;
                }
                let entry = grouped.entry(prediction.window_id).or_default();
                entry.0 += prediction.confidence * weight;
                entry.1.push(model.clone());
                entry.2.extend(prediction.reasoning.into_iter().map(|r| format!("{model}: {r}")));
            }
        }

        let mut ranked: Vec<WindowPrediction> = grouped
            .into_iter()
            .map(|(window_id, (sum, models, reasoning))| WindowPrediction {
                window_id,
                confidence: (sum / models.len() as f64).clamp(0.0, 1.0),
                reasoning,
                models,
            })
            .filter(|p| p.confidence >= self.inner.settings.min_confidence)
            .collect();

        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence).then(a.window_id.cmp(&b.window_id)));
        ranked.truncate(self.inner.settings.max_predictions.max(1));
        ranked
    }

    async fn ask_advisor(&self, context: &ContextFeatures) -> Option<Vec<WindowPrediction>> {
        self.inner.advisor.as_ref()?;
        let recent: Vec<Value> = self
            .inner
            .history
            .read()
            .recent(ADVISOR_RECENT_EVENTS)
            .map(|e| json!({"windowId": e.window_id, "app": e.app}))
            .collect();
        let request = AdvisorRequest::new(
            AdvisorTopic::FocusPrediction,
            json!({ "context": context, "recent": recent }),
        );
        let answer =
            advisor::consult(self.inner.advisor.as_ref(), request, self.inner.advisor_timeout).await?;
        Some(parse_advisor_predictions(&answer))
    }

    // ========================================================================
    // Stats
    // ========================================================================

    /// Tracked top-1 accuracy per model.
    #[must_use]
    pub fn accuracy(&self) -> BTreeMap<String, f64> {
        self.inner.accuracy.lock().iter().map(|(k, v)| (k.clone(), v.rate())).collect()
    }

    /// Snapshot for status reports.
    #[must_use]
    pub fn stats(&self) -> PredictorStats {
        PredictorStats {
            events: self.history_len(),
            training_runs: self.training_runs(),
            last_trained: *self.inner.last_trained.lock(),
            accuracy: self.accuracy(),
        }
    }

    /// Builds a context for the moment `at` over the given candidate windows.
    #[must_use]
    pub fn context_for(
        at: DateTime<Utc>,
        current: Option<(WindowId, String)>,
        workspace: Option<WorkspaceId>,
        candidates: Vec<FocusCandidate>,
    ) -> ContextFeatures {
        let mut context = ContextFeatures::new(at, candidates);
        if let Some((window, app)) = current {
            context = context.with_current(window, app);
        }
        if let Some(workspace) = workspace {
            context = context.on_workspace(workspace);
        }
        context
    }
}

impl PredictorInner {
    fn is_stale(&self) -> bool {
        self.revision.load(Ordering::Acquire) != self.trained_revision.load(Ordering::Acquire)
    }

    fn retrain(&self) {
        let (revision, history) = {
            let history = self.history.read();
            (self.revision.load(Ordering::Acquire), history.to_vec())
        };
        let mut forks: Vec<Box<dyn PredictionModel>> =
            self.models.read().iter().map(|m| m.fork()).collect();
        for model in &mut forks {
            model.train(&history);
        }
        *self.models.write() = forks;
        self.trained_revision.store(revision, Ordering::Release);
        self.training_runs.fetch_add(1, Ordering::Relaxed);
        *self.last_trained.lock() = Some(Utc::now());
        tracing::trace!("focus: retrained on {} events", history.len());
    }
}

/// Parses `{"predictions": [{"windowId": 3, "confidence": 0.7, "reason": "..."}]}`.
#[must_use]
pub fn parse_advisor_predictions(answer: &Value) -> Vec<WindowPrediction> {
    let Some(entries) = answer.get("predictions").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let window = u32::try_from(entry.get("windowId")?.as_u64()?).ok()?;
            let confidence = entry.get("confidence")?.as_f64()?;
            let reason = entry.get("reason").and_then(Value::as_str).unwrap_or("advisor suggestion");
            Some(WindowPrediction::new(window, confidence, ADVISOR_MODEL, reason))
        })
        .collect()
}

impl Lifecycle for FocusPredictor {
    fn name(&self) -> &'static str { "focus" }

    fn start(&self) -> PlacementResult<()> {
        let mut stop = self.inner.tasks.begin()?;
        let inner = Arc::clone(&self.inner);
        let period = inner.settings.retrain_interval.max(Duration::from_millis(1));

        self.inner.tasks.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => inner.retrain(),
                    () = stop.stopped() => break,
                }
            }
            tracing::debug!("focus: retrain loop stopped");
        });
        Ok(())
    }

    fn stop(&self) { self.inner.tasks.halt(); }

    fn status(&self) -> ComponentStatus { self.inner.tasks.status() }
}

impl std::fmt::Debug for FocusPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusPredictor")
            .field("models", &self.model_names())
            .field("events", &self.history_len())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}
