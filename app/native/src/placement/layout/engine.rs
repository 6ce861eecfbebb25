//! Tiling engine: algorithm registry, selection policy and learned weights.
//!
//! Selection runs in priority order:
//!
//! 1. the preferred algorithm, when AI optimisation is disabled
//! 2. the first custom layout whose conditions match the workspace
//! 3. the advisor's recommendation, when AI optimisation is enabled
//! 4. a weighted random pick over the learned per-algorithm weights
//!
//! After every run the chosen algorithm's weight is updated and the run is
//! appended to a capped history.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Timelike, Utc};
use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::json;

use super::custom::{CustomLayout, SelectionContext};
use super::gaps::Gaps;
use super::{LayoutResult, TilingAlgorithm, builtin_algorithms};
use crate::placement::advisor::{self, AdvisorRequest, AdvisorTopic, SharedAdvisor};
use crate::placement::error::{EntityKind, PlacementError, PlacementResult};
use crate::placement::geometry::Rect;
use crate::placement::history::BoundedHistory;
use crate::placement::registry::Window;
use crate::placement::weights::{Outcome, WeightTable};

/// Runs faster than this earn the fast-run bonus.
pub const FAST_RUN: Duration = Duration::from_millis(100);

/// Algorithm used when nothing else resolves.
const FALLBACK_ALGORITHM: &str = "master";

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub preferred: Option<String>,
    pub ai_optimization: bool,
    pub gaps: Gaps,
    pub master_ratio: f64,
    pub history_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            preferred: None,
            ai_optimization: true,
            gaps: Gaps::new(8.0, true),
            master_ratio: super::DEFAULT_MASTER_RATIO,
            history_limit: 100,
        }
    }
}

/// How the algorithm for a run was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SelectionSource {
    /// The caller named the algorithm.
    Forced,
    /// The user preference, with AI optimisation disabled.
    Preferred,
    /// A matching custom layout.
    CustomLayout { name: String },
    /// The advisor's recommendation.
    Advisor,
    /// Weighted random pick over learned weights.
    Learned,
    /// Nothing else resolved.
    Fallback,
}

/// One entry of the run history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TilingRun {
    pub algorithm: String,
    pub source: SelectionSource,
    pub window_count: usize,
    pub success: bool,
    pub duration: Duration,
    pub at: DateTime<Utc>,
}

/// Result of a successful tiling run.
#[derive(Debug, Clone)]
pub struct TilingOutcome {
    pub algorithm: String,
    pub source: SelectionSource,
    pub placements: LayoutResult,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunCounts {
    success: u64,
    total: u64,
}

struct Learning {
    weights: WeightTable,
    history: BoundedHistory<TilingRun>,
    counts: BTreeMap<String, RunCounts>,
    rng: StdRng,
}

/// Chooses and runs tiling algorithms.
pub struct TilingEngine {
    algorithms: RwLock<BTreeMap<&'static str, Box<dyn TilingAlgorithm>>>,
    custom_layouts: RwLock<Vec<CustomLayout>>,
    settings: RwLock<EngineSettings>,
    learning: Mutex<Learning>,
    advisor: Option<SharedAdvisor>,
    advisor_timeout: Duration,
}

impl TilingEngine {
    /// Creates an engine with every built-in algorithm registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferred algorithm is unknown or a custom
    /// layout names an unknown algorithm.
    pub fn new(
        settings: EngineSettings,
        custom_layouts: Vec<CustomLayout>,
        advisor: Option<SharedAdvisor>,
        advisor_timeout: Duration,
    ) -> PlacementResult<Self> {
        let mut algorithms = BTreeMap::new();
        let mut weights = WeightTable::new();
        for algorithm in builtin_algorithms(settings.master_ratio) {
            weights.insert(algorithm.name());
            algorithms.insert(algorithm.name(), algorithm);
        }

        if let Some(preferred) = &settings.preferred {
            if !algorithms.contains_key(preferred.as_str()) {
                return Err(PlacementError::not_found(EntityKind::Algorithm, preferred));
            }
        }
        for layout in &custom_layouts {
            if !algorithms.contains_key(layout.algorithm.as_str()) {
                return Err(PlacementError::not_found(EntityKind::Algorithm, &layout.algorithm));
            }
        }

        let learning = Learning {
            weights,
            history: BoundedHistory::new(settings.history_limit),
            counts: BTreeMap::new(),
            rng: StdRng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            algorithms: RwLock::new(algorithms),
            custom_layouts: RwLock::new(custom_layouts),
            settings: RwLock::new(settings),
            learning: Mutex::new(learning),
            advisor,
            advisor_timeout,
        })
    }

    /// Reseeds the random source used for weighted selection.
    pub fn reseed(&self, seed: u64) { self.learning.lock().rng = StdRng::seed_from_u64(seed); }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Registers (or replaces) an algorithm.
    pub fn register_algorithm(&self, algorithm: Box<dyn TilingAlgorithm>) {
        let name = algorithm.name();
        self.learning.lock().weights.insert(name);
        self.algorithms.write().insert(name, algorithm);
        tracing::debug!("tiling: registered algorithm '{name}'");
    }

    /// Registered algorithm names, sorted.
    #[must_use]
    pub fn algorithm_names(&self) -> Vec<&'static str> {
        self.algorithms.read().keys().copied().collect()
    }

    /// Returns `true` if an algorithm with this name is registered.
    #[must_use]
    pub fn has_algorithm(&self, name: &str) -> bool { self.algorithms.read().contains_key(name) }

    /// Current parameters of an algorithm.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown algorithms.
    pub fn parameters(&self, algorithm: &str) -> PlacementResult<BTreeMap<String, f64>> {
        self.algorithms
            .read()
            .get(algorithm)
            .map(|a| a.parameters())
            .ok_or_else(|| PlacementError::not_found(EntityKind::Algorithm, algorithm))
    }

    /// Updates one parameter of an algorithm.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown algorithms and `InvalidConfiguration`
    /// for unknown keys or values out of range.
    pub fn set_parameter(&self, algorithm: &str, key: &str, value: f64) -> PlacementResult<()> {
        let mut algorithms = self.algorithms.write();
        let target = algorithms
            .get_mut(algorithm)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Algorithm, algorithm))?;
        target.set_parameter(key, value)?;
        tracing::debug!("tiling: {algorithm}.{key} = {value}");
        Ok(())
    }

    // ========================================================================
    // Custom Layouts
    // ========================================================================

    /// Adds a custom layout, replacing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the layout names an unknown algorithm.
    pub fn add_custom_layout(&self, layout: CustomLayout) -> PlacementResult<()> {
        if !self.has_algorithm(&layout.algorithm) {
            return Err(PlacementError::not_found(EntityKind::Algorithm, &layout.algorithm));
        }
        let mut layouts = self.custom_layouts.write();
        layouts.retain(|l| l.name != layout.name);
        tracing::debug!("tiling: custom layout '{}' -> {}", layout.name, layout.algorithm);
        layouts.push(layout);
        Ok(())
    }

    /// Removes a custom layout by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no layout has this name.
    pub fn remove_custom_layout(&self, name: &str) -> PlacementResult<CustomLayout> {
        let mut layouts = self.custom_layouts.write();
        let index = layouts
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Layout, name))?;
        Ok(layouts.remove(index))
    }

    /// Custom layouts in evaluation order.
    #[must_use]
    pub fn custom_layouts(&self) -> Vec<CustomLayout> { self.custom_layouts.read().clone() }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Sets or clears the preferred algorithm.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown algorithms.
    pub fn set_preferred(&self, algorithm: Option<&str>) -> PlacementResult<()> {
        if let Some(name) = algorithm {
            if !self.has_algorithm(name) {
                return Err(PlacementError::not_found(EntityKind::Algorithm, name));
            }
        }
        self.settings.write().preferred = algorithm.map(ToString::to_string);
        Ok(())
    }

    /// Enables or disables AI optimisation.
    pub fn set_ai_optimization(&self, enabled: bool) {
        self.settings.write().ai_optimization = enabled;
    }

    /// Replaces the gap settings.
    pub fn set_gaps(&self, gaps: Gaps) { self.settings.write().gaps = gaps; }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> EngineSettings { self.settings.read().clone() }

    // ========================================================================
    // Tiling
    // ========================================================================

    /// Tiles `windows` into `area` using the current local hour for selection.
    ///
    /// # Errors
    ///
    /// See [`TilingEngine::tile_at`].
    pub async fn tile(
        &self,
        windows: &[Window],
        area: &Rect,
        forced: Option<&str>,
    ) -> PlacementResult<TilingOutcome> {
        self.tile_at(windows, area, forced, chrono::Local::now().hour()).await
    }

    /// Tiles `windows` into `area` as if it were `hour` o'clock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown forced algorithm, or the algorithm's
    /// error (a failure that also lowers its weight).
    pub async fn tile_at(
        &self,
        windows: &[Window],
        area: &Rect,
        forced: Option<&str>,
        hour: u32,
    ) -> PlacementResult<TilingOutcome> {
        let (algorithm, source) = match forced {
            Some(name) => {
                if !self.has_algorithm(name) {
                    return Err(PlacementError::not_found(EntityKind::Algorithm, name));
                }
                (name.to_string(), SelectionSource::Forced)
            }
            None => {
                let context = SelectionContext::from_windows(windows, hour);
                self.select(&context, area).await
            }
        };

        let ids: Vec<_> = windows.iter().map(|w| w.id).collect();
        let gaps = self.settings.read().gaps;

        let started = Instant::now();
        let result = {
            let algorithms = self.algorithms.read();
            match algorithms.get(algorithm.as_str()) {
                Some(tiler) => tiler.tile(&ids, area),
                None => Err(PlacementError::not_found(EntityKind::Algorithm, &algorithm)),
            }
        };
        let duration = started.elapsed();

        match result {
            Ok(mut placements) => {
                gaps.apply(&mut placements, area);
                let outcome = if duration < FAST_RUN { Outcome::FastSuccess } else { Outcome::Success };
                self.record(&algorithm, &source, ids.len(), outcome, duration);
                tracing::debug!(
                    "tiling: {} windows with '{algorithm}' ({source:?}) in {duration:?}",
                    ids.len()
                );
                Ok(TilingOutcome { algorithm, source, placements, duration })
            }
            Err(err) => {
                self.record(&algorithm, &source, ids.len(), Outcome::Failure, duration);
                tracing::warn!("tiling: '{algorithm}' failed: {err}");
                Err(err)
            }
        }
    }

    async fn select(&self, context: &SelectionContext, area: &Rect) -> (String, SelectionSource) {
        let settings = self.settings.read().clone();

        if !settings.ai_optimization {
            if let Some(preferred) = settings.preferred.as_deref() {
                if self.has_algorithm(preferred) {
                    return (preferred.to_string(), SelectionSource::Preferred);
                }
            }
        }

        let custom = self
            .custom_layouts
            .read()
            .iter()
            .find(|layout| layout.matches(context) && self.has_algorithm(&layout.algorithm))
            .cloned();
        if let Some(layout) = custom {
            return (layout.algorithm, SelectionSource::CustomLayout { name: layout.name });
        }

        if settings.ai_optimization {
            if let Some(name) = self.ask_advisor(context, area).await {
                return (name, SelectionSource::Advisor);
            }
        }

        let learned = {
            let mut learning = self.learning.lock();
            let Learning { weights, rng, .. } = &mut *learning;
            weights.pick(rng).map(ToString::to_string)
        };
        if let Some(name) = learned {
            if self.has_algorithm(&name) {
                return (name, SelectionSource::Learned);
            }
        }

        let fallback = settings
            .preferred
            .filter(|p| self.has_algorithm(p))
            .or_else(|| self.has_algorithm(FALLBACK_ALGORITHM).then(|| FALLBACK_ALGORITHM.to_string()))
            .or_else(|| self.algorithm_names().first().map(ToString::to_string))
            .unwrap_or_else(|| FALLBACK_ALGORITHM.to_string());
        (fallback, SelectionSource::Fallback)
    }

    async fn ask_advisor(&self, context: &SelectionContext, area: &Rect) -> Option<String> {
        let request = AdvisorRequest::new(
            AdvisorTopic::TilingAlgorithm,
            json!({
                "windowCount": context.window_count,
                "dominantApp": context.dominant_app,
                "hour": context.hour,
                "area": area,
                "algorithms": self.algorithm_names(),
                "weights": self.weights(),
            }),
        );
        let answer = advisor::consult(self.advisor.as_ref(), request, self.advisor_timeout).await?;
        let name = answer.get("algorithm")?.as_str()?;
        if self.has_algorithm(name) {
            Some(name.to_string())
        } else {
            tracing::debug!("tiling: advisor suggested unknown algorithm '{name}'");
            None
        }
    }

    fn record(
        &self,
        algorithm: &str,
        source: &SelectionSource,
        window_count: usize,
        outcome: Outcome,
        duration: Duration,
    ) {
        let success = outcome != Outcome::Failure;
        let mut learning = self.learning.lock();
        learning.weights.record(algorithm, outcome);
        let counts = learning.counts.entry(algorithm.to_string()).or_default();
        counts.total += 1;
        if success {
            counts.success += 1;
        }
        learning.history.push(TilingRun {
            algorithm: algorithm.to_string(),
            source: source.clone(),
            window_count,
            success,
            duration,
            at: Utc::now(),
        });
    }

    // ========================================================================
    // Learning State
    // ========================================================================

    /// Current normalised weight per algorithm.
    #[must_use]
    pub fn weights(&self) -> BTreeMap<String, f64> { self.learning.lock().weights.snapshot() }

    /// Share of successful runs over all recorded runs (1.0 with no runs).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let learning = self.learning.lock();
        let (success, total) = learning
            .counts
            .values()
            .fold((0, 0), |(s, t), c| (s + c.success, t + c.total));
        ratio(success, total)
    }

    /// Success rate per algorithm that has run at least once.
    #[must_use]
    pub fn algorithm_success_rates(&self) -> BTreeMap<String, f64> {
        self.learning
            .lock()
            .counts
            .iter()
            .map(|(name, c)| (name.clone(), ratio(c.success, c.total)))
            .collect()
    }

    /// Retained run history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<TilingRun> { self.learning.lock().history.to_vec() }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(success: u64, total: u64) -> f64 {
    if total == 0 { 1.0 } else { success as f64 / total as f64 }
}

impl std::fmt::Debug for TilingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilingEngine")
            .field("algorithms", &self.algorithm_names())
            .field("settings", &*self.settings.read())
            .field("advisor", &self.advisor.is_some())
            .finish_non_exhaustive()
    }
}
