//! Snap manager - zone catalog, drag-time detection and snap execution.
//!
//! # Flow
//!
//! 1. A drag starts: [`SnapManager::begin_drag`] records the window snapshot
//! 2. Every cursor sample: [`SnapManager::update_drag`] recomputes candidates
//! 3. Release: [`SnapManager::end_drag`] snaps into the best candidate, if any
//!
//! Snapping runs the zone's actions in order and stops at the first failure.
//! Each zone has a learned weight that rises on success and falls on failure.

mod detection;
mod zone;

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
pub use detection::{
    DetectionSettings, SnapCandidate, confidence, detect, merge, parse_advisor_zones, rank,
    relative_weight,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::json;
pub use zone::{SnapZone, ZoneAction, ZoneConditions, ZoneKind, builtin_zones};

use super::actions::ActionExecutor;
use super::advisor::{self, AdvisorRequest, AdvisorTopic, SharedAdvisor};
use super::error::{EntityKind, PlacementError, PlacementResult};
use super::geometry::{Point, Rect};
use super::history::BoundedHistory;
use super::registry::Window;
use super::weights::{Outcome, WeightTable};
use super::{MonitorId, WindowId};
use crate::config::SnapConfig;

// ============================================================================
// Records
// ============================================================================

/// One snap execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapRecord {
    pub window_id: WindowId,
    pub zone_id: String,
    pub frame: Rect,
    pub success: bool,
    /// Name of the action that failed, if any.
    pub failed_action: Option<String>,
    pub error: Option<String>,
    pub duration: Duration,
    pub at: DateTime<Utc>,
}

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub window: Window,
    pub monitor_id: MonitorId,
    pub monitor_frame: Rect,
    pub cursor: Point,
    pub candidates: Vec<SnapCandidate>,
    pub started_at: Instant,
}

struct SnapLearning {
    weights: WeightTable,
    history: BoundedHistory<SnapRecord>,
    attempts: u64,
    successes: u64,
}

// ============================================================================
// Snap Manager
// ============================================================================

/// Owns the zone catalog and snap preferences.
pub struct SnapManager {
    zones: RwLock<Vec<SnapZone>>,
    learning: Mutex<SnapLearning>,
    drags: Mutex<HashMap<WindowId, DragSession>>,
    settings: DetectionSettings,
    advisor: Option<SharedAdvisor>,
    advisor_timeout: Duration,
}

impl SnapManager {
    /// Creates a manager with the built-in catalog plus configured custom zones.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for invalid custom zones
    /// or a non-positive threshold.
    pub fn new(
        config: &SnapConfig,
        advisor: Option<SharedAdvisor>,
        advisor_timeout: Duration,
    ) -> PlacementResult<Self> {
        if config.threshold_px <= 0.0 || config.magnetic_multiplier < 1.0 {
            return Err(PlacementError::invalid_config(
                "snap threshold must be positive and the magnetic multiplier at least 1",
            ));
        }

        let mut zones = builtin_zones();
        for custom in &config.custom_zones {
            custom.validate()?;
            zones.retain(|z| z.id != custom.id);
            zones.push(custom.clone());
        }

        let mut weights = WeightTable::new();
        for zone in &zones {
            weights.insert(zone.id.clone());
        }

        Ok(Self {
            zones: RwLock::new(zones),
            learning: Mutex::new(SnapLearning {
                weights,
                history: BoundedHistory::new(config.history_limit),
                attempts: 0,
                successes: 0,
            }),
            drags: Mutex::new(HashMap::new()),
            settings: DetectionSettings {
                threshold: config.threshold_px,
                magnetic_multiplier: config.magnetic_multiplier,
            },
            advisor,
            advisor_timeout,
        })
    }

    // ========================================================================
    // Zones
    // ========================================================================

    /// All zones, in catalog order.
    #[must_use]
    pub fn zones(&self) -> Vec<SnapZone> { self.zones.read().clone() }

    /// Looks up one zone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn zone(&self, id: &str) -> PlacementResult<SnapZone> {
        self.zones
            .read()
            .iter()
            .find(|z| z.id == id)
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Zone, id))
    }

    /// Number of zones.
    #[must_use]
    pub fn zone_count(&self) -> usize { self.zones.read().len() }

    /// Adds a custom zone, replacing any zone with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for invalid zones.
    pub fn add_custom_zone(&self, zone: SnapZone) -> PlacementResult<()> {
        zone.validate()?;
        let id = zone.id.clone();
        {
            let mut zones = self.zones.write();
            zones.retain(|z| z.id != id);
            zones.push(zone);
        }
        self.learning.lock().weights.insert(id.clone());
        tracing::debug!("snap: added zone '{id}'");
        Ok(())
    }

    /// Removes a zone and its learned weight.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn remove_zone(&self, id: &str) -> PlacementResult<SnapZone> {
        let removed = {
            let mut zones = self.zones.write();
            let index = zones
                .iter()
                .position(|z| z.id == id)
                .ok_or_else(|| PlacementError::not_found(EntityKind::Zone, id))?;
            zones.remove(index)
        };
        self.learning.lock().weights.remove(id);
        tracing::debug!("snap: removed zone '{id}'");
        Ok(removed)
    }

    /// Enables or disables a zone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn set_zone_enabled(&self, id: &str, enabled: bool) -> PlacementResult<()> {
        let mut zones = self.zones.write();
        let zone = zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Zone, id))?;
        zone.enabled = enabled;
        Ok(())
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Ranks the zones within reach of `cursor` for `window` on a monitor.
    ///
    /// Advisor suggestions are merged in when an advisor answers in time.
    pub async fn candidates(&self, window: &Window, monitor_frame: &Rect, cursor: Point) -> Vec<SnapCandidate> {
        let local = {
            let zones = self.zones.read();
            let learning = self.learning.lock();
            detect(&zones, &learning.weights, window, monitor_frame, cursor, self.settings)
        };

        if self.advisor.is_none() {
            return local;
        }

        let request = AdvisorRequest::new(
            AdvisorTopic::SnapZones,
            json!({
                "app": window.app,
                "cursor": cursor,
                "monitor": monitor_frame,
                "candidates": local.iter().map(|c| &c.zone_id).collect::<Vec<_>>(),
            }),
        );
        match advisor::consult(self.advisor.as_ref(), request, self.advisor_timeout).await {
            Some(answer) => merge(local, parse_advisor_zones(&answer, monitor_frame, cursor)),
            None => local,
        }
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Snaps `window` into a catalog zone on a monitor with `monitor_frame`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown zones, or the first failing action's
    /// error after the failure has been recorded.
    pub async fn snap(
        &self,
        window: &Window,
        zone_id: &str,
        monitor_frame: &Rect,
        executor: &dyn ActionExecutor,
    ) -> PlacementResult<SnapRecord> {
        let zone = self.zone(zone_id)?;
        let frame = zone.resolve(monitor_frame);
        self.execute(window.id, &zone.id, frame, &zone.actions, executor).await
    }

    /// Snaps `window` into a detected candidate (catalog or advisor zone).
    ///
    /// # Errors
    ///
    /// Returns the first failing action's error.
    pub async fn snap_to(
        &self,
        window_id: WindowId,
        candidate: &SnapCandidate,
        executor: &dyn ActionExecutor,
    ) -> PlacementResult<SnapRecord> {
        self.execute(window_id, &candidate.zone_id, candidate.frame, &candidate.actions, executor)
            .await
    }

    async fn execute(
        &self,
        window_id: WindowId,
        zone_id: &str,
        frame: Rect,
        actions: &[ZoneAction],
        executor: &dyn ActionExecutor,
    ) -> PlacementResult<SnapRecord> {
        let started = Instant::now();
        let mut failure: Option<(String, PlacementError)> = None;

        for step in actions {
            let action = step.to_window_action(frame);
            if let Err(err) = executor.execute(window_id, &action).await {
                failure = Some((action.name().to_string(), err));
                break;
            }
        }

        let success = failure.is_none();
        let record = SnapRecord {
            window_id,
            zone_id: zone_id.to_string(),
            frame,
            success,
            failed_action: failure.as_ref().map(|(name, _)| name.clone()),
            error: failure.as_ref().map(|(_, err)| err.to_string()),
            duration: started.elapsed(),
            at: Utc::now(),
        };

        {
            let mut learning = self.learning.lock();
            if learning.weights.get(zone_id).is_some() {
                let outcome = if success { Outcome::Success } else { Outcome::Failure };
                learning.weights.record(zone_id, outcome);
            }
            learning.attempts += 1;
            if success {
                learning.successes += 1;
            }
            learning.history.push(record.clone());
        }

        match failure {
            None => {
                tracing::debug!("snap: window {window_id} -> '{zone_id}'");
                Ok(record)
            }
            Some((name, err)) => {
                tracing::warn!("snap: window {window_id} -> '{zone_id}' failed at {name}: {err}");
                Err(err)
            }
        }
    }

    // ========================================================================
    // Drag Sessions
    // ========================================================================

    /// Starts tracking a drag of `window` on a monitor.
    ///
    /// A drag already in progress for the window is replaced.
    pub fn begin_drag(&self, window: Window, monitor_id: MonitorId, monitor_frame: Rect, cursor: Point) {
        let id = window.id;
        let session = DragSession {
            window,
            monitor_id,
            monitor_frame,
            cursor,
            candidates: Vec::new(),
            started_at: Instant::now(),
        };
        self.drags.lock().insert(id, session);
        tracing::trace!("snap: drag started for window {id}");
    }

    /// Records a cursor sample and returns the current candidates.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no drag is in progress for the window.
    pub async fn update_drag(
        &self,
        window_id: WindowId,
        monitor_id: MonitorId,
        monitor_frame: Rect,
        cursor: Point,
    ) -> PlacementResult<Vec<SnapCandidate>> {
        let window = self
            .drags
            .lock()
            .get(&window_id)
            .map(|s| s.window.clone())
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, window_id))?;

        let candidates = self.candidates(&window, &monitor_frame, cursor).await;

        // The drag may have ended while the advisor was consulted.
        if let Some(session) = self.drags.lock().get_mut(&window_id) {
            session.monitor_id = monitor_id;
            session.monitor_frame = monitor_frame;
            session.cursor = cursor;
            session.candidates.clone_from(&candidates);
        }
        Ok(candidates)
    }

    /// Ends a drag, snapping into the best candidate of the last sample.
    ///
    /// Returns `None` when no candidate was in reach.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no drag is in progress, or the snap's failure.
    pub async fn end_drag(
        &self,
        window_id: WindowId,
        executor: &dyn ActionExecutor,
    ) -> PlacementResult<Option<SnapRecord>> {
        let session = self
            .drags
            .lock()
            .remove(&window_id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, window_id))?;

        match session.candidates.first() {
            Some(best) => self.snap_to(window_id, best, executor).await.map(Some),
            None => {
                tracing::trace!("snap: drag of window {window_id} ended without target");
                Ok(None)
            }
        }
    }

    /// Drops a drag without snapping. Returns whether one was in progress.
    pub fn cancel_drag(&self, window_id: WindowId) -> bool { self.drags.lock().remove(&window_id).is_some() }

    /// Returns the drag in progress for a window.
    #[must_use]
    pub fn drag(&self, window_id: WindowId) -> Option<DragSession> {
        self.drags.lock().get(&window_id).cloned()
    }

    /// Number of drags in progress.
    #[must_use]
    pub fn active_drags(&self) -> usize { self.drags.lock().len() }

    // ========================================================================
    // Learning State
    // ========================================================================

    /// Current normalised weight per zone.
    #[must_use]
    pub fn weights(&self) -> BTreeMap<String, f64> { self.learning.lock().weights.snapshot() }

    /// Share of successful snaps (1.0 before any snap).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let learning = self.learning.lock();
        if learning.attempts == 0 {
            1.0
        } else {
            learning.successes as f64 / learning.attempts as f64
        }
    }

    /// Retained snap history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<SnapRecord> { self.learning.lock().history.to_vec() }
}

impl std::fmt::Debug for SnapManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapManager")
            .field("zones", &self.zone_count())
            .field("settings", &self.settings)
            .field("active_drags", &self.active_drags())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::placement::actions::WindowAction;
    use crate::placement::actions::testing::RecordingExecutor;
    use crate::placement::advisor::StaticAdvisor;
    use crate::placement::binding::WindowSpec;

    fn monitor() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    fn window() -> Window {
        Window::from_spec(&WindowSpec::new(7, "editor", Rect::new(400.0, 300.0, 800.0, 600.0)))
    }

    fn manager() -> SnapManager {
        SnapManager::new(&SnapConfig::default(), None, Duration::from_millis(50)).unwrap()
    }

    #[tokio::test]
    async fn test_snap_runs_actions_in_order() {
        let manager = manager();
        let executor = RecordingExecutor::default();
        let record = manager.snap(&window(), "maximize", &monitor(), &executor).await.unwrap();

        assert!(record.success);
        assert_eq!(executor.names(), vec!["setFrame", "maximize"]);
        assert_eq!(executor.executed.lock()[0].1, WindowAction::SetFrame { frame: monitor() });
    }

    #[tokio::test]
    async fn test_snap_aborts_on_first_failure() {
        let manager = manager();
        let executor = RecordingExecutor::default();
        executor.fail_on("setFrame");
        let before = manager.weights()["maximize"];

        let err = manager.snap(&window(), "maximize", &monitor(), &executor).await.unwrap_err();
        assert!(matches!(err, PlacementError::ActionFailed { .. }));
        assert!(executor.names().is_empty());

        let history = manager.history();
        assert_eq!(history[0].failed_action.as_deref(), Some("setFrame"));
        assert!(manager.weights()["maximize"] < before);
        assert_eq!(manager.success_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_weights_stay_normalised() {
        let manager = manager();
        let executor = RecordingExecutor::default();
        for zone in ["left-half", "left-half", "top-left", "right-half"] {
            manager.snap(&window(), zone, &monitor(), &executor).await.unwrap();
        }
        let total: f64 = manager.weights().values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(manager.weights()["left-half"] > manager.weights()["bottom-half"]);
    }

    #[tokio::test]
    async fn test_unknown_zone() {
        let manager = manager();
        let executor = RecordingExecutor::default();
        let err = manager.snap(&window(), "nowhere", &monitor(), &executor).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_drag_session_snaps_on_release() {
        let manager = manager();
        let executor = RecordingExecutor::default();

        manager.begin_drag(window(), 1, monitor(), Point::new(900.0, 500.0));
        let candidates = manager.update_drag(7, 1, monitor(), Point::new(1918.0, 2.0)).await.unwrap();
        assert_eq!(candidates[0].zone_id, "top-right");

        let record = manager.end_drag(7, &executor).await.unwrap().unwrap();
        assert_eq!(record.frame, Rect::new(960.0, 0.0, 960.0, 540.0));
        assert_eq!(manager.active_drags(), 0);
    }

    #[tokio::test]
    async fn test_drag_without_target() {
        let manager = manager();
        let executor = RecordingExecutor::default();
        manager.begin_drag(window(), 1, monitor(), Point::new(300.0, 300.0));
        manager.update_drag(7, 1, monitor(), Point::new(300.0, 300.0)).await.unwrap();
        assert!(manager.end_drag(7, &executor).await.unwrap().is_none());
        assert!(manager.end_drag(7, &executor).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_advisor_zone_can_win() {
        let advisor: SharedAdvisor = Arc::new(StaticAdvisor::new().with_response(
            AdvisorTopic::SnapZones,
            json!({"zones": [{"id": "reading", "area": {"x": 20, "y": 0, "width": 60, "height": 100}, "confidence": 1.0}]}),
        ));
        let manager = SnapManager::new(&SnapConfig::default(), Some(advisor), Duration::from_secs(1)).unwrap();
        let found = manager.candidates(&window(), &monitor(), Point::new(960.0, 540.0)).await;
        assert_eq!(found[0].zone_id, "reading");
        assert_eq!(found[0].kind, ZoneKind::Advisor);
    }

    #[test]
    fn test_custom_zone_management() {
        let manager = manager();
        let zone = SnapZone::new("notes", ZoneKind::Custom, Rect::new(70.0, 0.0, 30.0, 100.0));
        manager.add_custom_zone(zone).unwrap();
        assert_eq!(manager.zone_count(), 10);
        assert!(manager.weights().contains_key("notes"));

        manager.set_zone_enabled("notes", false).unwrap();
        assert!(!manager.zone("notes").unwrap().enabled);

        manager.remove_zone("notes").unwrap();
        assert!(manager.remove_zone("notes").unwrap_err().is_not_found());
        assert!(!manager.weights().contains_key("notes"));

        let invalid = SnapZone::new("bad", ZoneKind::Custom, Rect::new(0.0, 0.0, 200.0, 10.0));
        assert!(manager.add_custom_zone(invalid).is_err());
    }
}
