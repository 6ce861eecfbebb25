//! Orchestrator - composes the placement subsystems behind one API.
//!
//! # Flow
//!
//! 1. The display binding reports a lifecycle event (event pump or polling)
//! 2. The registry and topology are updated first
//! 3. Matching window rules run; their actions come back through the
//!    orchestrator's action executor
//! 4. Geometry changes are animated, or applied at once when the animator
//!    is not running
//!
//! Focus events additionally feed the focus predictor's history.

mod actuator;
mod handlers;
mod saved_layouts;
mod status;

pub use handlers::SyncReport;
pub use saved_layouts::{LayoutEntry, SavedLayout};
pub use status::StatusReport;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use self::actuator::{Actuator, BindingSink, Core};
use self::saved_layouts::LayoutStore;
use super::actions::{ActionExecutor, WindowAction};
use super::advisor::SharedAdvisor;
use super::animation::{AnimationKind, AnimationSink, Animator, AnimatorSettings};
use super::binding::{DisplayBinding, DisplayEvent};
use super::error::{EntityKind, PlacementError, PlacementResult};
use super::focus::{FocusCandidate, FocusPredictor, FocusSource, PredictorSettings, WindowPrediction};
use super::geometry::{Point, Rect, Size};
use super::layout::{CustomLayout, TilingEngine, TilingOutcome};
use super::lifecycle::{Lifecycle, TaskGroup};
use super::monitors::{Assignment, MonitorTopology};
use super::registry::{Window, WindowRegistry};
use super::rules::{ClockTime, CustomPredicate, RuleExecution, RuleTrigger, RulesEngine, WindowRule};
use super::snap::{SnapCandidate, SnapManager, SnapRecord, SnapZone};
use super::{MonitorId, WindowId, WorkspaceId};
use crate::config::TesselConfig;

/// Orchestrator behaviour that is not owned by a subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Re-tile a workspace when its windows come and go.
    pub auto_tile: bool,
    /// Redistribute windows when windows or monitors come and go.
    pub auto_distribute: bool,
    /// Interval of the reconciliation loop.
    pub poll_interval: Duration,
}

impl From<&TesselConfig> for OrchestratorSettings {
    fn from(config: &TesselConfig) -> Self {
        Self {
            auto_tile: config.tiling.auto_tile,
            auto_distribute: config.monitors.auto_distribute,
            poll_interval: Duration::from_millis(config.monitors.poll_interval_ms),
        }
    }
}

struct OrchestratorInner {
    core: Arc<Core>,
    actuator: Arc<Actuator>,
    rules: RulesEngine,
    settings: OrchestratorSettings,
    /// Event stream of the binding while the pump is not running.
    events: Mutex<Option<mpsc::UnboundedReceiver<DisplayEvent>>>,
    events_handled: AtomicU64,
    tasks: TaskGroup,
}

/// Shared handle to the placement engine.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

impl Orchestrator {
    /// Builds every subsystem from `config`.
    ///
    /// The advisor is only consulted when `advisor.enabled` is set.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] if the configuration
    /// does not validate, and `NotFound` for unknown strategy or algorithm names.
    pub fn new(
        config: &TesselConfig,
        binding: Arc<dyn DisplayBinding>,
        advisor: Option<SharedAdvisor>,
    ) -> PlacementResult<Self> {
        config.validate().map_err(|err| PlacementError::invalid_config(err.to_string()))?;

        let advisor = advisor.filter(|_| config.advisor.enabled);
        let timeout = config.advisor_timeout();

        let topology = MonitorTopology::new(&config.monitors, advisor.clone(), timeout)?;
        let tiling = TilingEngine::new(
            config.tiling.engine_settings(),
            config.tiling.custom_layouts.clone(),
            advisor.clone(),
            timeout,
        )?;
        let snap = SnapManager::new(&config.snap, advisor.clone(), timeout)?;
        let focus = FocusPredictor::new(PredictorSettings::from(&config.focus), advisor, timeout);
        let sink: Arc<dyn AnimationSink> = Arc::new(BindingSink::new(Arc::clone(&binding)));
        let animator = Animator::new(AnimatorSettings::from(&config.animation), Some(sink))?;

        let core = Arc::new(Core {
            registry: WindowRegistry::new(),
            topology,
            tiling,
            snap,
            focus,
            animator,
            layouts: LayoutStore::default(),
            binding,
        });
        let actuator = Arc::new(Actuator::new(Arc::clone(&core)));
        let executor: Arc<dyn ActionExecutor> = Arc::clone(&actuator) as Arc<dyn ActionExecutor>;
        let rules = RulesEngine::new(&config.rules, executor)?;

        Ok(Self {
            inner: Arc::new(OrchestratorInner {
                core,
                actuator,
                rules,
                settings: OrchestratorSettings::from(config),
                events: Mutex::new(None),
                events_handled: AtomicU64::new(0),
                tasks: TaskGroup::new("orchestrator"),
            }),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn registry(&self) -> &WindowRegistry { &self.inner.core.registry }

    #[must_use]
    pub fn topology(&self) -> &MonitorTopology { &self.inner.core.topology }

    #[must_use]
    pub fn tiling(&self) -> &TilingEngine { &self.inner.core.tiling }

    #[must_use]
    pub fn snap(&self) -> &SnapManager { &self.inner.core.snap }

    #[must_use]
    pub fn focus(&self) -> &FocusPredictor { &self.inner.core.focus }

    #[must_use]
    pub fn animator(&self) -> &Animator { &self.inner.core.animator }

    #[must_use]
    pub fn rules(&self) -> &RulesEngine { &self.inner.rules }

    #[must_use]
    pub fn binding(&self) -> &Arc<dyn DisplayBinding> { &self.inner.core.binding }

    #[must_use]
    pub fn settings(&self) -> &OrchestratorSettings { &self.inner.settings }

    fn core(&self) -> &Core { &self.inner.core }

    async fn act(&self, id: WindowId, action: WindowAction) -> PlacementResult<()> {
        self.inner.actuator.execute(id, &action).await
    }

    // ========================================================================
    // Window Operations
    // ========================================================================

    /// Focuses a window and records the change for prediction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or the binding's error.
    pub fn focus_window(&self, id: WindowId) -> PlacementResult<()> {
        self.core().focus_window(id, FocusSource::Programmatic)
    }

    /// Closes a window and forgets it everywhere.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed`.
    pub async fn close_window(&self, id: WindowId) -> PlacementResult<()> {
        self.act(id, WindowAction::Close).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed`.
    pub async fn minimize_window(&self, id: WindowId) -> PlacementResult<()> {
        self.act(id, WindowAction::Minimize).await
    }

    /// Maximizes a window to its monitor, remembering the previous frame.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed`.
    pub async fn maximize_window(&self, id: WindowId) -> PlacementResult<()> {
        self.act(id, WindowAction::Maximize).await
    }

    /// Restores a maximized window to the frame it had before.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or the binding's error.
    pub fn restore_window(&self, id: WindowId) -> PlacementResult<()> {
        let window = self.registry().get(id)?;
        let Some(frame) = window.restore_frame.filter(|_| window.flags.maximized) else {
            return Ok(());
        };
        self.core().apply_frame(id, frame, AnimationKind::Restore)?;
        self.registry().update(id, |w| w.restore_frame = None)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed`.
    pub async fn move_window(&self, id: WindowId, origin: Point) -> PlacementResult<()> {
        self.act(id, WindowAction::Move { x: origin.x, y: origin.y }).await?;
        self.core().settle_monitor(id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed` for a
    /// non-positive size.
    pub async fn resize_window(&self, id: WindowId, size: Size) -> PlacementResult<()> {
        self.act(id, WindowAction::Resize { width: size.width, height: size.height }).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or `ActionFailed` for a
    /// degenerate frame.
    pub async fn set_window_frame(&self, id: WindowId, frame: Rect) -> PlacementResult<()> {
        self.act(id, WindowAction::SetFrame { frame }).await?;
        self.core().settle_monitor(id)
    }

    /// Moves a window onto another monitor, keeping its relative position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or monitors.
    pub async fn move_window_to_monitor(&self, id: WindowId, monitor: MonitorId) -> PlacementResult<()> {
        self.act(id, WindowAction::MoveToMonitor { monitor }).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows.
    pub async fn move_window_to_workspace(&self, id: WindowId, workspace: WorkspaceId) -> PlacementResult<()> {
        self.act(id, WindowAction::MoveToWorkspace { workspace }).await
    }

    /// Shows a workspace on a monitor; tiling then uses that monitor's area.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown monitors.
    pub fn show_workspace(&self, workspace: WorkspaceId, monitor: MonitorId) -> PlacementResult<()> {
        self.topology().assign_workspace(monitor, workspace)
    }

    // ========================================================================
    // Tiling and Distribution
    // ========================================================================

    /// Tiles the visible windows of a workspace.
    ///
    /// Returns `None` when there is nothing to tile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown forced algorithm or when no monitor
    /// is known, and the algorithm's `Layout` error.
    pub async fn tile_workspace(
        &self,
        workspace: WorkspaceId,
        algorithm: Option<&str>,
    ) -> PlacementResult<Option<TilingOutcome>> {
        self.core().tile_workspace(workspace, algorithm).await
    }

    /// Runs the active distribution strategy over every window and moves
    /// windows whose monitor changed.
    ///
    /// # Errors
    ///
    /// Propagates strategy errors and failures to move a window.
    pub async fn distribute_windows(&self) -> PlacementResult<Assignment> {
        let windows = self.registry().list();
        if windows.is_empty() || self.topology().connected().is_empty() {
            return Ok(Assignment::new());
        }
        let assignment = self.topology().distribute(&windows).await?;
        for (&id, &monitor) in &assignment {
            match self.core().move_to_monitor(id, monitor) {
                Ok(()) => {}
                // Closed while the strategy ran.
                Err(err) if err.is_not_found() && !self.registry().contains(id) => {}
                Err(err) => return Err(err),
            }
        }
        tracing::debug!(
            "orchestrator: distributed {} windows with '{}'",
            assignment.len(),
            self.topology().strategy_name()
        );
        Ok(assignment)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown strategies.
    pub fn set_distribution_strategy(&self, name: &str) -> PlacementResult<()> {
        self.topology().set_strategy(name)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown algorithms.
    pub fn set_preferred_algorithm(&self, algorithm: Option<&str>) -> PlacementResult<()> {
        self.tiling().set_preferred(algorithm)
    }

    /// # Errors
    ///
    /// Returns an error if the layout names an unknown algorithm.
    pub fn add_custom_layout(&self, layout: CustomLayout) -> PlacementResult<()> {
        self.tiling().add_custom_layout(layout)
    }

    // ========================================================================
    // Snapping
    // ========================================================================

    /// Snaps a window into a zone of its monitor.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or zones, or the failing
    /// action's error.
    pub async fn snap_window(&self, id: WindowId, zone: &str) -> PlacementResult<SnapRecord> {
        let window = self.registry().get(id)?;
        let monitor = self.core().monitor_for(&window)?;
        let record = self.snap().snap(&window, zone, &monitor.frame(), self.inner.actuator.as_ref()).await?;
        self.core().settle_monitor(id)?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns an error if the zone is invalid.
    pub fn add_custom_zone(&self, zone: SnapZone) -> PlacementResult<()> { self.snap().add_custom_zone(zone) }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown zones.
    pub fn remove_zone(&self, id: &str) -> PlacementResult<SnapZone> { self.snap().remove_zone(id) }

    /// Starts a drag of a window with the cursor at `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows or when no monitor is known.
    pub fn begin_drag(&self, id: WindowId, cursor: Point) -> PlacementResult<()> {
        let window = self.registry().get(id)?;
        let monitor = match self.topology().monitor_at(cursor) {
            Some(monitor) => monitor,
            None => self.core().monitor_for(&window)?,
        };
        self.snap().begin_drag(window, monitor.id, monitor.frame(), cursor);
        Ok(())
    }

    /// Records a cursor sample and returns the snap candidates under it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no drag is in progress for the window.
    pub async fn update_drag(&self, id: WindowId, cursor: Point) -> PlacementResult<Vec<SnapCandidate>> {
        let session = self
            .snap()
            .drag(id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, id))?;
        let (monitor_id, monitor_frame) = match self.topology().monitor_at(cursor) {
            Some(monitor) => (monitor.id, monitor.frame()),
            None => (session.monitor_id, session.monitor_frame),
        };
        self.snap().update_drag(id, monitor_id, monitor_frame, cursor).await
    }

    /// Ends a drag, snapping into the best candidate if one is in reach.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no drag is in progress, or the snap's failure.
    pub async fn end_drag(&self, id: WindowId) -> PlacementResult<Option<SnapRecord>> {
        let record = self.snap().end_drag(id, self.inner.actuator.as_ref()).await?;
        if record.is_some() {
            self.core().settle_monitor(id)?;
        }
        Ok(record)
    }

    // ========================================================================
    // Focus Prediction
    // ========================================================================

    /// Ranks the windows most likely to be focused next.
    pub async fn predict_next_focus(&self) -> Vec<WindowPrediction> {
        let current = self.registry().focused();
        let candidates: Vec<FocusCandidate> = self
            .registry()
            .list()
            .into_iter()
            .map(|w| FocusCandidate { id: w.id, app: w.app })
            .collect();
        let context = FocusPredictor::context_for(
            Utc::now(),
            current.as_ref().map(|w| (w.id, w.app.clone())),
            current.as_ref().map(|w| w.workspace_id),
            candidates,
        );
        self.focus().predict(&context).await
    }

    // ========================================================================
    // Saved Layouts
    // ========================================================================

    /// Saves the current frames of a workspace under `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an empty name.
    pub fn create_layout(&self, name: &str, workspace: WorkspaceId) -> PlacementResult<SavedLayout> {
        let windows = self.registry().windows_in_workspace(workspace);
        let layout = SavedLayout::capture(name, workspace, &windows);
        if self.core().layouts.save(layout.clone())?.is_some() {
            tracing::debug!("orchestrator: layout '{name}' replaced");
        }
        tracing::info!("orchestrator: saved layout '{name}' with {} windows", layout.entries.len());
        Ok(layout)
    }

    /// Restores a saved layout. Returns the number of windows placed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown layouts, or the first placement error.
    pub fn apply_layout(&self, name: &str) -> PlacementResult<usize> {
        let layout = self.core().layouts.get(name)?;
        let windows = self.registry().windows_in_workspace(layout.workspace_id);
        let placements = layout.resolve(&windows);
        for (id, frame) in &placements {
            self.core().apply_frame(*id, *frame, AnimationKind::Frame)?;
            self.core().settle_monitor(*id)?;
        }
        tracing::info!("orchestrator: applied layout '{name}' to {} windows", placements.len());
        Ok(placements.len())
    }

    #[must_use]
    pub fn list_layouts(&self) -> Vec<SavedLayout> { self.core().layouts.list() }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown layouts.
    pub fn delete_layout(&self, name: &str) -> PlacementResult<SavedLayout> { self.core().layouts.remove(name) }

    // ========================================================================
    // Rules
    // ========================================================================

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for invalid rules.
    pub fn add_rule(&self, rule: WindowRule) -> PlacementResult<Option<WindowRule>> { self.rules().add_rule(rule) }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown rules.
    pub fn remove_rule(&self, id: &str) -> PlacementResult<WindowRule> { self.rules().remove_rule(id) }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown rules.
    pub fn set_rule_enabled(&self, id: &str, enabled: bool) -> PlacementResult<()> {
        self.rules().set_rule_enabled(id, enabled)
    }

    pub fn register_predicate(&self, name: impl Into<String>, predicate: CustomPredicate) {
        self.rules().register_predicate(name, predicate);
    }

    /// Evaluates every enabled rule against a window, ignoring triggers.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown windows and `EvaluationTimeout` when
    /// the workers do not answer in time.
    pub async fn evaluate_rules(&self, id: WindowId) -> PlacementResult<Vec<RuleExecution>> {
        let window = self.registry().get(id)?;
        self.run_rules(&window, RuleTrigger::Manual).await
    }

    /// Evaluates on the worker pool when it runs, inline otherwise.
    async fn run_rules(&self, window: &Window, trigger: RuleTrigger) -> PlacementResult<Vec<RuleExecution>> {
        if self.rules().status().running {
            self.rules().evaluate(window, trigger).await
        } else {
            Ok(self.rules().evaluate_inline(window, trigger, ClockTime::now()).await)
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Snapshot of the whole engine.
    #[must_use]
    pub fn status(&self) -> StatusReport {
        StatusReport {
            windows: self.registry().len(),
            monitors: self.topology().len(),
            primary_monitor: self.topology().primary_id(),
            focused_window: self.registry().focused().map(|w| w.id),
            strategy: self.topology().strategy_name().to_string(),
            rules: self.rules().stats(),
            zones: self.snap().zone_count(),
            saved_layouts: self.core().layouts.len(),
            active_drags: self.snap().active_drags(),
            algorithm_weights: self.tiling().weights(),
            algorithm_success_rates: self.tiling().algorithm_success_rates(),
            tiling_success_rate: self.tiling().success_rate(),
            snap_success_rate: self.snap().success_rate(),
            animation: self.animator().stats(),
            focus: self.focus().stats(),
            components: vec![
                Lifecycle::status(self),
                self.rules().status(),
                self.animator().status(),
                self.focus().status(),
            ],
            events_handled: self.inner.events_handled.load(Ordering::Relaxed),
        }
    }
}

impl ActionExecutor for Orchestrator {
    fn execute<'a>(
        &'a self,
        window: WindowId,
        action: &'a WindowAction,
    ) -> futures::future::BoxFuture<'a, PlacementResult<()>> {
        self.inner.actuator.execute(window, action)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("windows", &self.registry().len())
            .field("monitors", &self.topology().len())
            .field("running", &self.inner.tasks.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::binding::{DisplayCommand, MockBinding, MonitorSpec, WindowSpec};
    use crate::placement::rules::Condition;

    fn mock() -> Arc<MockBinding> {
        let mock = Arc::new(MockBinding::new());
        mock.add_monitor(
            MonitorSpec::new(1, "built-in", Size::new(1920.0, 1080.0), Point::new(0.0, 0.0)).primary(),
        );
        mock.add_monitor(MonitorSpec::new(2, "external", Size::new(1920.0, 1080.0), Point::new(1920.0, 0.0)));
        mock
    }

    fn config() -> TesselConfig {
        let mut config = TesselConfig::default();
        config.tiling.auto_tile = false;
        config
    }

    async fn setup_with(config: &TesselConfig) -> (Orchestrator, Arc<MockBinding>) {
        let mock = mock();
        let binding: Arc<dyn DisplayBinding> = Arc::clone(&mock) as Arc<dyn DisplayBinding>;
        let orchestrator = Orchestrator::new(config, binding, None).unwrap();
        orchestrator.sync().await.unwrap();
        (orchestrator, mock)
    }

    async fn setup() -> (Orchestrator, Arc<MockBinding>) { setup_with(&config()).await }

    async fn create(orchestrator: &Orchestrator, mock: &MockBinding, spec: WindowSpec) {
        mock.add_window(spec.clone());
        orchestrator.handle_event(DisplayEvent::WindowCreated(spec)).await.unwrap();
    }

    fn spec(id: WindowId, app: &str, frame: Rect) -> WindowSpec { WindowSpec::new(id, app, frame) }

    fn browser_rule() -> WindowRule {
        WindowRule::new("browser-max", "Maximize browsers")
            .when(Condition::app_is("browser"))
            .then(WindowAction::Maximize)
            .on(RuleTrigger::WindowCreated)
    }

    #[tokio::test]
    async fn test_created_windows_are_routed_by_center() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(100.0, 100.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(2000.0, 100.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(3, "notes", Rect::new(-5000.0, 0.0, 100.0, 100.0))).await;

        assert_eq!(orchestrator.registry().get(1).unwrap().monitor_id, Some(1));
        assert_eq!(orchestrator.registry().get(2).unwrap().monitor_id, Some(2));
        // Off-screen windows land on the primary.
        assert_eq!(orchestrator.topology().monitor_of(3), Some(1));
    }

    #[tokio::test]
    async fn test_rules_run_inline_when_engine_stopped() {
        let (orchestrator, mock) = setup().await;
        orchestrator.add_rule(browser_rule()).unwrap();

        create(&orchestrator, &mock, spec(1, "browser", Rect::new(100.0, 100.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "editor", Rect::new(100.0, 100.0, 800.0, 600.0))).await;

        let browser = orchestrator.registry().get(1).unwrap();
        assert!(browser.flags.maximized);
        assert_eq!(browser.frame, Rect::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(browser.restore_frame, Some(Rect::new(100.0, 100.0, 800.0, 600.0)));
        assert!(!orchestrator.registry().get(2).unwrap().flags.maximized);
        assert_eq!(orchestrator.rules().rule("browser-max").unwrap().stats.match_count, 1);
        assert!(mock.commands().iter().any(|c| matches!(c, DisplayCommand::Maximize { id: 1, .. })));
    }

    #[tokio::test]
    async fn test_auto_tile_leaves_maximized_windows() {
        let mut config = config();
        config.tiling.auto_tile = true;
        let (orchestrator, mock) = setup_with(&config).await;
        orchestrator.add_rule(browser_rule()).unwrap();

        create(&orchestrator, &mock, spec(1, "browser", Rect::new(100.0, 100.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "editor", Rect::new(100.0, 100.0, 800.0, 600.0))).await;

        let browser = orchestrator.registry().get(1).unwrap();
        assert!(browser.flags.maximized);
        assert_eq!(browser.frame, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[tokio::test]
    async fn test_restore_after_maximize() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(100.0, 100.0, 800.0, 600.0))).await;

        orchestrator.maximize_window(1).await.unwrap();
        orchestrator.restore_window(1).unwrap();

        let window = orchestrator.registry().get(1).unwrap();
        assert!(!window.flags.maximized);
        assert!(window.restore_frame.is_none());
        assert_eq!(window.frame, Rect::new(100.0, 100.0, 800.0, 600.0));
        assert_eq!(mock.frame_of(1), Some(Rect::new(100.0, 100.0, 800.0, 600.0)));
    }

    #[tokio::test]
    async fn test_focus_events_feed_history() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(0.0, 0.0, 800.0, 600.0))).await;

        orchestrator
            .handle_event(DisplayEvent::WindowFocused { id: 1, source: FocusSource::Click })
            .await
            .unwrap();
        orchestrator.focus_window(2).unwrap();

        let history = orchestrator.focus().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].previous_window, None);
        assert_eq!(history[1].previous_window, Some(1));
        assert_eq!(history[1].source, FocusSource::Programmatic);
        assert_eq!(history[1].workspace(), Some(1));
        assert_eq!(orchestrator.registry().focused().map(|w| w.id), Some(2));
    }

    #[tokio::test]
    async fn test_close_forgets_window() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        orchestrator.begin_drag(1, Point::new(400.0, 300.0)).unwrap();

        orchestrator.close_window(1).await.unwrap();

        assert!(!orchestrator.registry().contains(1));
        assert_eq!(orchestrator.topology().monitor_of(1), None);
        assert_eq!(orchestrator.snap().active_drags(), 0);
        assert!(mock.windows().unwrap().is_empty());
        assert!(orchestrator.close_window(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_closed_event_unknown_window() {
        let (orchestrator, _mock) = setup().await;
        let err = orchestrator.handle_event(DisplayEvent::WindowClosed { id: 42 }).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tile_workspace_with_forced_algorithm() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(50.0, 50.0, 800.0, 600.0))).await;

        let outcome = orchestrator.tile_workspace(1, Some("columns")).await.unwrap().unwrap();
        assert_eq!(outcome.algorithm, "columns");
        assert_eq!(outcome.placements.len(), 2);

        let first = orchestrator.registry().get(1).unwrap().frame;
        let second = orchestrator.registry().get(2).unwrap().frame;
        assert!(first.max_x() <= second.x);
        assert!((first.width - second.width).abs() < 1.0);
        assert_eq!(mock.frame_of(1), Some(first));
        assert_eq!(mock.frame_of(2), Some(second));
    }

    #[tokio::test]
    async fn test_tile_empty_workspace() {
        let (orchestrator, _mock) = setup().await;
        assert!(orchestrator.tile_workspace(7, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_minimized_windows_are_not_tiled() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        orchestrator.handle_event(DisplayEvent::WindowMinimized { id: 2 }).await.unwrap();

        let outcome = orchestrator.tile_workspace(1, Some("columns")).await.unwrap().unwrap();
        assert_eq!(outcome.placements.len(), 1);
        assert_eq!(outcome.placements[0].0, 1);
    }

    #[tokio::test]
    async fn test_monitor_removal_moves_windows_to_primary() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "terminal", Rect::new(2000.0, 100.0, 800.0, 600.0))).await;
        assert_eq!(orchestrator.registry().get(1).unwrap().monitor_id, Some(2));

        mock.remove_monitor(2);
        orchestrator.handle_event(DisplayEvent::MonitorRemoved { id: 2 }).await.unwrap();

        // The departed monitor's frame is gone, so the window is centered.
        let window = orchestrator.registry().get(1).unwrap();
        assert_eq!(window.monitor_id, Some(1));
        assert_eq!(window.frame, Rect::new(560.0, 240.0, 800.0, 600.0));
        assert_eq!(mock.frame_of(1), Some(window.frame));
    }

    #[tokio::test]
    async fn test_move_window_to_monitor_keeps_offset() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(100.0, 50.0, 800.0, 600.0))).await;

        orchestrator.move_window_to_monitor(1, 2).await.unwrap();

        let window = orchestrator.registry().get(1).unwrap();
        assert_eq!(window.frame, Rect::new(2020.0, 50.0, 800.0, 600.0));
        assert_eq!(window.monitor_id, Some(2));
        assert!(orchestrator.move_window_to_monitor(1, 9).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_saved_layout_round_trip() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 960.0, 1080.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(960.0, 0.0, 960.0, 1080.0))).await;

        let saved = orchestrator.create_layout("coding", 1).unwrap();
        assert_eq!(saved.entries.len(), 2);

        orchestrator.move_window(1, Point::new(300.0, 300.0)).await.unwrap();
        assert_eq!(orchestrator.apply_layout("coding").unwrap(), 2);

        assert_eq!(orchestrator.registry().get(1).unwrap().frame, Rect::new(0.0, 0.0, 960.0, 1080.0));
        assert_eq!(mock.frame_of(1), Some(Rect::new(0.0, 0.0, 960.0, 1080.0)));
        assert_eq!(orchestrator.list_layouts().len(), 1);

        orchestrator.delete_layout("coding").unwrap();
        assert!(orchestrator.apply_layout("coding").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sync_reconciles_windows() {
        let (orchestrator, mock) = setup().await;
        mock.add_window(spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0)));
        mock.add_window(spec(2, "terminal", Rect::new(0.0, 0.0, 800.0, 600.0)));

        let report = orchestrator.sync().await.unwrap();
        assert_eq!(report.added, vec![1, 2]);

        mock.remove_window(2);
        mock.execute(DisplayCommand::Move { id: 1, origin: Point::new(2100.0, 0.0) }).unwrap();
        let report = orchestrator.sync().await.unwrap();
        assert_eq!(report.removed, vec![2]);
        assert_eq!(report.updated, vec![1]);
        assert_eq!(orchestrator.registry().get(1).unwrap().monitor_id, Some(2));

        assert!(orchestrator.sync().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_does_not_run_rules() {
        let (orchestrator, mock) = setup().await;
        orchestrator.add_rule(browser_rule()).unwrap();
        mock.add_window(spec(1, "browser", Rect::new(0.0, 0.0, 800.0, 600.0)));

        orchestrator.sync().await.unwrap();

        assert!(!orchestrator.registry().get(1).unwrap().flags.maximized);
        assert_eq!(orchestrator.rules().stats().executions, 0);
    }

    #[tokio::test]
    async fn test_snap_window_into_builtin_zone() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(300.0, 200.0, 800.0, 600.0))).await;

        let record = orchestrator.snap_window(1, "left-half").await.unwrap();
        assert!(record.success);
        assert_eq!(orchestrator.registry().get(1).unwrap().frame, Rect::new(0.0, 0.0, 960.0, 1080.0));

        let err = orchestrator.snap_window(1, "nowhere").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_drag_to_left_edge_snaps() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(300.0, 200.0, 800.0, 600.0))).await;

        orchestrator.begin_drag(1, Point::new(700.0, 500.0)).unwrap();
        let candidates = orchestrator.update_drag(1, Point::new(5.0, 540.0)).await.unwrap();
        assert_eq!(candidates.first().map(|c| c.zone_id.as_str()), Some("left-half"));
        assert_eq!(orchestrator.status().active_drags, 1);

        let record = orchestrator.end_drag(1).await.unwrap().unwrap();
        assert_eq!(record.zone_id, "left-half");
        assert_eq!(mock.frame_of(1), Some(Rect::new(0.0, 0.0, 960.0, 1080.0)));
        assert!(orchestrator.end_drag(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_binding_failure_is_action_failed() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        mock.set_failing(true);

        let err = orchestrator.maximize_window(1).await.unwrap_err();
        assert!(matches!(err, PlacementError::ActionFailed { ref action, .. } if action == "maximize"));
        assert!(!orchestrator.registry().get(1).unwrap().flags.maximized);
    }

    #[tokio::test]
    async fn test_invalid_resize_rejected() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        let err = orchestrator.resize_window(1, Size::new(0.0, 600.0)).await.unwrap_err();
        assert!(matches!(err, PlacementError::ActionFailed { .. }));
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (orchestrator, _mock) = setup().await;
        orchestrator.start().unwrap();
        assert!(matches!(orchestrator.start(), Err(PlacementError::AlreadyRunning(_))));
        assert!(orchestrator.status().all_running());

        orchestrator.stop();
        assert!(!Lifecycle::status(&orchestrator).running);
        assert!(!orchestrator.rules().status().running);
    }

    #[tokio::test]
    async fn test_event_pump_applies_events() {
        let (orchestrator, mock) = setup().await;
        orchestrator.start().unwrap();

        let window = spec(5, "editor", Rect::new(100.0, 100.0, 800.0, 600.0));
        mock.add_window(window.clone());
        assert!(mock.emit(DisplayEvent::WindowCreated(window)));

        let mut seen = false;
        for _ in 0..100 {
            if orchestrator.registry().contains(5) {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        orchestrator.stop();
        assert!(seen);
        assert!(orchestrator.status().events_handled >= 1);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let (orchestrator, mock) = setup().await;
        orchestrator.add_rule(browser_rule()).unwrap();
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        orchestrator.focus_window(1).unwrap();
        orchestrator.create_layout("one", 1).unwrap();

        let status = orchestrator.status();
        assert_eq!(status.windows, 1);
        assert_eq!(status.monitors, 2);
        assert_eq!(status.primary_monitor, Some(1));
        assert_eq!(status.focused_window, Some(1));
        assert_eq!(status.rules.rules, 1);
        assert_eq!(status.saved_layouts, 1);
        assert!(status.zones >= 9);
        assert_eq!(status.components.len(), 4);
        assert!(!status.all_running());
        assert_eq!(status.events_handled, 1);
    }

    #[tokio::test]
    async fn test_move_between_fractional_monitors() {
        let mock = Arc::new(MockBinding::new());
        mock.add_monitor(MonitorSpec::new(1, "wide", Size::new(2999.0, 1080.0), Point::new(0.0, 0.0)).primary());
        mock.add_monitor(MonitorSpec::new(2, "scaled", Size::new(1366.4, 768.0), Point::new(2999.0, 0.0)));
        let binding: Arc<dyn DisplayBinding> = Arc::clone(&mock) as Arc<dyn DisplayBinding>;
        let orchestrator = Orchestrator::new(&config(), binding, None).unwrap();
        orchestrator.sync().await.unwrap();
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(100.0, 100.0, 2000.0, 900.0))).await;

        orchestrator.move_window_to_monitor(1, 2).await.unwrap();

        let window = orchestrator.registry().get(1).unwrap();
        assert_eq!(window.monitor_id, Some(2));
        assert!(window.frame.approx_eq(&Rect::new(2999.0, 0.0, 1366.4, 768.0), 1e-6));

        // Removing the monitor moves the full-size window back without panicking.
        mock.remove_monitor(2);
        orchestrator.handle_event(DisplayEvent::MonitorRemoved { id: 2 }).await.unwrap();
        assert_eq!(orchestrator.registry().get(1).unwrap().monitor_id, Some(1));
    }

    #[tokio::test]
    async fn test_repeated_create_keeps_window_state() {
        let (orchestrator, mock) = setup().await;
        orchestrator.add_rule(browser_rule()).unwrap();
        create(&orchestrator, &mock, spec(1, "browser", Rect::new(100.0, 100.0, 800.0, 600.0))).await;
        orchestrator.move_window_to_workspace(1, 4).await.unwrap();

        let maximized = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let again = spec(1, "browser", maximized).with_title("Docs");
        orchestrator.handle_event(DisplayEvent::WindowCreated(again)).await.unwrap();

        let window = orchestrator.registry().get(1).unwrap();
        assert!(window.flags.maximized);
        assert_eq!(window.workspace_id, 4);
        assert_eq!(window.monitor_id, Some(1));
        assert_eq!(window.title, "Docs");
        assert_eq!(window.frame, maximized);
        assert_eq!(orchestrator.rules().rule("browser-max").unwrap().stats.match_count, 1);
        assert_eq!(orchestrator.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_focus_records_previous_span() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(0.0, 0.0, 800.0, 600.0))).await;

        orchestrator.focus_window(1).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        orchestrator.focus_window(2).unwrap();
        orchestrator.focus_window(2).unwrap();

        let history = orchestrator.focus().history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].previous_window, Some(1));
        assert!(history[1].previous_duration.is_some_and(|held| held >= Duration::from_millis(20)));
        // Refocusing the focused window has no previous span.
        assert_eq!(history[2].previous_window, None);
    }

    #[tokio::test]
    async fn test_predictions_follow_recorded_focus_without_start() {
        let (orchestrator, mock) = setup().await;
        create(&orchestrator, &mock, spec(1, "editor", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        create(&orchestrator, &mock, spec(2, "terminal", Rect::new(0.0, 0.0, 800.0, 600.0))).await;
        for _ in 0..3 {
            orchestrator.focus_window(2).unwrap();
            orchestrator.focus_window(1).unwrap();
        }

        assert!(!Lifecycle::status(orchestrator.focus()).running);
        let predictions = orchestrator.predict_next_focus().await;
        assert_eq!(predictions.first().map(|p| p.window_id), Some(2));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = TesselConfig::default();
        config.rules.workers = 0;
        let binding: Arc<dyn DisplayBinding> = Arc::new(MockBinding::new());
        let err = Orchestrator::new(&config, binding, None).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidConfiguration(_)));
    }
}
