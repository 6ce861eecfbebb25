//! Shared placement state and the action executor built on top of it.
//!
//! [`Core`] owns every subsystem except the rules engine. [`Actuator`] wraps
//! it as the [`ActionExecutor`] handed to rules and snap zones, so rule
//! actions, snap actions and the public API all go through the same paths.

use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;

use crate::placement::actions::{ActionExecutor, WindowAction};
use crate::placement::animation::{AnimationKind, AnimationRequest, AnimationSink, Animator, WindowVisualState};
use crate::placement::binding::{DisplayBinding, DisplayCommand, WindowSpec};
use crate::placement::error::{EntityKind, PlacementError, PlacementResult};
use crate::placement::focus::{FocusEvent, FocusPredictor, FocusSource};
use crate::placement::geometry::{Point, Rect};
use crate::placement::layout::{TilingEngine, TilingOutcome};
use crate::placement::lifecycle::Lifecycle;
use crate::placement::monitors::{Monitor, MonitorTopology};
use crate::placement::registry::{Window, WindowRegistry};
use crate::placement::snap::SnapManager;
use crate::placement::{MonitorId, WindowId, WorkspaceId};

use super::saved_layouts::LayoutStore;

/// Writes animation frames to the display server.
pub(super) struct BindingSink {
    binding: Arc<dyn DisplayBinding>,
}

impl BindingSink {
    pub(super) fn new(binding: Arc<dyn DisplayBinding>) -> Self { Self { binding } }
}

impl AnimationSink for BindingSink {
    fn apply(&self, window: WindowId, state: &WindowVisualState) {
        if let Err(err) = self.binding.execute(DisplayCommand::SetFrame { id: window, frame: state.frame }) {
            tracing::trace!("orchestrator: frame for window {window} dropped: {err}");
        }
    }
}

/// Every subsystem the actions operate on.
pub(super) struct Core {
    pub registry: WindowRegistry,
    pub topology: MonitorTopology,
    pub tiling: TilingEngine,
    pub snap: SnapManager,
    pub focus: FocusPredictor,
    pub animator: Animator,
    pub layouts: LayoutStore,
    pub binding: Arc<dyn DisplayBinding>,
}

impl Core {
    // ------------------------------------------------------------------------
    // Windows
    // ------------------------------------------------------------------------

    /// Registers a window reported by the display server and routes it.
    ///
    /// The monitor is the one named by the spec, else the one under the
    /// window's center, else the primary. Returns `None` without touching
    /// the record when the window is already registered.
    pub fn admit(&self, spec: &WindowSpec) -> Option<Window> {
        let mut window = Window::from_spec(spec);
        let monitor = spec
            .monitor_id
            .filter(|id| self.topology.get(*id).is_ok())
            .or_else(|| self.topology.monitor_at(window.frame.center()).map(|m| m.id))
            .or_else(|| self.topology.primary_id());
        window.monitor_id = monitor;
        if !self.registry.insert_new(window.clone()) {
            return None;
        }
        if let Some(monitor) = monitor {
            // The monitor was just looked up; a concurrent removal only loses the route.
            let _ = self.topology.route_window(window.id, monitor);
        }
        tracing::debug!("orchestrator: window {} ({}) on monitor {monitor:?}", window.id, window.app);
        Some(window)
    }

    /// Takes over the frame and title the display server reports for a
    /// known window. Returns whether anything changed.
    pub fn refresh(&self, spec: &WindowSpec) -> PlacementResult<bool> {
        let changed = self.registry.update(spec.id, |w| {
            let changed = w.frame != spec.frame || w.title != spec.title;
            w.frame = spec.frame;
            w.title.clone_from(&spec.title);
            changed
        })?;
        if changed {
            self.settle_monitor(spec.id)?;
        }
        Ok(changed)
    }

    /// Drops every trace of a window. Returns the last known record.
    pub fn forget(&self, id: WindowId) -> Option<Window> {
        let removed = self.registry.remove(id).ok();
        self.topology.unroute_window(id);
        self.animator.forget_window(id);
        self.focus.forget_window(id);
        self.snap.cancel_drag(id);
        removed
    }

    /// Routes a window to a monitor in both the topology and the registry.
    pub fn assign_monitor(&self, id: WindowId, monitor: MonitorId) -> PlacementResult<()> {
        self.topology.route_window(id, monitor)?;
        self.registry.set_monitor(id, Some(monitor))
    }

    /// Re-routes a window to the monitor under its center after it moved.
    pub fn settle_monitor(&self, id: WindowId) -> PlacementResult<()> {
        let window = self.registry.get(id)?;
        if let Some(monitor) = self.topology.monitor_at(window.frame.center()) {
            if window.monitor_id != Some(monitor.id) {
                tracing::debug!("orchestrator: window {id} now on monitor {}", monitor.id);
                self.assign_monitor(id, monitor.id)?;
            }
        }
        Ok(())
    }

    /// Monitor a window lives on, falling back to the primary.
    pub fn monitor_for(&self, window: &Window) -> PlacementResult<Monitor> {
        window
            .monitor_id
            .and_then(|id| self.topology.get(id).ok())
            .or_else(|| self.topology.monitor_at(window.frame.center()))
            .or_else(|| self.topology.primary())
            .ok_or_else(|| PlacementError::not_found(EntityKind::Monitor, "primary"))
    }

    /// Moves a window to `target` and records the new frame.
    ///
    /// With the animator running the change is animated and frames reach the
    /// display server from the frame loop; otherwise the frame is set at once.
    pub fn apply_frame(&self, id: WindowId, target: Rect, kind: AnimationKind) -> PlacementResult<()> {
        let current = self.registry.get(id)?.frame;
        if self.animator.status().running {
            let from = self.animator.current_state(id).unwrap_or_else(|| WindowVisualState::at(current));
            self.animator.animate(AnimationRequest::new(id, kind, from, WindowVisualState::at(target)));
        } else {
            self.binding.execute(DisplayCommand::SetFrame { id, frame: target })?;
        }
        self.registry.update(id, |w| {
            w.frame = target;
            if kind != AnimationKind::Maximize {
                w.flags.maximized = false;
            }
        })
    }

    /// Frame for `window` on `target`, keeping its offset inside the monitor
    /// when it fits and centering it otherwise.
    pub fn frame_on(&self, window: &Window, target: &Monitor) -> Rect {
        let dest = target.frame();
        let width = window.frame.width.min(dest.width);
        let height = window.frame.height.min(dest.height);
        let offset = self
            .monitor_for(window)
            .ok()
            .filter(|m| m.id != target.id)
            .map(|source| {
                let from = source.frame();
                Point::new(window.frame.x - from.x, window.frame.y - from.y)
            });

        match offset {
            Some(offset) => {
                // `max_x() - width` can round below `x` when the window spans the monitor.
                let max_x = (dest.max_x() - width).max(dest.x);
                let max_y = (dest.max_y() - height).max(dest.y);
                Rect::new(
                    (dest.x + offset.x).clamp(dest.x, max_x),
                    (dest.y + offset.y).clamp(dest.y, max_y),
                    width,
                    height,
                )
            }
            None => Rect::new(
                dest.center().x - width / 2.0,
                dest.center().y - height / 2.0,
                width,
                height,
            ),
        }
    }

    /// Moves a window onto another monitor.
    pub fn move_to_monitor(&self, id: WindowId, monitor: MonitorId) -> PlacementResult<()> {
        let window = self.registry.get(id)?;
        let target = self.topology.get(monitor)?;
        if window.monitor_id == Some(monitor) && target.frame().contains(window.frame.center()) {
            return Ok(());
        }
        let frame = self.frame_on(&window, &target);
        self.apply_frame(id, frame, AnimationKind::Move)?;
        self.assign_monitor(id, monitor)
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    /// Focuses a window on the display server and records the change.
    pub fn focus_window(&self, id: WindowId, source: FocusSource) -> PlacementResult<()> {
        self.registry.get(id)?;
        self.binding.execute(DisplayCommand::Focus { id })?;
        self.note_focus(id, source)
    }

    /// Records a focus change that already happened.
    pub fn note_focus(&self, id: WindowId, source: FocusSource) -> PlacementResult<()> {
        let previous = self.registry.focus(id)?;
        let window = self.registry.get(id)?;

        let mut event = FocusEvent::new(id, window.app, source).on_workspace(window.workspace_id);
        if let Some(previous) = previous {
            // Focusing another window leaves the previous one's timestamp alone.
            let held = self
                .registry
                .get(previous)
                .ok()
                .and_then(|w| w.last_focused_at)
                .and_then(|at| (Utc::now() - at).to_std().ok());
            event = event.after(previous, held);
        }
        self.focus.record(event);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Tiling
    // ------------------------------------------------------------------------

    /// Area a workspace is tiled into: the monitor showing it, else the
    /// monitor of its first window, else the primary.
    fn workspace_area(&self, workspace: WorkspaceId, windows: &[Window]) -> PlacementResult<Rect> {
        let showing = self.topology.connected().into_iter().find(|m| m.workspaces.contains(&workspace));
        let monitor = match showing {
            Some(monitor) => monitor,
            None => match windows.first() {
                Some(window) => self.monitor_for(window)?,
                None => self
                    .topology
                    .primary()
                    .ok_or_else(|| PlacementError::not_found(EntityKind::Monitor, "primary"))?,
            },
        };
        Ok(monitor.frame())
    }

    /// Tiles the visible windows of a workspace. Maximized windows stay put.
    ///
    /// Returns `None` when the workspace has nothing to tile.
    pub async fn tile_workspace(
        &self,
        workspace: WorkspaceId,
        forced: Option<&str>,
    ) -> PlacementResult<Option<TilingOutcome>> {
        let windows = self
            .registry
            .list_where(|w| w.workspace_id == workspace && w.is_tileable() && !w.flags.maximized);
        if windows.is_empty() {
            return Ok(None);
        }
        let area = self.workspace_area(workspace, &windows)?;
        let outcome = self.tiling.tile(&windows, &area, forced).await?;
        for (id, frame) in &outcome.placements {
            self.apply_frame(*id, *frame, AnimationKind::Tile)?;
        }
        tracing::debug!(
            "orchestrator: workspace {workspace} tiled with '{}' ({} windows)",
            outcome.algorithm,
            outcome.placements.len()
        );
        Ok(Some(outcome))
    }
}

/// The [`ActionExecutor`] used by rules, snap zones and the public API.
pub(super) struct Actuator {
    core: Arc<Core>,
}

impl Actuator {
    pub(super) const fn new(core: Arc<Core>) -> Self { Self { core } }

    async fn run(&self, id: WindowId, action: &WindowAction) -> PlacementResult<()> {
        let core = &self.core;
        let window = core.registry.get(id)?;

        match action {
            WindowAction::Move { x, y } => {
                let target = Rect::new(*x, *y, window.frame.width, window.frame.height);
                core.apply_frame(id, target, AnimationKind::Move)
            }
            WindowAction::Resize { width, height } => {
                if *width <= 0.0 || *height <= 0.0 {
                    return Err(PlacementError::action(action.name(), "size must be positive"));
                }
                let target = Rect::new(window.frame.x, window.frame.y, *width, *height);
                core.apply_frame(id, target, AnimationKind::Resize)
            }
            WindowAction::SetFrame { frame } => {
                if frame.is_degenerate() {
                    return Err(PlacementError::action(action.name(), "frame must have a positive size"));
                }
                core.apply_frame(id, *frame, AnimationKind::Frame)
            }
            WindowAction::Tile { algorithm } => {
                core.tile_workspace(window.workspace_id, algorithm.as_deref()).await.map(|_| ())
            }
            WindowAction::Snap { zone } => {
                let monitor = core.monitor_for(&window)?;
                core.snap.snap(&window, zone, &monitor.frame(), self).await.map(|_| ())
            }
            WindowAction::Focus => core.focus_window(id, FocusSource::Programmatic),
            WindowAction::Minimize => {
                core.binding.execute(DisplayCommand::Minimize { id })?;
                core.registry.update(id, |w| {
                    w.flags.minimized = true;
                    w.flags.visible = false;
                    w.flags.focused = false;
                })
            }
            WindowAction::Maximize => {
                if window.flags.maximized {
                    return Ok(());
                }
                let frame = core.monitor_for(&window)?.frame();
                core.binding.execute(DisplayCommand::Maximize { id, frame })?;
                core.animator.cancel(id);
                core.registry.update(id, |w| {
                    w.restore_frame = Some(w.frame);
                    w.frame = frame;
                    w.flags.maximized = true;
                    w.flags.minimized = false;
                    w.flags.visible = true;
                })
            }
            WindowAction::Close => {
                core.binding.execute(DisplayCommand::Close { id })?;
                core.forget(id);
                Ok(())
            }
            WindowAction::MoveToWorkspace { workspace } => {
                core.registry.update(id, |w| w.workspace_id = *workspace)
            }
            WindowAction::MoveToMonitor { monitor } => core.move_to_monitor(id, *monitor),
            WindowAction::AddTag { tag } => core.registry.update(id, |w| {
                w.tags.insert(tag.clone());
            }),
            WindowAction::RemoveTag { tag } => core.registry.update(id, |w| {
                w.tags.remove(tag);
            }),
        }
    }
}

impl ActionExecutor for Actuator {
    fn execute<'a>(&'a self, window: WindowId, action: &'a WindowAction) -> BoxFuture<'a, PlacementResult<()>> {
        Box::pin(async move {
            self.run(window, action).await.map_err(|err| match err {
                PlacementError::NotFound { .. } | PlacementError::ActionFailed { .. } => err,
                other => PlacementError::action(action.name(), other.to_string()),
            })
        })
    }
}
