//! Display events, reconciliation with the binding, and background loops.

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;

use serde::Serialize;

use super::Orchestrator;
use crate::placement::WindowId;
use crate::placement::animation::AnimationKind;
use crate::placement::binding::DisplayEvent;
use crate::placement::error::PlacementResult;
use crate::placement::geometry::Rect;
use crate::placement::lifecycle::{ComponentStatus, Lifecycle};
use crate::placement::monitors::TopologyChange;
use crate::placement::rules::{RuleExecution, RuleTrigger};

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub added: Vec<WindowId>,
    pub removed: Vec<WindowId>,
    pub updated: Vec<WindowId>,
    /// Windows moved off departed monitors.
    pub reassigned: Vec<WindowId>,
}

impl SyncReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty() && self.reassigned.is_empty()
    }
}

fn log_rules(id: WindowId, result: PlacementResult<Vec<RuleExecution>>) {
    match result {
        Ok(executions) if executions.is_empty() => {}
        Ok(executions) => {
            let failed = executions.iter().filter(|e| !e.success).count();
            tracing::debug!("orchestrator: {} rule(s) ran for window {id}, {failed} failed", executions.len());
        }
        Err(err) => tracing::warn!("orchestrator: rules for window {id} failed: {err}"),
    }
}

impl Orchestrator {
    /// Applies one display event.
    ///
    /// The registry and topology are updated before any rule runs. Rule
    /// failures are logged and never fail the event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for events about unknown windows or monitors.
    pub async fn handle_event(&self, event: DisplayEvent) -> PlacementResult<()> {
        self.inner.events_handled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("orchestrator: event {event:?}");
        let core = self.core();

        match event {
            DisplayEvent::WindowCreated(spec) => match core.admit(&spec) {
                Some(window) => {
                    self.dispatch_rules(window.id, RuleTrigger::WindowCreated).await;
                    self.after_membership_change(window.workspace_id).await;
                }
                // Already admitted by a sync pass or an earlier event.
                None => {
                    core.refresh(&spec)?;
                }
            },
            DisplayEvent::WindowMoved { id, origin } => {
                core.registry.update(id, |w| {
                    w.frame = Rect::from_origin_size(origin, w.frame.size());
                })?;
                core.settle_monitor(id)?;
                self.dispatch_rules(id, RuleTrigger::WindowMoved).await;
            }
            DisplayEvent::WindowResized { id, size } => {
                core.registry.update(id, |w| {
                    w.frame = Rect::from_origin_size(w.frame.origin(), size);
                    w.flags.maximized = false;
                })?;
                self.dispatch_rules(id, RuleTrigger::WindowResized).await;
            }
            DisplayEvent::WindowFocused { id, source } => {
                core.note_focus(id, source)?;
                self.dispatch_rules(id, RuleTrigger::WindowFocused).await;
            }
            DisplayEvent::WindowMinimized { id } => {
                let workspace = core.registry.update(id, |w| {
                    w.flags.minimized = true;
                    w.flags.visible = false;
                    w.flags.focused = false;
                    w.workspace_id
                })?;
                self.dispatch_rules(id, RuleTrigger::WindowMinimized).await;
                self.after_membership_change(workspace).await;
            }
            DisplayEvent::WindowClosed { id } => {
                let window = core.registry.get(id)?;
                core.forget(id);
                // The record is gone; rules still see the last snapshot.
                log_rules(id, self.run_rules(&window, RuleTrigger::WindowClosed).await);
                self.after_membership_change(window.workspace_id).await;
            }
            DisplayEvent::MonitorAdded(spec) => {
                core.topology.add_monitor(&spec)?;
                self.after_topology_change(&TopologyChange::default()).await?;
            }
            DisplayEvent::MonitorChanged(spec) => {
                let change = core.topology.update_monitor(&spec)?;
                self.after_topology_change(&change).await?;
            }
            DisplayEvent::MonitorRemoved { id } => {
                let change = core.topology.remove_monitor(id)?;
                self.after_topology_change(&change).await?;
            }
        }
        Ok(())
    }

    async fn dispatch_rules(&self, id: WindowId, trigger: RuleTrigger) {
        match self.registry().get(id) {
            Ok(window) => log_rules(id, self.run_rules(&window, trigger).await),
            Err(err) => tracing::debug!("orchestrator: no rules for window {id}: {err}"),
        }
    }

    /// Re-tiles and redistributes after a window appeared or disappeared.
    async fn after_membership_change(&self, workspace: u32) {
        if self.settings().auto_distribute {
            if let Err(err) = self.distribute_windows().await {
                tracing::warn!("orchestrator: distribution failed: {err}");
            }
        }
        if self.settings().auto_tile {
            if let Err(err) = self.tile_workspace(workspace, None).await {
                tracing::warn!("orchestrator: tiling workspace {workspace} failed: {err}");
            }
        }
    }

    /// Moves windows off departed monitors and redistributes if configured.
    async fn after_topology_change(&self, change: &TopologyChange) -> PlacementResult<()> {
        let core = self.core();
        for &id in &change.reassigned {
            let Some(target) = change.target else {
                core.registry.set_monitor(id, None)?;
                continue;
            };
            let window = core.registry.get(id)?;
            let monitor = core.topology.get(target)?;
            let frame = core.frame_on(&window, &monitor);
            core.apply_frame(id, frame, AnimationKind::Move)?;
            core.registry.set_monitor(id, Some(target))?;
        }
        if self.settings().auto_distribute {
            self.distribute_windows().await?;
        }
        Ok(())
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Reconciles monitors and windows with the binding's current state.
    ///
    /// Windows appearing or disappearing here do not trigger rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding cannot be queried.
    pub async fn sync(&self) -> PlacementResult<SyncReport> {
        let core = self.core();
        let mut report = SyncReport::default();

        let change = core.topology.detect(core.binding.as_ref())?;
        report.reassigned.clone_from(&change.reassigned);
        self.after_topology_change(&change).await?;

        let reported = core.binding.windows()?;
        let reported_ids: BTreeSet<WindowId> = reported.iter().map(|s| s.id).collect();

        for spec in &reported {
            if core.admit(spec).is_some() {
                report.added.push(spec.id);
                continue;
            }
            // Animating windows reach their registry frame when the animation ends.
            if !core.animator.is_animating(spec.id) && core.refresh(spec)? {
                report.updated.push(spec.id);
            }
        }

        for id in core.registry.ids() {
            if !reported_ids.contains(&id) {
                core.forget(id);
                report.removed.push(id);
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                "orchestrator: sync added {}, removed {}, updated {}",
                report.added.len(),
                report.removed.len(),
                report.updated.len()
            );
        }
        Ok(report)
    }

    fn stop_subsystems(&self) {
        self.rules().stop();
        self.animator().stop();
        self.focus().stop();
    }
}

impl Lifecycle for Orchestrator {
    fn name(&self) -> &'static str { "orchestrator" }

    /// Starts the subsystems, the event pump and the reconciliation loop.
    fn start(&self) -> PlacementResult<()> {
        let stop = self.inner.tasks.begin()?;

        let subsystems: [&dyn Lifecycle; 3] = [self.rules(), self.animator(), self.focus()];
        for component in subsystems {
            if let Err(err) = component.start() {
                tracing::warn!("orchestrator: {} failed to start: {err}", component.name());
                self.stop_subsystems();
                self.inner.tasks.halt();
                return Err(err);
            }
        }

        let events = self.inner.events.lock().take().or_else(|| self.binding().take_events());
        if let Some(mut events) = events {
            let orchestrator = self.clone();
            let mut stop = stop.clone();
            self.inner.tasks.spawn(async move {
                loop {
                    tokio::select! {
                        event = events.recv() => {
                            let Some(event) = event else { break };
                            if let Err(err) = orchestrator.handle_event(event).await {
                                tracing::warn!("orchestrator: event failed: {err}");
                            }
                        }
                        () = stop.stopped() => break,
                    }
                }
                *orchestrator.inner.events.lock() = Some(events);
                tracing::debug!("orchestrator: event pump stopped");
            });
        }

        let orchestrator = self.clone();
        let mut stop = stop;
        let period = self.settings().poll_interval;
        self.inner.tasks.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(err) = orchestrator.sync().await {
                            tracing::warn!("orchestrator: sync failed: {err}");
                        }
                    }
                    () = stop.stopped() => break,
                }
            }
            tracing::debug!("orchestrator: sync loop stopped");
        });

        tracing::info!("orchestrator: started");
        Ok(())
    }

    fn stop(&self) {
        if self.inner.tasks.halt() {
            self.stop_subsystems();
            tracing::info!("orchestrator: stopped");
        }
    }

    fn status(&self) -> ComponentStatus { self.inner.tasks.status() }
}
