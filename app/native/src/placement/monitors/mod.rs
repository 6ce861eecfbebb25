//! Monitor topology - tracked displays, primary election and distribution.
//!
//! The topology owns the monitor records and the window routing table
//! (which monitor each window belongs to). Every change recomputes the
//! derived [`TopologyLayout`] and broadcasts a [`TopologyEvent`].
//!
//! # Primary election
//!
//! Exactly one connected monitor is primary whenever any is connected. The
//! first monitor added (or one explicitly flagged primary) becomes primary.
//! When the primary goes away the connected monitor with the lowest id is
//! elected, and only then are the departed monitor's windows re-routed, so
//! they land on the new primary.

mod distribution;
mod monitor;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
pub use distribution::{
    ADVISOR_OPTIMIZED, APPLICATION_AWARE, AdvisorOptimized, AppMonitorRule, ApplicationAware,
    Assignment, BALANCED, Balanced, CONTEXT_AWARE, ContextAware, DistributionContext,
    DistributionStrategy, MonitorRole, PRIMARY_FOCUSED, PrimaryFocused, default_app_rules,
    primary_share,
};
pub use monitor::{LayoutKind, Monitor, TopologyLayout};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

use super::advisor::SharedAdvisor;
use super::binding::{DisplayBinding, MonitorSpec};
use super::error::{EntityKind, PlacementError, PlacementResult};
use super::registry::Window;
use super::{MonitorId, WindowId};
use crate::config::MonitorsConfig;

/// Capacity of the topology event channel.
const EVENT_CAPACITY: usize = 64;

// ============================================================================
// Events
// ============================================================================

/// Notifications emitted after topology changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TopologyEvent {
    LayoutUpdated { layout: TopologyLayout },
    PrimaryChanged { previous: Option<MonitorId>, current: Option<MonitorId> },
    WindowsReassigned { from: MonitorId, to: Option<MonitorId>, windows: Vec<WindowId> },
}

/// Summary of what a topology mutation did to routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyChange {
    /// Windows moved off a departed monitor.
    pub reassigned: Vec<WindowId>,
    /// Where the reassigned windows went (`None` if no monitor remains).
    pub target: Option<MonitorId>,
    /// The primary after the change.
    pub primary: Option<MonitorId>,
}

impl TopologyChange {
    fn merge(&mut self, other: Self) {
        self.reassigned.extend(other.reassigned);
        if other.target.is_some() {
            self.target = other.target;
        }
        self.primary = other.primary;
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Default)]
struct TopologyState {
    monitors: BTreeMap<MonitorId, Monitor>,
    routes: BTreeMap<MonitorId, BTreeSet<WindowId>>,
    primary: Option<MonitorId>,
    layout: TopologyLayout,
}

impl TopologyState {
    fn set_primary(&mut self, id: Option<MonitorId>) {
        for monitor in self.monitors.values_mut() {
            monitor.is_primary = Some(monitor.id) == id;
        }
        self.primary = id;
    }

    /// Lowest-id connected monitor.
    fn elect(&self) -> Option<MonitorId> {
        self.monitors.values().find(|m| m.is_connected).map(|m| m.id)
    }

    /// Moves every window routed to `from` onto `to`.
    fn reroute(&mut self, from: MonitorId, to: Option<MonitorId>) -> Vec<WindowId> {
        let windows: Vec<WindowId> =
            self.routes.get_mut(&from).map(std::mem::take).unwrap_or_default().into_iter().collect();
        if let Some(to) = to {
            self.routes.entry(to).or_default().extend(windows.iter().copied());
        }
        windows
    }

    fn connected(&self) -> Vec<Monitor> {
        self.monitors.values().filter(|m| m.is_connected).cloned().collect()
    }
}

// ============================================================================
// Topology
// ============================================================================

/// Tracks monitors, routes windows and runs distribution strategies.
pub struct MonitorTopology {
    state: RwLock<TopologyState>,
    strategies: BTreeMap<&'static str, Arc<dyn DistributionStrategy>>,
    active: RwLock<Arc<dyn DistributionStrategy>>,
    advisor: Option<SharedAdvisor>,
    advisor_timeout: Duration,
    events: broadcast::Sender<TopologyEvent>,
}

impl std::fmt::Debug for MonitorTopology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorTopology")
            .field("state", &*self.state.read())
            .field("strategy", &self.strategy_name())
            .finish_non_exhaustive()
    }
}

impl MonitorTopology {
    /// Creates an empty topology with the built-in strategies registered.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the configured strategy is unknown.
    pub fn new(
        config: &MonitorsConfig,
        advisor: Option<SharedAdvisor>,
        advisor_timeout: Duration,
    ) -> PlacementResult<Self> {
        let mut strategies: BTreeMap<&'static str, Arc<dyn DistributionStrategy>> = BTreeMap::new();
        let builtins: [Arc<dyn DistributionStrategy>; 5] = [
            Arc::new(Balanced),
            Arc::new(PrimaryFocused),
            Arc::new(ApplicationAware::new(config.app_rules.clone())),
            Arc::new(ContextAware::new(config.app_rules.clone())),
            Arc::new(AdvisorOptimized),
        ];
        for strategy in builtins {
            strategies.insert(strategy.name(), strategy);
        }

        let active = strategies
            .get(config.strategy.as_str())
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Strategy, &config.strategy))?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            state: RwLock::new(TopologyState::default()),
            strategies,
            active: RwLock::new(active),
            advisor,
            advisor_timeout,
            events,
        })
    }

    /// Subscribes to topology notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TopologyEvent> { self.events.subscribe() }

    fn emit(&self, event: TopologyEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn refresh_layout(&self, state: &mut TopologyState) {
        state.layout = TopologyLayout::compute(state.monitors.values());
        tracing::debug!(
            "monitors: layout {:?} with {} connected",
            state.layout.kind,
            state.layout.connected
        );
        self.emit(TopologyEvent::LayoutUpdated { layout: state.layout });
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Adds a monitor, or updates it if the id is already known.
    ///
    /// # Errors
    ///
    /// Currently infallible for new monitors; updates propagate
    /// [`update_monitor`](Self::update_monitor) errors.
    pub fn add_monitor(&self, spec: &MonitorSpec) -> PlacementResult<TopologyChange> {
        let mut state = self.state.write();
        if state.monitors.contains_key(&spec.id) {
            return self.apply_update(&mut state, spec);
        }

        let previous_primary = state.primary;
        let monitor = Monitor::from_spec(spec);
        let connected = monitor.is_connected;
        state.monitors.insert(spec.id, monitor);
        state.routes.entry(spec.id).or_default();

        if connected && (spec.is_primary || state.primary.is_none()) {
            state.set_primary(Some(spec.id));
        } else {
            let primary = state.primary;
            state.set_primary(primary);
        }

        tracing::info!("monitors: added {} ({})", spec.id, spec.name);
        self.refresh_layout(&mut state);
        if state.primary != previous_primary {
            self.emit(TopologyEvent::PrimaryChanged {
                previous: previous_primary,
                current: state.primary,
            });
        }

        Ok(TopologyChange { primary: state.primary, ..TopologyChange::default() })
    }

    /// Updates a known monitor.
    ///
    /// Disconnecting a monitor behaves like removal for routing and primary
    /// purposes; the record itself is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown monitors.
    pub fn update_monitor(&self, spec: &MonitorSpec) -> PlacementResult<TopologyChange> {
        let mut state = self.state.write();
        self.apply_update(&mut state, spec)
    }

    fn apply_update(&self, state: &mut TopologyState, spec: &MonitorSpec) -> PlacementResult<TopologyChange> {
        let Some(existing) = state.monitors.get(&spec.id) else {
            return Err(PlacementError::not_found(EntityKind::Monitor, spec.id));
        };
        let was_connected = existing.is_connected;
        let workspaces = existing.workspaces.clone();
        let previous_primary = state.primary;

        let mut monitor = Monitor::from_spec(spec);
        monitor.workspaces = workspaces;
        state.monitors.insert(spec.id, monitor);

        let mut change = TopologyChange::default();
        if spec.is_connected && spec.is_primary {
            state.set_primary(Some(spec.id));
        } else if !spec.is_connected {
            if state.primary == Some(spec.id) {
                let elected = state.elect();
                state.set_primary(elected);
            } else {
                let primary = state.primary;
                state.set_primary(primary);
            }
            if was_connected {
                change = self.reroute_departed(state, spec.id);
            }
        } else if state.primary.is_none() {
            state.set_primary(Some(spec.id));
        } else {
            let primary = state.primary;
            state.set_primary(primary);
        }

        self.refresh_layout(state);
        if state.primary != previous_primary {
            self.emit(TopologyEvent::PrimaryChanged {
                previous: previous_primary,
                current: state.primary,
            });
        }
        change.primary = state.primary;
        Ok(change)
    }

    /// Removes a monitor, electing a new primary and re-routing its windows.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown monitors.
    pub fn remove_monitor(&self, id: MonitorId) -> PlacementResult<TopologyChange> {
        let mut state = self.state.write();
        if state.monitors.remove(&id).is_none() {
            return Err(PlacementError::not_found(EntityKind::Monitor, id));
        }
        let previous_primary = state.primary;

        if previous_primary == Some(id) {
            let elected = state.elect();
            state.set_primary(elected);
        }

        let mut change = self.reroute_departed(&mut state, id);
        state.routes.remove(&id);

        tracing::info!("monitors: removed {id}");
        self.refresh_layout(&mut state);
        if state.primary != previous_primary {
            self.emit(TopologyEvent::PrimaryChanged {
                previous: previous_primary,
                current: state.primary,
            });
        }
        change.primary = state.primary;
        Ok(change)
    }

    fn reroute_departed(&self, state: &mut TopologyState, from: MonitorId) -> TopologyChange {
        let target = state.primary.filter(|&p| p != from);
        let windows = state.reroute(from, target);
        if !windows.is_empty() {
            tracing::debug!("monitors: moved {} windows from {from} to {target:?}", windows.len());
            self.emit(TopologyEvent::WindowsReassigned {
                from,
                to: target,
                windows: windows.clone(),
            });
        }
        TopologyChange { reassigned: windows, target, primary: state.primary }
    }

    /// Reconciles the tracked monitors with the display server.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding cannot be queried.
    pub fn detect(&self, binding: &dyn DisplayBinding) -> PlacementResult<TopologyChange> {
        let reported = binding.monitors()?;
        let known: BTreeMap<MonitorId, Monitor> = self.state.read().monitors.clone();
        let mut change = TopologyChange { primary: self.primary_id(), ..TopologyChange::default() };

        for spec in &reported {
            match known.get(&spec.id) {
                None => change.merge(self.add_monitor(spec)?),
                Some(existing) if Self::differs(existing, spec) => {
                    change.merge(self.update_monitor(spec)?);
                }
                Some(_) => {}
            }
        }

        for id in known.keys() {
            if !reported.iter().any(|spec| spec.id == *id) {
                change.merge(self.remove_monitor(*id)?);
            }
        }

        Ok(change)
    }

    fn differs(existing: &Monitor, spec: &MonitorSpec) -> bool {
        existing.resolution != spec.resolution
            || existing.position != spec.position
            || existing.rotation != spec.rotation
            || existing.is_connected != spec.is_connected
            || (spec.is_primary && !existing.is_primary)
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    /// Routes a window to a monitor, removing it from any other.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown monitors.
    pub fn route_window(&self, window: WindowId, monitor: MonitorId) -> PlacementResult<()> {
        let mut state = self.state.write();
        if !state.monitors.contains_key(&monitor) {
            return Err(PlacementError::not_found(EntityKind::Monitor, monitor));
        }
        for routed in state.routes.values_mut() {
            routed.remove(&window);
        }
        state.routes.entry(monitor).or_default().insert(window);
        Ok(())
    }

    /// Forgets a window's routing.
    pub fn unroute_window(&self, window: WindowId) -> Option<MonitorId> {
        let mut state = self.state.write();
        let mut previous = None;
        for (&monitor, routed) in &mut state.routes {
            if routed.remove(&window) {
                previous = Some(monitor);
            }
        }
        previous
    }

    #[must_use]
    pub fn monitor_of(&self, window: WindowId) -> Option<MonitorId> {
        self.state
            .read()
            .routes
            .iter()
            .find(|(_, routed)| routed.contains(&window))
            .map(|(&monitor, _)| monitor)
    }

    #[must_use]
    pub fn windows_on(&self, monitor: MonitorId) -> Vec<WindowId> {
        self.state
            .read()
            .routes
            .get(&monitor)
            .map(|routed| routed.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Records that a workspace is shown on a monitor.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown monitors.
    pub fn assign_workspace(&self, monitor: MonitorId, workspace: u32) -> PlacementResult<()> {
        let mut state = self.state.write();
        for m in state.monitors.values_mut() {
            m.workspaces.retain(|&w| w != workspace);
        }
        let target = state
            .monitors
            .get_mut(&monitor)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Monitor, monitor))?;
        target.workspaces.push(workspace);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns a copy of a monitor.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown monitors.
    pub fn get(&self, id: MonitorId) -> PlacementResult<Monitor> {
        self.state
            .read()
            .monitors
            .get(&id)
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Monitor, id))
    }

    /// All monitors ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Monitor> { self.state.read().monitors.values().cloned().collect() }

    /// Connected monitors ordered by id.
    #[must_use]
    pub fn connected(&self) -> Vec<Monitor> { self.state.read().connected() }

    #[must_use]
    pub fn primary(&self) -> Option<Monitor> {
        let state = self.state.read();
        state.primary.and_then(|id| state.monitors.get(&id).cloned())
    }

    #[must_use]
    pub fn primary_id(&self) -> Option<MonitorId> { self.state.read().primary }

    #[must_use]
    pub fn layout(&self) -> TopologyLayout { self.state.read().layout }

    /// Connected monitor containing the point, if any.
    #[must_use]
    pub fn monitor_at(&self, point: super::geometry::Point) -> Option<Monitor> {
        self.state
            .read()
            .monitors
            .values()
            .find(|m| m.is_connected && m.frame().contains(point))
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize { self.state.read().monitors.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.state.read().monitors.is_empty() }

    // ------------------------------------------------------------------------
    // Distribution
    // ------------------------------------------------------------------------

    /// Switches the active distribution strategy.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for unknown strategy names.
    pub fn set_strategy(&self, name: &str) -> PlacementResult<()> {
        let strategy = self
            .strategies
            .get(name)
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Strategy, name))?;
        *self.active.write() = strategy;
        tracing::info!("monitors: distribution strategy set to {name}");
        Ok(())
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str { self.active.read().name() }

    #[must_use]
    pub fn strategies(&self) -> Vec<&'static str> { self.strategies.keys().copied().collect() }

    /// Runs the active strategy at the current local hour and routes the result.
    ///
    /// # Errors
    ///
    /// Propagates strategy errors.
    pub async fn distribute(&self, windows: &[Window]) -> PlacementResult<Assignment> {
        self.distribute_at(windows, chrono::Local::now().hour()).await
    }

    /// Runs the active strategy as if it were `hour` o'clock and routes the result.
    ///
    /// # Errors
    ///
    /// Propagates strategy errors.
    pub async fn distribute_at(&self, windows: &[Window], hour: u32) -> PlacementResult<Assignment> {
        let strategy = Arc::clone(&*self.active.read());
        let monitors = self.connected();
        let context = DistributionContext {
            hour,
            advisor: self.advisor.clone(),
            advisor_timeout: self.advisor_timeout,
        };

        let assignment = strategy.distribute(windows, &monitors, &context).await?;

        {
            let mut state = self.state.write();
            for (&window, &monitor) in &assignment {
                if !state.monitors.contains_key(&monitor) {
                    continue;
                }
                for routed in state.routes.values_mut() {
                    routed.remove(&window);
                }
                state.routes.entry(monitor).or_default().insert(window);
            }
        }

        tracing::debug!(
            "monitors: {} distributed {} windows over {} monitors",
            strategy.name(),
            assignment.len(),
            monitors.len()
        );
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::binding::MockBinding;
    use crate::placement::geometry::{Point, Size};

    fn topology() -> MonitorTopology {
        MonitorTopology::new(&MonitorsConfig::default(), None, Duration::from_millis(50)).unwrap()
    }

    fn spec(id: MonitorId, x: f64) -> MonitorSpec {
        MonitorSpec::new(id, format!("DP-{id}"), Size::new(1920.0, 1080.0), Point::new(x, 0.0))
    }

    fn drain(rx: &mut broadcast::Receiver<TopologyEvent>) -> Vec<TopologyEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_first_monitor_becomes_primary() {
        let topology = topology();
        topology.add_monitor(&spec(2, 0.0)).unwrap();
        topology.add_monitor(&spec(1, 1920.0)).unwrap();
        assert_eq!(topology.primary_id(), Some(2));
        assert_eq!(topology.list().iter().filter(|m| m.is_primary).count(), 1);
    }

    #[test]
    fn test_explicit_primary_demotes_previous() {
        let topology = topology();
        topology.add_monitor(&spec(1, 0.0)).unwrap();
        topology.add_monitor(&spec(2, 1920.0).primary()).unwrap();
        assert_eq!(topology.primary_id(), Some(2));
        assert!(!topology.get(1).unwrap().is_primary);
    }

    #[test]
    fn test_remove_primary_reassigns_to_new_primary() {
        let topology = topology();
        let mut rx = topology.subscribe();
        topology.add_monitor(&spec(1, 0.0)).unwrap();
        topology.add_monitor(&spec(2, 1920.0)).unwrap();
        topology.add_monitor(&spec(3, 3840.0)).unwrap();
        topology.route_window(10, 1).unwrap();
        topology.route_window(11, 1).unwrap();
        topology.route_window(12, 3).unwrap();
        drain(&mut rx);

        let change = topology.remove_monitor(1).unwrap();
        assert_eq!(change.primary, Some(2));
        assert_eq!(change.target, Some(2));
        assert_eq!(change.reassigned, vec![10, 11]);
        assert_eq!(topology.windows_on(2), vec![10, 11]);
        assert_eq!(topology.monitor_of(12), Some(3));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(e, TopologyEvent::LayoutUpdated { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            TopologyEvent::PrimaryChanged { previous: Some(1), current: Some(2) }
        )));
        assert!(events.iter().any(|e| matches!(e, TopologyEvent::WindowsReassigned { from: 1, .. })));
    }

    #[test]
    fn test_remove_last_monitor_unroutes() {
        let topology = topology();
        topology.add_monitor(&spec(1, 0.0)).unwrap();
        topology.route_window(5, 1).unwrap();
        let change = topology.remove_monitor(1).unwrap();
        assert_eq!(change.reassigned, vec![5]);
        assert_eq!(change.target, None);
        assert_eq!(topology.primary_id(), None);
        assert_eq!(topology.layout().kind, LayoutKind::Empty);
        assert_eq!(topology.monitor_of(5), None);
    }

    #[test]
    fn test_disconnect_behaves_like_removal() {
        let topology = topology();
        topology.add_monitor(&spec(1, 0.0)).unwrap();
        topology.add_monitor(&spec(2, 1920.0)).unwrap();
        topology.route_window(7, 1).unwrap();

        let change = topology.update_monitor(&spec(1, 0.0).disconnected()).unwrap();
        assert_eq!(change.primary, Some(2));
        assert_eq!(topology.monitor_of(7), Some(2));
        assert_eq!(topology.layout().connected, 1);
        assert_eq!(topology.len(), 2);
    }

    #[test]
    fn test_concurrent_add_of_same_monitor_updates_in_place() {
        let topology = topology();
        let mut rx = topology.subscribe();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let topology = &topology;
                scope.spawn(move || {
                    topology.add_monitor(&spec(1, 0.0)).unwrap();
                    if worker == 0 {
                        topology.assign_workspace(1, 3).unwrap();
                    }
                });
            }
        });

        assert_eq!(topology.len(), 1);
        assert_eq!(topology.primary_id(), Some(1));
        // Later adds went through the update path and kept the workspace.
        assert_eq!(topology.get(1).unwrap().workspaces, vec![3]);
        let elections = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, TopologyEvent::PrimaryChanged { .. }))
            .count();
        assert_eq!(elections, 1);
    }

    #[test]
    fn test_unknown_monitor_errors() {
        let topology = topology();
        assert!(topology.remove_monitor(9).unwrap_err().is_not_found());
        assert!(topology.update_monitor(&spec(9, 0.0)).unwrap_err().is_not_found());
        assert!(topology.route_window(1, 9).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_strategy() {
        let topology = topology();
        assert_eq!(topology.strategy_name(), BALANCED);
        topology.set_strategy(PRIMARY_FOCUSED).unwrap();
        assert_eq!(topology.strategy_name(), PRIMARY_FOCUSED);
        assert!(topology.set_strategy("random").unwrap_err().is_not_found());
        assert_eq!(topology.strategies().len(), 5);
    }

    #[test]
    fn test_detect_reconciles() {
        let topology = topology();
        let binding = MockBinding::new();
        binding.add_monitor(spec(1, 0.0));
        binding.add_monitor(spec(2, 1920.0));
        topology.detect(&binding).unwrap();
        assert_eq!(topology.len(), 2);

        binding.remove_monitor(1);
        let change = topology.detect(&binding).unwrap();
        assert_eq!(topology.len(), 1);
        assert_eq!(change.primary, Some(2));
    }

    #[tokio::test]
    async fn test_distribute_routes_windows() {
        use crate::placement::binding::WindowSpec;
        use crate::placement::geometry::Rect;

        let topology = topology();
        topology.add_monitor(&spec(1, 0.0)).unwrap();
        topology.add_monitor(&spec(2, 1920.0)).unwrap();
        let windows: Vec<Window> = (1..=4)
            .map(|id| Window::from_spec(&WindowSpec::new(id, "app", Rect::new(0.0, 0.0, 10.0, 10.0))))
            .collect();

        let assignment = topology.distribute_at(&windows, 12).await.unwrap();
        assert_eq!(assignment.len(), 4);
        assert_eq!(topology.windows_on(1), vec![1, 3]);
        assert_eq!(topology.windows_on(2), vec![2, 4]);
    }
}
