//! Shared lifecycle contract for background components.
//!
//! Every component that owns background work (rules workers, the animation
//! frame loop, model retraining, the orchestrator's polling loop) implements
//! [`Lifecycle`] and delegates the bookkeeping to a [`TaskGroup`]:
//!
//! - `start()` on a running component returns [`PlacementError::AlreadyRunning`]
//! - `stop()` on a stopped component is a no-op
//! - stopping is cooperative: loops observe the [`StopSignal`] on their next
//!   tick and exit, in-flight work is allowed to finish

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::{PlacementError, PlacementResult};

// ============================================================================
// Lifecycle Trait
// ============================================================================

/// Snapshot of a component's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether background tasks are running.
    pub running: bool,
    /// When the component was last started.
    pub started_at: Option<DateTime<Utc>>,
    /// Number of background tasks spawned by the current run.
    pub tasks: usize,
}

/// Common contract for components with background work.
pub trait Lifecycle {
    /// Stable component name used in logs and status reports.
    fn name(&self) -> &'static str;

    /// Prepares internal state before the first start.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot be prepared.
    fn initialize(&self) -> PlacementResult<()> { Ok(()) }

    /// Spawns the component's background tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::AlreadyRunning`] if already started, or
    /// [`PlacementError::NoRuntime`] when called outside a Tokio runtime.
    fn start(&self) -> PlacementResult<()>;

    /// Signals background tasks to stop. Idempotent.
    fn stop(&self);

    /// Returns the current lifecycle status.
    fn status(&self) -> ComponentStatus;
}

// ============================================================================
// Stop Signal
// ============================================================================

/// Cooperative cancellation signal handed to background loops.
#[derive(Debug, Clone)]
pub struct StopSignal {
    receiver: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolves once a stop has been requested (or the group was dropped).
    pub async fn stopped(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                return;
            }
        }
    }

    /// Returns `true` if a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }
}

// ============================================================================
// Task Group
// ============================================================================

/// Bookkeeping for one component's background tasks.
///
/// Each run gets a fresh stop channel so a quick stop/start cycle can never
/// revive loops that belong to the previous run.
#[derive(Debug)]
pub struct TaskGroup {
    name: &'static str,
    running: AtomicBool,
    stop: Mutex<Option<watch::Sender<bool>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    started_at: Mutex<Option<DateTime<Utc>>>,
}

impl TaskGroup {
    /// Creates an idle task group.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: AtomicBool::new(false),
            stop: Mutex::new(None),
            handles: Mutex::new(Vec::new()),
            started_at: Mutex::new(None),
        }
    }

    /// Marks the group as running and returns the stop signal for this run.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NoRuntime`] outside a Tokio runtime and
    /// [`PlacementError::AlreadyRunning`] if the group is already running.
    pub fn begin(&self) -> PlacementResult<StopSignal> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(PlacementError::NoRuntime(self.name.to_string()));
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PlacementError::AlreadyRunning(self.name.to_string()));
        }

        let (sender, receiver) = watch::channel(false);
        *self.stop.lock() = Some(sender);
        *self.started_at.lock() = Some(Utc::now());
        self.handles.lock().clear();

        tracing::debug!("{}: started", self.name);
        Ok(StopSignal { receiver })
    }

    /// Spawns a background task that belongs to the current run.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.handles.lock().push(handle);
    }

    /// Requests all tasks of the current run to stop.
    ///
    /// Returns `false` when the group was not running.
    pub fn halt(&self) -> bool {
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }

        if let Some(sender) = self.stop.lock().take() {
            let _ = sender.send(true);
        }
        // Tasks exit on their next iteration; the handles are simply detached.
        self.handles.lock().clear();

        tracing::debug!("{}: stop requested", self.name);
        true
    }

    /// Returns whether the group is running.
    #[must_use]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::Acquire) }

    /// Builds a status snapshot for this group.
    #[must_use]
    pub fn status(&self) -> ComponentStatus {
        let running = self.is_running();
        ComponentStatus {
            name: self.name.to_string(),
            running,
            started_at: if running { *self.started_at.lock() } else { None },
            tasks: self.handles.lock().iter().filter(|h| !h.is_finished()).count(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
