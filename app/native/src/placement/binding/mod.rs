//! Display-server binding boundary.
//!
//! The placement engine never talks to a compositor directly. A
//! [`DisplayBinding`] reports the live windows and monitors, optionally streams
//! lifecycle events, and executes primitive commands. [`MockBinding`] is an
//! in-memory implementation used by tests and `tessel simulate`.

mod mock;

pub use mock::MockBinding;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::PlacementResult;
use super::focus::FocusSource;
use super::geometry::{Point, Rect, Size};
use super::{MonitorId, WindowId, WorkspaceId};

// ============================================================================
// Wire Types
// ============================================================================

/// A window as reported by the display server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WindowSpec {
    pub id: WindowId,
    pub title: String,
    pub app: String,
    pub frame: Rect,
    pub workspace_id: WorkspaceId,
    #[serde(default)]
    pub monitor_id: Option<MonitorId>,
    #[serde(default)]
    pub minimized: bool,
}

impl WindowSpec {
    /// Creates a visible window spec on workspace 1 with no monitor assigned.
    #[must_use]
    pub fn new(id: WindowId, app: impl Into<String>, frame: Rect) -> Self {
        let app = app.into();
        Self {
            id,
            title: app.clone(),
            app,
            frame,
            workspace_id: 1,
            monitor_id: None,
            minimized: false,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn on_workspace(mut self, workspace: WorkspaceId) -> Self {
        self.workspace_id = workspace;
        self
    }

    #[must_use]
    pub const fn on_monitor(mut self, monitor: MonitorId) -> Self {
        self.monitor_id = Some(monitor);
        self
    }
}

/// A monitor as reported by the display server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSpec {
    pub id: MonitorId,
    pub name: String,
    pub resolution: Size,
    pub position: Point,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: u16,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_connected")]
    pub is_connected: bool,
}

const fn default_scale() -> f64 { 1.0 }

const fn default_connected() -> bool { true }

impl MonitorSpec {
    /// Creates a connected, non-primary monitor.
    #[must_use]
    pub fn new(id: MonitorId, name: impl Into<String>, resolution: Size, position: Point) -> Self {
        Self {
            id,
            name: name.into(),
            resolution,
            position,
            scale: 1.0,
            rotation: 0,
            is_primary: false,
            is_connected: true,
        }
    }

    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    #[must_use]
    pub const fn rotated(mut self, rotation: u16) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn disconnected(mut self) -> Self {
        self.is_connected = false;
        self
    }
}

/// Lifecycle events emitted by the display server.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    WindowCreated(WindowSpec),
    WindowMoved { id: WindowId, origin: Point },
    WindowResized { id: WindowId, size: Size },
    WindowFocused { id: WindowId, source: FocusSource },
    WindowMinimized { id: WindowId },
    WindowClosed { id: WindowId },
    MonitorAdded(MonitorSpec),
    MonitorChanged(MonitorSpec),
    MonitorRemoved { id: MonitorId },
}

impl DisplayEvent {
    /// The window this event is about, if any.
    #[must_use]
    pub const fn window_id(&self) -> Option<WindowId> {
        match self {
            Self::WindowCreated(spec) => Some(spec.id),
            Self::WindowMoved { id, .. }
            | Self::WindowResized { id, .. }
            | Self::WindowFocused { id, .. }
            | Self::WindowMinimized { id }
            | Self::WindowClosed { id } => Some(*id),
            Self::MonitorAdded(_) | Self::MonitorChanged(_) | Self::MonitorRemoved { .. } => None,
        }
    }
}

/// Primitive commands accepted by the display server.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Move { id: WindowId, origin: Point },
    Resize { id: WindowId, size: Size },
    SetFrame { id: WindowId, frame: Rect },
    Focus { id: WindowId },
    Minimize { id: WindowId },
    Maximize { id: WindowId, frame: Rect },
    Close { id: WindowId },
}

impl DisplayCommand {
    /// The window the command targets.
    #[must_use]
    pub const fn window_id(&self) -> WindowId {
        match self {
            Self::Move { id, .. }
            | Self::Resize { id, .. }
            | Self::SetFrame { id, .. }
            | Self::Focus { id }
            | Self::Minimize { id }
            | Self::Maximize { id, .. }
            | Self::Close { id } => *id,
        }
    }
}

// ============================================================================
// Binding Trait
// ============================================================================

/// Connection to a display server.
pub trait DisplayBinding: Send + Sync {
    /// Executes a primitive command.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Binding`](super::error::PlacementError::Binding)
    /// when the display server rejects the command.
    fn execute(&self, command: DisplayCommand) -> PlacementResult<()>;

    /// Lists the windows currently managed by the display server.
    ///
    /// # Errors
    ///
    /// Returns an error if the display server cannot be queried.
    fn windows(&self) -> PlacementResult<Vec<WindowSpec>>;

    /// Lists the monitors currently known to the display server.
    ///
    /// # Errors
    ///
    /// Returns an error if the display server cannot be queried.
    fn monitors(&self) -> PlacementResult<Vec<MonitorSpec>>;

    /// Hands out the event stream. Only the first call returns `Some`.
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<DisplayEvent>> { None }
}
