//! Window actions emitted by rules and snap zones.

use std::fmt;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::WindowId;
use super::error::PlacementResult;
use super::geometry::Rect;

/// A single operation applied to one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WindowAction {
    /// Move the window's origin.
    Move { x: f64, y: f64 },
    /// Resize the window, keeping its origin.
    Resize { width: f64, height: f64 },
    /// Set origin and size at once.
    SetFrame { frame: Rect },
    /// Re-tile the window's workspace, optionally forcing an algorithm.
    Tile {
        #[serde(default)]
        algorithm: Option<String>,
    },
    /// Snap the window into a zone of its monitor.
    Snap { zone: String },
    Focus,
    Minimize,
    Maximize,
    Close,
    MoveToWorkspace { workspace: u32 },
    MoveToMonitor { monitor: u32 },
    AddTag { tag: String },
    RemoveTag { tag: String },
}

impl WindowAction {
    /// Short name used in logs and execution records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Resize { .. } => "resize",
            Self::SetFrame { .. } => "setFrame",
            Self::Tile { .. } => "tile",
            Self::Snap { .. } => "snap",
            Self::Focus => "focus",
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
            Self::Close => "close",
            Self::MoveToWorkspace { .. } => "moveToWorkspace",
            Self::MoveToMonitor { .. } => "moveToMonitor",
            Self::AddTag { .. } => "addTag",
            Self::RemoveTag { .. } => "removeTag",
        }
    }
}

impl fmt::Display for WindowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Applies [`WindowAction`]s on behalf of rules and snap zones.
pub trait ActionExecutor: Send + Sync {
    /// Executes one action against a window.
    fn execute<'a>(
        &'a self,
        window: WindowId,
        action: &'a WindowAction,
    ) -> BoxFuture<'a, PlacementResult<()>>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serde_shape() {
        let action: WindowAction =
            serde_json::from_str(r#"{"type": "moveToMonitor", "monitor": 2}"#).unwrap();
        assert_eq!(action, WindowAction::MoveToMonitor { monitor: 2 });

        let action: WindowAction = serde_json::from_str(r#"{"type": "maximize"}"#).unwrap();
        assert_eq!(action.name(), "maximize");

        let action: WindowAction = serde_json::from_str(r#"{"type": "tile"}"#).unwrap();
        assert_eq!(action, WindowAction::Tile { algorithm: None });
    }
}
