//! Window records held by the registry.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::placement::binding::WindowSpec;
use crate::placement::geometry::Rect;
use crate::placement::{MonitorId, WindowId, WorkspaceId};

/// State flags of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowFlags {
    pub focused: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub visible: bool,
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self {
            focused: false,
            minimized: false,
            maximized: false,
            visible: true,
        }
    }
}

/// A managed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: WindowId,
    pub title: String,
    /// Owning application name.
    pub app: String,
    pub frame: Rect,
    /// Frame before the window was maximized, restored on unmaximize.
    #[serde(skip)]
    pub restore_frame: Option<Rect>,
    pub workspace_id: WorkspaceId,
    pub monitor_id: Option<MonitorId>,
    pub flags: WindowFlags,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub last_focused_at: Option<DateTime<Utc>>,
}

impl Window {
    /// Builds a record from the display server's description.
    #[must_use]
    pub fn from_spec(spec: &WindowSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title.clone(),
            app: spec.app.clone(),
            frame: spec.frame,
            restore_frame: None,
            workspace_id: spec.workspace_id,
            monitor_id: spec.monitor_id,
            flags: WindowFlags {
                minimized: spec.minimized,
                visible: !spec.minimized,
                ..WindowFlags::default()
            },
            tags: BTreeSet::new(),
            created_at: Utc::now(),
            last_focused_at: None,
        }
    }

    /// Whether the window takes part in tiling.
    #[must_use]
    pub const fn is_tileable(&self) -> bool { self.flags.visible && !self.flags.minimized }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool { self.tags.contains(tag) }
}
