//! Named snapshots of a workspace's window geometry.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::placement::error::{EntityKind, PlacementError, PlacementResult};
use crate::placement::geometry::Rect;
use crate::placement::registry::Window;
use crate::placement::{WindowId, WorkspaceId};

/// One window of a saved layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub window_id: WindowId,
    pub app: String,
    pub title: String,
    pub frame: Rect,
}

/// Window geometry of a workspace at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLayout {
    pub name: String,
    pub workspace_id: WorkspaceId,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<LayoutEntry>,
}

impl SavedLayout {
    /// Captures the frames of `windows`.
    #[must_use]
    pub fn capture(name: impl Into<String>, workspace_id: WorkspaceId, windows: &[Window]) -> Self {
        Self {
            name: name.into(),
            workspace_id,
            created_at: Utc::now(),
            entries: windows
                .iter()
                .map(|w| LayoutEntry {
                    window_id: w.id,
                    app: w.app.clone(),
                    title: w.title.clone(),
                    frame: w.frame,
                })
                .collect(),
        }
    }

    /// Pairs each entry with one of `windows`.
    ///
    /// Windows are matched by id first, then by application and title, then
    /// by application alone. Each window is used at most once; entries
    /// without a match are skipped.
    #[must_use]
    pub fn resolve(&self, windows: &[Window]) -> Vec<(WindowId, Rect)> {
        let mut claimed = BTreeSet::new();
        let mut placements = Vec::new();
        let mut pending = Vec::new();

        for entry in &self.entries {
            if windows.iter().any(|w| w.id == entry.window_id) && claimed.insert(entry.window_id) {
                placements.push((entry.window_id, entry.frame));
            } else {
                pending.push(entry);
            }
        }

        let same_app = |w: &Window, entry: &LayoutEntry| w.app.eq_ignore_ascii_case(&entry.app);
        let mut unmatched = Vec::new();
        for entry in pending {
            let found = windows
                .iter()
                .find(|w| !claimed.contains(&w.id) && same_app(w, entry) && w.title == entry.title);
            match found {
                Some(window) => {
                    claimed.insert(window.id);
                    placements.push((window.id, entry.frame));
                }
                None => unmatched.push(entry),
            }
        }
        for entry in unmatched {
            if let Some(window) = windows.iter().find(|w| !claimed.contains(&w.id) && same_app(w, entry)) {
                claimed.insert(window.id);
                placements.push((window.id, entry.frame));
            }
        }
        placements
    }
}

/// Saved layouts by name.
#[derive(Debug, Default)]
pub(super) struct LayoutStore {
    layouts: RwLock<BTreeMap<String, SavedLayout>>,
}

impl LayoutStore {
    /// Stores a layout, replacing one with the same name.
    pub fn save(&self, layout: SavedLayout) -> PlacementResult<Option<SavedLayout>> {
        if layout.name.trim().is_empty() {
            return Err(PlacementError::invalid_config("layout name must not be empty"));
        }
        Ok(self.layouts.write().insert(layout.name.clone(), layout))
    }

    pub fn get(&self, name: &str) -> PlacementResult<SavedLayout> {
        self.layouts
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Layout, name))
    }

    pub fn remove(&self, name: &str) -> PlacementResult<SavedLayout> {
        self.layouts
            .write()
            .remove(name)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Layout, name))
    }

    pub fn list(&self) -> Vec<SavedLayout> { self.layouts.read().values().cloned().collect() }

    pub fn len(&self) -> usize { self.layouts.read().len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::binding::WindowSpec;

    fn window(id: WindowId, app: &str, title: &str) -> Window {
        Window::from_spec(
            &WindowSpec::new(id, app, Rect::new(0.0, 0.0, 100.0, 100.0)).with_title(title),
        )
    }

    fn layout() -> SavedLayout {
        let mut editor = window(1, "editor", "main.rs");
        editor.frame = Rect::new(0.0, 0.0, 960.0, 1080.0);
        let mut terminal = window(2, "terminal", "zsh");
        terminal.frame = Rect::new(960.0, 0.0, 960.0, 1080.0);
        SavedLayout::capture("coding", 1, &[editor, terminal])
    }

    #[test]
    fn test_resolve_by_id() {
        let placements = layout().resolve(&[window(2, "terminal", "zsh"), window(1, "editor", "main.rs")]);
        assert_eq!(placements.len(), 2);
        assert!(placements.contains(&(1, Rect::new(0.0, 0.0, 960.0, 1080.0))));
    }

    #[test]
    fn test_resolve_falls_back_to_app_and_title() {
        // Same apps, new ids after a restart.
        let windows = [window(11, "terminal", "other"), window(12, "Terminal", "zsh"), window(10, "editor", "x")];
        let placements = layout().resolve(&windows);
        assert!(placements.contains(&(12, Rect::new(960.0, 0.0, 960.0, 1080.0))));
        assert!(placements.contains(&(10, Rect::new(0.0, 0.0, 960.0, 1080.0))));
        assert_eq!(placements.len(), 2);
    }

    #[test]
    fn test_resolve_skips_missing_apps() {
        let placements = layout().resolve(&[window(5, "browser", "docs")]);
        assert!(placements.is_empty());
    }

    #[test]
    fn test_store_rejects_empty_name() {
        let store = LayoutStore::default();
        let mut saved = layout();
        saved.name = "  ".to_string();
        assert!(store.save(saved).is_err());
        assert!(store.get("coding").unwrap_err().is_not_found());
    }

    #[test]
    fn test_store_replace_and_remove() {
        let store = LayoutStore::default();
        assert!(store.save(layout()).unwrap().is_none());
        assert!(store.save(layout()).unwrap().is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove("coding").unwrap().entries.len(), 2);
        assert!(store.list().is_empty());
    }
}
