//! Window registry - the authoritative set of managed windows.
//!
//! All window records live in one map behind a single `RwLock`. Queries take
//! the read lock; every mutation (including focus changes, which touch more
//! than one record) happens inside one write-lock critical section.

mod window;

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
pub use window::{Window, WindowFlags};

use super::error::{EntityKind, PlacementError, PlacementResult};
use super::{MonitorId, WindowId, WorkspaceId};

/// Thread-safe store of window records.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: RwLock<HashMap<WindowId, Window>>,
}

impl WindowRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Inserts or replaces a window, returning the previous record.
    ///
    /// A replaced window keeps its tags and creation time.
    pub fn insert(&self, mut window: Window) -> Option<Window> {
        let mut windows = self.windows.write();
        if let Some(existing) = windows.get(&window.id) {
            window.created_at = existing.created_at;
            if window.tags.is_empty() {
                window.tags.clone_from(&existing.tags);
            }
            if existing.flags.focused {
                window.flags.focused = true;
                window.last_focused_at = existing.last_focused_at;
            }
        }
        windows.insert(window.id, window)
    }

    /// Inserts a window unless its id is already registered.
    ///
    /// Returns `false`, leaving the existing record untouched, for a known id.
    pub fn insert_new(&self, window: Window) -> bool {
        let mut windows = self.windows.write();
        if windows.contains_key(&window.id) {
            return false;
        }
        windows.insert(window.id, window);
        true
    }

    /// Applies `f` to a window under the write lock and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the window is unknown.
    pub fn update<R>(&self, id: WindowId, f: impl FnOnce(&mut Window) -> R) -> PlacementResult<R> {
        let mut windows = self.windows.write();
        let window = windows
            .get_mut(&id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, id))?;
        Ok(f(window))
    }

    /// Removes a window.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the window is unknown.
    pub fn remove(&self, id: WindowId) -> PlacementResult<Window> {
        self.windows
            .write()
            .remove(&id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, id))
    }

    /// Returns a copy of a window.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the window is unknown.
    pub fn get(&self, id: WindowId) -> PlacementResult<Window> {
        self.windows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| PlacementError::not_found(EntityKind::Window, id))
    }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool { self.windows.read().contains_key(&id) }

    /// All windows, ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Window> { self.list_where(|_| true) }

    /// Windows matching `predicate`, ordered by id.
    #[must_use]
    pub fn list_where(&self, predicate: impl Fn(&Window) -> bool) -> Vec<Window> {
        let mut windows: Vec<Window> =
            self.windows.read().values().filter(|w| predicate(w)).cloned().collect();
        windows.sort_unstable_by_key(|w| w.id);
        windows
    }

    #[must_use]
    pub fn ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.windows.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The currently focused window, if any.
    #[must_use]
    pub fn focused(&self) -> Option<Window> {
        self.windows.read().values().find(|w| w.flags.focused).cloned()
    }

    /// Focuses a window, clearing focus everywhere else.
    ///
    /// Returns the previously focused window id. The target is also
    /// un-minimized.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the window is unknown; no other
    /// window loses focus in that case.
    pub fn focus(&self, id: WindowId) -> PlacementResult<Option<WindowId>> {
        let mut windows = self.windows.write();
        if !windows.contains_key(&id) {
            return Err(PlacementError::not_found(EntityKind::Window, id));
        }

        let mut previous = None;
        for window in windows.values_mut() {
            if window.flags.focused && window.id != id {
                previous = Some(window.id);
            }
            window.flags.focused = false;
        }

        if let Some(window) = windows.get_mut(&id) {
            window.flags.focused = true;
            window.flags.minimized = false;
            window.flags.visible = true;
            window.last_focused_at = Some(Utc::now());
        }

        Ok(previous)
    }

    /// Clears focus from whichever window holds it.
    pub fn blur(&self) -> Option<WindowId> {
        let mut windows = self.windows.write();
        let mut previous = None;
        for window in windows.values_mut().filter(|w| w.flags.focused) {
            window.flags.focused = false;
            previous = Some(window.id);
        }
        previous
    }

    #[must_use]
    pub fn windows_on_monitor(&self, monitor: MonitorId) -> Vec<Window> {
        self.list_where(|w| w.monitor_id == Some(monitor))
    }

    #[must_use]
    pub fn windows_in_workspace(&self, workspace: WorkspaceId) -> Vec<Window> {
        self.list_where(|w| w.workspace_id == workspace)
    }

    /// Assigns a window to a monitor.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] if the window is unknown.
    pub fn set_monitor(&self, id: WindowId, monitor: Option<MonitorId>) -> PlacementResult<()> {
        self.update(id, |w| w.monitor_id = monitor)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.windows.read().len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.windows.read().is_empty() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::placement::binding::WindowSpec;
    use crate::placement::geometry::Rect;

    fn window(id: WindowId, app: &str) -> Window {
        Window::from_spec(&WindowSpec::new(id, app, Rect::new(0.0, 0.0, 800.0, 600.0)))
    }

    fn registry_with(ids: &[WindowId]) -> WindowRegistry {
        let registry = WindowRegistry::new();
        for &id in ids {
            registry.insert(window(id, "app"));
        }
        registry
    }

    #[test]
    fn test_insert_get_remove() {
        let registry = registry_with(&[1, 2]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().id, 1);

        registry.remove(1).unwrap();
        assert!(registry.get(1).unwrap_err().is_not_found());
        assert!(registry.remove(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_insert_new_keeps_existing_record() {
        let registry = registry_with(&[1]);
        registry.update(1, |w| w.flags.maximized = true).unwrap();

        assert!(!registry.insert_new(window(1, "other")));
        let existing = registry.get(1).unwrap();
        assert!(existing.flags.maximized);
        assert_eq!(existing.app, "app");

        assert!(registry.insert_new(window(2, "other")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_replace_keeps_tags_and_focus() {
        let registry = registry_with(&[1]);
        registry.update(1, |w| w.tags.insert("pinned".to_string())).unwrap();
        registry.focus(1).unwrap();

        registry.insert(window(1, "app"));
        let window = registry.get(1).unwrap();
        assert!(window.has_tag("pinned"));
        assert!(window.flags.focused);
    }

    #[test]
    fn test_focus_is_exclusive() {
        let registry = registry_with(&[1, 2, 3]);
        assert_eq!(registry.focus(1).unwrap(), None);
        assert_eq!(registry.focus(2).unwrap(), Some(1));

        let focused: Vec<_> = registry.list_where(|w| w.flags.focused);
        assert_eq!(focused.len(), 1);
        assert_eq!(focused[0].id, 2);
        assert!(registry.get(2).unwrap().last_focused_at.is_some());
    }

    #[test]
    fn test_focus_unknown_keeps_current() {
        let registry = registry_with(&[1]);
        registry.focus(1).unwrap();
        assert!(registry.focus(42).unwrap_err().is_not_found());
        assert_eq!(registry.focused().map(|w| w.id), Some(1));
    }

    #[test]
    fn test_focus_unminimizes() {
        let registry = registry_with(&[1]);
        registry.update(1, |w| w.flags.minimized = true).unwrap();
        registry.focus(1).unwrap();
        assert!(!registry.get(1).unwrap().flags.minimized);
    }

    #[test]
    fn test_concurrent_focus_keeps_single_focused() {
        let registry = Arc::new(registry_with(&(1..=16).collect::<Vec<_>>()));
        let handles: Vec<_> = (1..=16)
            .map(|id| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        registry.focus(id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.list_where(|w| w.flags.focused).len(), 1);
    }

    #[test]
    fn test_monitor_and_workspace_queries() {
        let registry = registry_with(&[1, 2, 3]);
        registry.set_monitor(1, Some(10)).unwrap();
        registry.set_monitor(3, Some(10)).unwrap();
        registry.update(2, |w| w.workspace_id = 4).unwrap();

        let on_monitor: Vec<_> = registry.windows_on_monitor(10).iter().map(|w| w.id).collect();
        assert_eq!(on_monitor, vec![1, 3]);
        assert_eq!(registry.windows_in_workspace(4).len(), 1);
        assert!(registry.set_monitor(9, None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_blur() {
        let registry = registry_with(&[1, 2]);
        registry.focus(2).unwrap();
        assert_eq!(registry.blur(), Some(2));
        assert!(registry.focused().is_none());
    }
}
