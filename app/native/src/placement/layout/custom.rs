//! User-defined layouts selected by workspace context.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::registry::Window;

/// Hours of the day, start inclusive, end exclusive. Wraps past midnight
/// when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    #[must_use]
    pub const fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

/// Conditions under which a custom layout applies. Absent fields always match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConditions {
    pub min_windows: Option<usize>,
    pub max_windows: Option<usize>,
    /// Application owning the most windows, compared case-insensitively.
    pub dominant_app: Option<String>,
    pub hours: Option<HourWindow>,
}

/// A named layout bound to an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomLayout {
    pub name: String,
    /// Name of a registered tiling algorithm.
    pub algorithm: String,
    #[serde(default)]
    pub conditions: LayoutConditions,
}

/// What the selection policy knows about the workspace being tiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub window_count: usize,
    pub dominant_app: Option<String>,
    pub hour: u32,
}

impl SelectionContext {
    /// Derives the context from the windows being tiled.
    #[must_use]
    pub fn from_windows(windows: &[Window], hour: u32) -> Self {
        Self {
            window_count: windows.len(),
            dominant_app: dominant_app(windows),
            hour,
        }
    }
}

/// Application with the most windows; ties resolve to the alphabetically first.
#[must_use]
pub fn dominant_app(windows: &[Window]) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for window in windows {
        *counts.entry(window.app.to_lowercase()).or_default() += 1;
    }
    let mut best: Option<(String, usize)> = None;
    for (app, count) in counts {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((app, count));
        }
    }
    best.map(|(app, _)| app)
}

impl CustomLayout {
    /// Whether the layout applies to `context`.
    #[must_use]
    pub fn matches(&self, context: &SelectionContext) -> bool {
        let c = &self.conditions;
        if c.min_windows.is_some_and(|min| context.window_count < min) {
            return false;
        }
        if c.max_windows.is_some_and(|max| context.window_count > max) {
            return false;
        }
        if let Some(app) = &c.dominant_app {
            let matches = context
                .dominant_app
                .as_deref()
                .is_some_and(|dominant| dominant.eq_ignore_ascii_case(app));
            if !matches {
                return false;
            }
        }
        if c.hours.is_some_and(|hours| !hours.contains(context.hour)) {
            return false;
        }
        true
    }
}
