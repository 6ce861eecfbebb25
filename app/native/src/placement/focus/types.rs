//! Focus history records and prediction results.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::{WindowId, WorkspaceId};

/// Context key holding the workspace a window was focused on.
pub const WORKSPACE_KEY: &str = "workspace";

/// What caused a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FocusSource {
    Click,
    Keyboard,
    AltTab,
    Advisor,
    Programmatic,
}

/// One focus change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusEvent {
    pub window_id: WindowId,
    pub app: String,
    pub at: DateTime<Utc>,
    /// How long the previously focused window kept focus.
    pub previous_duration: Option<Duration>,
    pub previous_window: Option<WindowId>,
    pub context: BTreeMap<String, String>,
    pub source: FocusSource,
}

impl FocusEvent {
    /// Creates an event timestamped now.
    #[must_use]
    pub fn new(window_id: WindowId, app: impl Into<String>, source: FocusSource) -> Self {
        Self {
            window_id,
            app: app.into(),
            at: Utc::now(),
            previous_duration: None,
            previous_window: None,
            context: BTreeMap::new(),
            source,
        }
    }

    #[must_use]
    pub const fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }

    #[must_use]
    pub const fn after(mut self, previous: WindowId, duration: Option<Duration>) -> Self {
        self.previous_window = Some(previous);
        self.previous_duration = duration;
        self
    }

    #[must_use]
    pub fn on_workspace(mut self, workspace: WorkspaceId) -> Self {
        self.context.insert(WORKSPACE_KEY.to_string(), workspace.to_string());
        self
    }

    /// Workspace recorded in the context map, if any.
    #[must_use]
    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.context.get(WORKSPACE_KEY).and_then(|w| w.parse().ok())
    }

    /// Local-time-independent hour of the event (UTC).
    #[must_use]
    pub fn hour(&self) -> u32 { self.at.hour() }
}

/// A window that could receive focus next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusCandidate {
    pub id: WindowId,
    pub app: String,
}

/// What the models know about the current moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFeatures {
    pub current_window: Option<WindowId>,
    pub current_app: Option<String>,
    pub workspace_id: Option<WorkspaceId>,
    /// Hour of day (UTC, matching [`FocusEvent::hour`]).
    pub hour: u32,
    pub at: DateTime<Utc>,
    /// Windows that may be predicted.
    pub candidates: Vec<FocusCandidate>,
}

impl ContextFeatures {
    /// Context at `at` with no current window.
    #[must_use]
    pub fn new(at: DateTime<Utc>, candidates: Vec<FocusCandidate>) -> Self {
        Self {
            current_window: None,
            current_app: None,
            workspace_id: None,
            hour: at.hour(),
            at,
            candidates,
        }
    }

    #[must_use]
    pub fn with_current(mut self, window: WindowId, app: impl Into<String>) -> Self {
        self.current_window = Some(window);
        self.current_app = Some(app.into());
        self
    }

    #[must_use]
    pub const fn on_workspace(mut self, workspace: WorkspaceId) -> Self {
        self.workspace_id = Some(workspace);
        self
    }

    /// Returns `true` if `window` may be predicted.
    #[must_use]
    pub fn is_candidate(&self, window: WindowId) -> bool {
        self.candidates.iter().any(|c| c.id == window)
    }

    /// Candidate windows owned by `app` (case-insensitive).
    pub fn windows_of<'a>(&'a self, app: &'a str) -> impl Iterator<Item = WindowId> + 'a {
        self.candidates
            .iter()
            .filter(move |c| c.app.eq_ignore_ascii_case(app))
            .map(|c| c.id)
    }
}

/// A ranked guess at the next focused window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPrediction {
    pub window_id: WindowId,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reasoning: Vec<String>,
    /// Models that contributed.
    pub models: Vec<String>,
}

impl WindowPrediction {
    #[must_use]
    pub fn new(window_id: WindowId, confidence: f64, model: &str, reason: impl Into<String>) -> Self {
        Self {
            window_id,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: vec![reason.into()],
            models: vec![model.to_string()],
        }
    }
}
