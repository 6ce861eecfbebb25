//! Snap zone definitions and the built-in catalog.
//!
//! Zone rectangles are expressed in percentages `[0, 100]` of the monitor
//! frame. `area` is where a snapped window ends up and, by default, the
//! rectangle the cursor distance is measured against. An optional `trigger`
//! replaces it for that measurement only, so built-in edge and corner zones
//! can react to a thin strip along the screen edge.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::actions::WindowAction;
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;
use crate::placement::registry::Window;

/// Zone category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneKind {
    Edge,
    Corner,
    Center,
    #[default]
    Custom,
    Advisor,
}

/// Filters restricting which windows a zone accepts. Empty means any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneConditions {
    /// Applications the zone applies to (case-insensitive).
    pub apps: Vec<String>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
}

impl ZoneConditions {
    /// Returns `true` if `window` satisfies every condition.
    #[must_use]
    pub fn accepts(&self, window: &Window) -> bool {
        if !self.apps.is_empty() && !self.apps.iter().any(|app| app.eq_ignore_ascii_case(&window.app)) {
            return false;
        }
        if self.min_width.is_some_and(|min| window.frame.width < min) {
            return false;
        }
        if self.min_height.is_some_and(|min| window.frame.height < min) {
            return false;
        }
        true
    }
}

/// Step run when a window is snapped into a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ZoneAction {
    /// Resize the window to the zone's resolved area.
    Fit,
    Focus,
    Maximize,
    Tag { tag: String },
}

impl ZoneAction {
    /// Translates the step into a window action for a zone resolved to `frame`.
    #[must_use]
    pub fn to_window_action(&self, frame: Rect) -> WindowAction {
        match self {
            Self::Fit => WindowAction::SetFrame { frame },
            Self::Focus => WindowAction::Focus,
            Self::Maximize => WindowAction::Maximize,
            Self::Tag { tag } => WindowAction::AddTag { tag: tag.clone() },
        }
    }
}

const fn default_priority() -> u32 { 1 }

const fn default_enabled() -> bool { true }

fn default_actions() -> Vec<ZoneAction> { vec![ZoneAction::Fit] }

/// A target rectangle a dragged window can be snapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapZone {
    pub id: String,
    #[serde(default)]
    pub kind: ZoneKind,
    /// Destination rectangle in percent of the monitor frame.
    pub area: Rect,
    /// Optional hot region in percent of the monitor frame. Cursor distance
    /// is measured against it instead of `area`; absent means `area`.
    #[serde(default)]
    pub trigger: Option<Rect>,
    /// Magnetic zones attract from further away.
    #[serde(default)]
    pub magnetic: bool,
    /// Lower values rank higher; at least 1.
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: ZoneConditions,
    #[serde(default = "default_actions")]
    pub actions: Vec<ZoneAction>,
}

impl SnapZone {
    /// Creates an enabled zone that fits the window to `area`.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ZoneKind, area: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            area,
            trigger: None,
            magnetic: false,
            priority: 1,
            enabled: true,
            conditions: ZoneConditions::default(),
            actions: default_actions(),
        }
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: Rect) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn magnetic(mut self) -> Self {
        self.magnetic = true;
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<ZoneAction>) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ZoneConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Destination rectangle on a monitor with the given frame.
    #[must_use]
    pub fn resolve(&self, monitor_frame: &Rect) -> Rect { Rect::from_percent(&self.area, monitor_frame) }

    /// Hot region on a monitor with the given frame.
    #[must_use]
    pub fn resolve_trigger(&self, monitor_frame: &Rect) -> Rect {
        Rect::from_percent(self.trigger.as_ref().unwrap_or(&self.area), monitor_frame)
    }

    /// Checks priority and percentage bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] describing the problem.
    pub fn validate(&self) -> PlacementResult<()> {
        if self.id.trim().is_empty() {
            return Err(PlacementError::invalid_config("snap zone id must not be empty"));
        }
        if self.priority == 0 {
            return Err(PlacementError::invalid_config(format!(
                "snap zone '{}' priority must be at least 1",
                self.id
            )));
        }
        for rect in std::iter::once(&self.area).chain(self.trigger.as_ref()) {
            if !is_percent_rect(rect) {
                return Err(PlacementError::invalid_config(format!(
                    "snap zone '{}' must lie within 0..100 percent",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

fn is_percent_rect(rect: &Rect) -> bool {
    let range = 0.0..=100.0;
    range.contains(&rect.x)
        && range.contains(&rect.y)
        && rect.width > 0.0
        && rect.height > 0.0
        && rect.max_x() <= 100.0
        && rect.max_y() <= 100.0
}

/// The built-in catalog: four halves, four quarters and maximize.
#[must_use]
pub fn builtin_zones() -> Vec<SnapZone> {
    let half = |id: &str, area: Rect, trigger: Rect| {
        SnapZone::new(id, ZoneKind::Edge, area).with_trigger(trigger).with_priority(2).magnetic()
    };
    let quarter = |id: &str, area: Rect, trigger: Rect| {
        SnapZone::new(id, ZoneKind::Corner, area).with_trigger(trigger).with_priority(1)
    };

    vec![
        half("left-half", Rect::new(0.0, 0.0, 50.0, 100.0), Rect::new(0.0, 15.0, 2.0, 70.0)),
        half("right-half", Rect::new(50.0, 0.0, 50.0, 100.0), Rect::new(98.0, 15.0, 2.0, 70.0)),
        half("top-half", Rect::new(0.0, 0.0, 100.0, 50.0), Rect::new(15.0, 0.0, 70.0, 2.0)),
        half("bottom-half", Rect::new(0.0, 50.0, 100.0, 50.0), Rect::new(15.0, 98.0, 70.0, 2.0)),
        quarter("top-left", Rect::new(0.0, 0.0, 50.0, 50.0), Rect::new(0.0, 0.0, 5.0, 5.0)),
        quarter("top-right", Rect::new(50.0, 0.0, 50.0, 50.0), Rect::new(95.0, 0.0, 5.0, 5.0)),
        quarter("bottom-left", Rect::new(0.0, 50.0, 50.0, 50.0), Rect::new(0.0, 95.0, 5.0, 5.0)),
        quarter("bottom-right", Rect::new(50.0, 50.0, 50.0, 50.0), Rect::new(95.0, 95.0, 5.0, 5.0)),
        SnapZone::new("maximize", ZoneKind::Center, Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_trigger(Rect::new(35.0, 35.0, 30.0, 30.0))
            .with_priority(3)
            .with_actions(vec![ZoneAction::Fit, ZoneAction::Maximize]),
    ]
}
