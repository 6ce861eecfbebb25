//! Monitor records and topology layout classification.

use serde::Serialize;

use crate::placement::binding::MonitorSpec;
use crate::placement::geometry::{Point, Rect, Size};
use crate::placement::{MonitorId, WorkspaceId};

/// A tracked physical display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    pub resolution: Size,
    pub position: Point,
    pub scale: f64,
    /// Rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u16,
    pub is_primary: bool,
    pub is_connected: bool,
    pub workspaces: Vec<WorkspaceId>,
}

impl Monitor {
    /// Builds a record from the display server's description.
    ///
    /// Rotations other than the four right angles are snapped to 0.
    #[must_use]
    pub fn from_spec(spec: &MonitorSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name.clone(),
            resolution: spec.resolution,
            position: spec.position,
            scale: if spec.scale > 0.0 { spec.scale } else { 1.0 },
            rotation: match spec.rotation {
                90 | 180 | 270 => spec.rotation,
                _ => 0,
            },
            is_primary: spec.is_primary,
            is_connected: spec.is_connected,
            workspaces: Vec::new(),
        }
    }

    /// Frame of the monitor in global coordinates, honouring rotation.
    #[must_use]
    pub fn frame(&self) -> Rect {
        let (width, height) = if self.is_rotated() {
            (self.resolution.height, self.resolution.width)
        } else {
            (self.resolution.width, self.resolution.height)
        };
        Rect::new(self.position.x, self.position.y, width, height)
    }

    /// Whether the monitor is turned on its side.
    #[must_use]
    pub const fn is_rotated(&self) -> bool { matches!(self.rotation, 90 | 270) }

    /// Whether the monitor is taller than wide once rotation is applied.
    #[must_use]
    pub fn is_portrait(&self) -> bool {
        let frame = self.frame();
        frame.height > frame.width
    }

    #[must_use]
    pub fn area(&self) -> f64 { self.resolution.area() }
}

/// Coarse classification of the connected monitors' arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    Empty,
    Single,
    Dual,
    Triple,
    /// Four or more monitors in a single row.
    Horizontal,
    Multi,
}

impl LayoutKind {
    /// Classifies a set of connected monitors.
    #[must_use]
    pub fn classify(monitors: &[&Monitor]) -> Self {
        match monitors.len() {
            0 => Self::Empty,
            1 => Self::Single,
            2 => Self::Dual,
            3 => Self::Triple,
            _ => {
                let first_y = monitors[0].position.y;
                let same_row =
                    monitors.iter().all(|m| (m.position.y - first_y).abs() < f64::EPSILON);
                if same_row { Self::Horizontal } else { Self::Multi }
            }
        }
    }
}

/// Derived geometry of the connected monitors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyLayout {
    pub kind: LayoutKind,
    /// Union of all connected monitor frames; `None` when nothing is connected.
    pub bounds: Option<Rect>,
    pub connected: usize,
}

impl TopologyLayout {
    /// Computes the layout of the given monitors, ignoring disconnected ones.
    ///
    /// Extents start from the first connected monitor rather than the origin,
    /// so monitors at negative offsets are covered.
    #[must_use]
    pub fn compute<'a>(monitors: impl IntoIterator<Item = &'a Monitor>) -> Self {
        let connected: Vec<&Monitor> = monitors.into_iter().filter(|m| m.is_connected).collect();

        let bounds = connected.split_first().map(|(first, rest)| {
            let frame = first.frame();
            let (mut min_x, mut min_y) = (frame.x, frame.y);
            let (mut max_x, mut max_y) = (frame.max_x(), frame.max_y());
            for monitor in rest {
                let frame = monitor.frame();
                min_x = min_x.min(frame.x);
                min_y = min_y.min(frame.y);
                max_x = max_x.max(frame.max_x());
                max_y = max_y.max(frame.max_y());
            }
            Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
        });

        Self {
            kind: LayoutKind::classify(&connected),
            bounds,
            connected: connected.len(),
        }
    }
}
