//! Visual state snapshots interpolated by the animator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::easing::lerp;
use crate::placement::geometry::Rect;

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub radius: f64,
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Shadow {
    pub const NONE: Self = Self { radius: 0.0, opacity: 0.0, offset_x: 0.0, offset_y: 0.0 };

    #[must_use]
    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            radius: lerp(self.radius, to.radius, t),
            opacity: lerp(self.opacity, to.opacity, t),
            offset_x: lerp(self.offset_x, to.offset_x, t),
            offset_y: lerp(self.offset_y, to.offset_y, t),
        }
    }
}

impl Default for Shadow {
    fn default() -> Self { Self::NONE }
}

/// Everything about a window's appearance that can be animated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WindowVisualState {
    pub frame: Rect,
    pub opacity: f64,
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
    pub z_index: i32,
    pub border_width: f64,
    pub shadow: Shadow,
}

impl WindowVisualState {
    /// Fully opaque, unscaled window at `frame`.
    #[must_use]
    pub const fn at(frame: Rect) -> Self {
        Self {
            frame,
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
            z_index: 0,
            border_width: 0.0,
            shadow: Shadow::NONE,
        }
    }

    #[must_use]
    pub const fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Interpolates every property; `t` may leave `[0, 1]` for overshooting curves.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            frame: Rect::new(
                lerp(self.frame.x, to.frame.x, t),
                lerp(self.frame.y, to.frame.y, t),
                lerp(self.frame.width, to.frame.width, t).max(0.0),
                lerp(self.frame.height, to.frame.height, t).max(0.0),
            ),
            opacity: lerp(self.opacity, to.opacity, t).clamp(0.0, 1.0),
            scale: lerp(self.scale, to.scale, t).max(0.0),
            rotation: lerp(self.rotation, to.rotation, t),
            z_index: lerp(f64::from(self.z_index), f64::from(to.z_index), t).round() as i32,
            border_width: lerp(self.border_width, to.border_width, t).max(0.0),
            shadow: self.shadow.lerp(&to.shadow, t),
        }
    }
}
