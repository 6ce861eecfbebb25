//! Gap post-pass for tiled placements.
//!
//! Algorithms produce edge-to-edge frames; the gap pass shrinks every frame
//! around its centre. Smart gaps shrink the base gap on crowded or small
//! work areas.

use super::LayoutResult;
use crate::placement::geometry::Rect;

/// Window count above which smart gaps are reduced.
pub const CROWDED_WINDOW_COUNT: usize = 4;

/// Reduction applied on crowded workspaces (30%).
pub const CROWDED_FACTOR: f64 = 0.7;

/// Reduction applied on small work areas (a further 20%).
pub const SMALL_AREA_FACTOR: f64 = 0.8;

/// Pixel area below which a work area counts as small (1920×1080).
pub const SMALL_AREA: f64 = 1920.0 * 1080.0;

/// Resolved gap settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gaps {
    /// Base gap in pixels.
    pub base: f64,
    /// Whether the gap adapts to window count and area.
    pub smart: bool,
}

impl Gaps {
    #[must_use]
    pub const fn new(base: f64, smart: bool) -> Self { Self { base, smart } }

    /// Returns true if no gap would ever be applied.
    #[must_use]
    pub fn is_zero(&self) -> bool { self.base <= 0.0 }

    /// Gap for a workspace with `count` windows tiled into `area`.
    #[must_use]
    pub fn gap_for(&self, count: usize, area: &Rect) -> f64 {
        let mut gap = self.base.max(0.0);
        if self.smart {
            if count > CROWDED_WINDOW_COUNT {
                gap *= CROWDED_FACTOR;
            }
            if area.area() < SMALL_AREA {
                gap *= SMALL_AREA_FACTOR;
            }
        }
        gap
    }

    /// Shrinks every placement by the gap, keeping it centred.
    ///
    /// A single placement is left untouched.
    pub fn apply(&self, placements: &mut LayoutResult, area: &Rect) {
        if placements.len() <= 1 || self.is_zero() {
            return;
        }
        let gap = self.gap_for(placements.len(), area);
        for (_, frame) in placements.iter_mut() {
            *frame = frame.shrink_centered(gap);
        }
    }
}
