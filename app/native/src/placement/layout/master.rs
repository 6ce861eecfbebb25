//! Master layout - one master window with remaining windows in a stack.
//!
//! The first window is the "master" and gets `ratio` of the work area.
//! Remaining windows share the rest. The split adapts to orientation:
//!
//! ```text
//! Landscape:           Portrait:
//! ┌──────────┬─────┐   ┌─────────┐
//! │          │  2  │   │ Master  │
//! │  Master  ├─────┤   ├────┬────┤
//! │          │  3  │   │ 2  │ 3  │
//! └──────────┴─────┘   └────┴────┘
//! ```

use std::collections::BTreeMap;

use super::{LayoutResult, TilingAlgorithm, helpers};
use crate::placement::WindowId;
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;

/// Default share of the work area given to the master window.
pub const DEFAULT_RATIO: f64 = 0.6;

/// Master/stack layout.
#[derive(Debug, Clone, Copy)]
pub struct Master {
    ratio: f64,
}

impl Master {
    /// Creates a master layout; the ratio is clamped to `[0.1, 0.9]`.
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        let ratio = if ratio.is_finite() { ratio.clamp(0.1, 0.9) } else { DEFAULT_RATIO };
        Self { ratio }
    }

    #[must_use]
    pub const fn ratio(&self) -> f64 { self.ratio }
}

impl Default for Master {
    fn default() -> Self { Self::new(DEFAULT_RATIO) }
}

impl TilingAlgorithm for Master {
    fn name(&self) -> &'static str { "master" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        let mut result = LayoutResult::new();

        let Some((&master, stack)) = windows.split_first() else {
            return Ok(result);
        };

        // Single window - takes full area
        if stack.is_empty() {
            result.push((master, *area));
            return Ok(result);
        }

        let landscape = area.width >= area.height;
        let (master_frame, stack_frame) = if landscape {
            helpers::split_horizontal(area, self.ratio)
        } else {
            helpers::split_vertical(area, self.ratio)
        };
        result.push((master, master_frame));

        // Stack runs perpendicular to the master split
        let stack_frames = if landscape {
            helpers::rows(&stack_frame, stack.len())
        } else {
            helpers::columns(&stack_frame, stack.len())
        };
        result.extend(stack.iter().copied().zip(stack_frames));

        Ok(result)
    }

    fn supports_resize(&self) -> bool { true }

    fn parameters(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("ratio".to_string(), self.ratio)])
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> PlacementResult<()> {
        match key {
            "ratio" => {
                self.ratio = helpers::ensure_ratio(key, value)?;
                Ok(())
            }
            _ => Err(PlacementError::invalid_config(format!("master has no parameter '{key}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape_frame() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    fn portrait_frame() -> Rect { Rect::new(0.0, 0.0, 1080.0, 1920.0) }

    #[test]
    fn test_master_single_window() {
        let frame = landscape_frame();
        let result = Master::default().tile(&[1], &frame).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], (1, frame));
    }

    #[test]
    fn test_master_landscape_stack_on_right() {
        let frame = landscape_frame();
        let result = Master::new(0.6).tile(&[1, 2, 3], &frame).unwrap();

        let (_, master) = result[0];
        assert!((master.width - 1152.0).abs() < 1e-9);
        assert_eq!(master.height, 1080.0);

        let (_, second) = result[1];
        let (_, third) = result[2];
        assert!((second.x - 1152.0).abs() < 1e-9);
        assert_eq!(second.height, 540.0);
        assert_eq!(third.y, 540.0);
    }

    #[test]
    fn test_master_portrait_stack_below() {
        let frame = portrait_frame();
        let result = Master::new(0.5).tile(&[1, 2, 3], &frame).unwrap();

        assert_eq!(result[0].1, Rect::new(0.0, 0.0, 1080.0, 960.0));
        assert_eq!(result[1].1, Rect::new(0.0, 960.0, 540.0, 960.0));
        assert_eq!(result[2].1, Rect::new(540.0, 960.0, 540.0, 960.0));
    }

    #[test]
    fn test_ratio_parameter() {
        let mut master = Master::default();
        master.set_parameter("ratio", 0.7).unwrap();
        assert_eq!(master.parameters()["ratio"], 0.7);
        assert!(master.set_parameter("ratio", 1.5).is_err());
        assert!(master.set_parameter("columns", 2.0).is_err());
        assert!(master.supports_resize());
    }

    #[test]
    fn test_constructor_clamps() {
        assert_eq!(Master::new(2.0).ratio(), 0.9);
        assert_eq!(Master::new(f64::NAN).ratio(), DEFAULT_RATIO);
    }
}
