//! Dwindle layout - binary space partitioning with a spiral pattern.
//!
//! Each new window splits the **last window's space**, alternating split
//! direction. The first split follows the work area's orientation:
//!
//! ```text
//! Landscape, 4 windows:     Portrait, 4 windows:
//! ┌─────┬─────┐             ┌─────┐
//! │     │  2  │             │  1  │
//! │  1  ├──┬──┤             ├──┬──┤
//! │     │ 3│ 4│             │ 2│ 3│
//! └─────┴──┴──┘             │  ├──┤
//!                           │  │ 4│
//!                           └──┴──┘
//! ```

use std::collections::BTreeMap;

use super::{LayoutResult, TilingAlgorithm, helpers};
use crate::placement::WindowId;
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;

/// Spiral BSP layout.
#[derive(Debug, Clone, Copy)]
pub struct Dwindle {
    /// Share of each split kept by the earlier window.
    ratio: f64,
}

impl Dwindle {
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        let ratio = if ratio.is_finite() { ratio.clamp(0.1, 0.9) } else { 0.5 };
        Self { ratio }
    }
}

impl Default for Dwindle {
    fn default() -> Self { Self::new(0.5) }
}

impl TilingAlgorithm for Dwindle {
    fn name(&self) -> &'static str { "dwindle" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        if windows.is_empty() {
            return Ok(LayoutResult::new());
        }

        let is_landscape = area.width >= area.height;

        // Start with the first window taking the full area and keep splitting
        // the most recent frame.
        let mut frames: Vec<Rect> = Vec::with_capacity(windows.len());
        frames.push(*area);

        for i in 1..windows.len() {
            let parent = frames[i - 1];

            // Landscape: 1st split horizontal, 2nd vertical, ...
            // Portrait: 1st split vertical, 2nd horizontal, ...
            let split_horizontal = if is_landscape { i % 2 == 1 } else { i % 2 == 0 };

            let (first, second) = if split_horizontal {
                helpers::split_horizontal(&parent, self.ratio)
            } else {
                helpers::split_vertical(&parent, self.ratio)
            };

            frames[i - 1] = first;
            frames.push(second);
        }

        Ok(windows.iter().copied().zip(frames).collect())
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
            _ => Err(PlacementError::invalid_config(format!("dwindle has no parameter '{key}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape_frame() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    fn portrait_frame() -> Rect { Rect::new(0.0, 0.0, 1080.0, 1920.0) }

    #[test]
    fn test_dwindle_single_window() {
        let frame = landscape_frame();
        let result = Dwindle::default().tile(&[1], &frame).unwrap();
        assert_eq!(result[0], (1, frame));
    }

    #[test]
    fn test_landscape_four_windows() {
        let frame = landscape_frame();
        let result = Dwindle::default().tile(&[1, 2, 3, 4], &frame).unwrap();

        assert_eq!(result[0].1, Rect::new(0.0, 0.0, 960.0, 1080.0));
        assert_eq!(result[1].1, Rect::new(960.0, 0.0, 960.0, 540.0));
        assert_eq!(result[2].1, Rect::new(960.0, 540.0, 480.0, 540.0));
        assert_eq!(result[3].1, Rect::new(1440.0, 540.0, 480.0, 540.0));
    }

    #[test]
    fn test_portrait_two_windows() {
        let frame = portrait_frame();
        let result = Dwindle::default().tile(&[1, 2], &frame).unwrap();

        assert_eq!(result[0].1, Rect::new(0.0, 0.0, 1080.0, 960.0));
        assert_eq!(result[1].1, Rect::new(0.0, 960.0, 1080.0, 960.0));
    }

    #[test]
    fn test_custom_ratio() {
        let mut dwindle = Dwindle::default();
        dwindle.set_parameter("ratio", 0.75).unwrap();
        let result = dwindle.tile(&[1, 2], &landscape_frame()).unwrap();
        assert_eq!(result[0].1.width, 1440.0);
        assert_eq!(result[1].1.width, 480.0);
    }

    #[test]
    fn test_frames_cover_area() {
        let frame = landscape_frame();
        let result = Dwindle::default().tile(&[1, 2, 3, 4, 5, 6], &frame).unwrap();
        let total: f64 = result.iter().map(|(_, r)| r.area()).sum();
        assert!((total - frame.area()).abs() < 1e-6);
    }
}
