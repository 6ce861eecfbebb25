//! Monocle layout - all windows maximized to fill the work area.

use super::{LayoutResult, TilingAlgorithm, helpers};
use crate::placement::WindowId;
use crate::placement::error::PlacementResult;
use crate::placement::geometry::Rect;

/// Every window gets the full work area.
#[derive(Debug, Default, Clone, Copy)]
pub struct Monocle;

impl TilingAlgorithm for Monocle {
    fn name(&self) -> &'static str { "monocle" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        Ok(windows.iter().map(|&id| (id, *area)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_frame() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    #[test]
    fn test_monocle_empty() {
        assert!(Monocle.tile(&[], &screen_frame()).unwrap().is_empty());
    }

    #[test]
    fn test_monocle_multiple_windows() {
        let frame = screen_frame();
        let result = Monocle.tile(&[5, 3, 8], &frame).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].0, 5);
        for (id, window_frame) in &result {
            assert_eq!(*window_frame, frame, "Window {id} should be fullscreen");
        }
    }
}
