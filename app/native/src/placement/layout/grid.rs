//! Grid layout - windows arranged in rows and columns.
//!
//! The grid aims to be as close to square as possible. Columns come first on
//! landscape areas and rows on portrait ones. When the count does not fill
//! the grid, the windows of the last line stretch to cover it.
//!
//! # Examples (Landscape)
//!
//! - 2 windows: side by side (1×2)
//! - 3 windows: two on top, one full-width below
//! - 4 windows: 2×2 grid
//! - 6 windows: 2×3 grid
//! - 9 windows: 3×3 grid
//! - 12 windows: 3×4 grid
//!
//! More than 12 windows is an error.

use super::{LayoutResult, TilingAlgorithm, helpers};
use crate::placement::WindowId;
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;

/// Maximum number of windows supported in grid layout.
pub const MAX_WINDOWS: usize = 12;

/// Near-square grid layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Grid;

/// Returns `(lines, per_line)` for `count` windows: the number of major lines
/// and the maximum number of windows in each.
fn dimensions(count: usize) -> (usize, usize) {
    let mut per_line = 1;
    while per_line * per_line < count {
        per_line += 1;
    }
    (count.div_ceil(per_line), per_line)
}

impl TilingAlgorithm for Grid {
    fn name(&self) -> &'static str { "grid" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        if windows.len() > MAX_WINDOWS {
            return Err(PlacementError::layout(format!(
                "grid supports at most {MAX_WINDOWS} windows, got {}",
                windows.len()
            )));
        }
        if windows.is_empty() {
            return Ok(LayoutResult::new());
        }

        let landscape = area.width >= area.height;
        let (line_count, per_line) = dimensions(windows.len());

        // Landscape: lines are rows filled with columns; portrait: the reverse.
        let lines = if landscape {
            helpers::rows(area, line_count)
        } else {
            helpers::columns(area, line_count)
        };

        let mut result = LayoutResult::new();
        for (line, chunk) in lines.iter().zip(windows.chunks(per_line)) {
            let cells = if landscape {
                helpers::columns(line, chunk.len())
            } else {
                helpers::rows(line, chunk.len())
            };
            result.extend(chunk.iter().copied().zip(cells));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape_frame() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    fn ids(n: u32) -> Vec<WindowId> { (1..=n).collect() }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(1), (1, 1));
        assert_eq!(dimensions(2), (1, 2));
        assert_eq!(dimensions(3), (2, 2));
        assert_eq!(dimensions(4), (2, 2));
        assert_eq!(dimensions(6), (2, 3));
        assert_eq!(dimensions(9), (3, 3));
        assert_eq!(dimensions(12), (3, 4));
    }

    #[test]
    fn test_grid_four_windows() {
        let result = Grid.tile(&ids(4), &landscape_frame()).unwrap();
        for (_, rect) in &result {
            assert_eq!(rect.width, 960.0);
            assert_eq!(rect.height, 540.0);
        }
        assert_eq!(result[3].1.origin().x, 960.0);
        assert_eq!(result[3].1.origin().y, 540.0);
    }

    #[test]
    fn test_grid_three_windows_last_row_stretches() {
        let result = Grid.tile(&ids(3), &landscape_frame()).unwrap();
        assert_eq!(result[2].1, Rect::new(0.0, 540.0, 1920.0, 540.0));
    }

    #[test]
    fn test_grid_portrait_uses_columns() {
        let frame = Rect::new(0.0, 0.0, 1080.0, 1920.0);
        let result = Grid.tile(&ids(2), &frame).unwrap();
        assert_eq!(result[0].1, Rect::new(0.0, 0.0, 1080.0, 960.0));
        assert_eq!(result[1].1, Rect::new(0.0, 960.0, 1080.0, 960.0));
    }

    #[test]
    fn test_grid_max_windows() {
        assert_eq!(Grid.tile(&ids(12), &landscape_frame()).unwrap().len(), 12);
        let err = Grid.tile(&ids(13), &landscape_frame()).unwrap_err();
        assert!(matches!(err, PlacementError::Layout(_)));
    }

    #[test]
    fn test_grid_no_overlap() {
        let result = Grid.tile(&ids(7), &landscape_frame()).unwrap();
        for (i, (_, a)) in result.iter().enumerate() {
            for (_, b) in result.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
    }
}
