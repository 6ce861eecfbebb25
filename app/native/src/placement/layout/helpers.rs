//! Helper functions for layout calculations.

use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;

/// Splits a frame horizontally (left/right) at the given ratio.
///
/// # Returns
///
/// A tuple of (`left_frame`, `right_frame`)
#[must_use]
pub fn split_horizontal(frame: &Rect, ratio: f64) -> (Rect, Rect) {
    let left_width = frame.width * ratio;
    let right_width = frame.width - left_width;

    let left = Rect::new(frame.x, frame.y, left_width, frame.height);
    let right = Rect::new(frame.x + left_width, frame.y, right_width, frame.height);

    (left, right)
}

/// Splits a frame vertically (top/bottom) at the given ratio.
///
/// # Returns
///
/// A tuple of (`top_frame`, `bottom_frame`)
#[must_use]
pub fn split_vertical(frame: &Rect, ratio: f64) -> (Rect, Rect) {
    let top_height = frame.height * ratio;
    let bottom_height = frame.height - top_height;

    let top = Rect::new(frame.x, frame.y, frame.width, top_height);
    let bottom = Rect::new(frame.x, frame.y + top_height, frame.width, bottom_height);

    (top, bottom)
}

/// Divides a frame into `count` equal columns.
#[allow(clippy::cast_precision_loss)] // Window counts won't exceed f64 precision
#[must_use]
pub fn columns(frame: &Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let width = frame.width / count as f64;
    (0..count)
        .map(|i| Rect::new((i as f64).mul_add(width, frame.x), frame.y, width, frame.height))
        .collect()
}

/// Divides a frame into `count` equal rows.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rows(frame: &Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let height = frame.height / count as f64;
    (0..count)
        .map(|i| Rect::new(frame.x, (i as f64).mul_add(height, frame.y), frame.width, height))
        .collect()
}

/// Rejects work areas without positive area.
///
/// # Errors
///
/// Returns [`PlacementError::Layout`] for degenerate areas.
pub fn ensure_area(area: &Rect) -> PlacementResult<()> {
    if area.is_degenerate() {
        return Err(PlacementError::layout(format!(
            "work area {}x{} has no usable space",
            area.width, area.height
        )));
    }
    Ok(())
}

/// Validates a split ratio parameter.
///
/// # Errors
///
/// Returns [`PlacementError::InvalidConfiguration`] outside `[0.1, 0.9]`.
pub fn ensure_ratio(key: &str, value: f64) -> PlacementResult<f64> {
    if !(0.1..=0.9).contains(&value) {
        return Err(PlacementError::invalid_config(format!(
            "{key} must be between 0.1 and 0.9, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_horizontal() {
        let frame = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (left, right) = split_horizontal(&frame, 0.6);

        assert_eq!(left.width, 60.0);
        assert_eq!(right.width, 40.0);
        assert_eq!(right.x, 60.0);
        assert_eq!(left.height, 50.0);
    }

    #[test]
    fn test_split_vertical() {
        let frame = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (top, bottom) = split_vertical(&frame, 0.4);

        assert_eq!(top.height, 20.0);
        assert_eq!(bottom.height, 30.0);
        assert_eq!(bottom.y, 20.0);
        assert_eq!(top.width, 100.0);
    }

    #[test]
    fn test_columns_cover_frame() {
        let frame = Rect::new(10.0, 0.0, 300.0, 100.0);
        let cols = columns(&frame, 3);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[2].x, 210.0);
        assert_eq!(cols[2].max_x(), frame.max_x());
    }

    #[test]
    fn test_ensure_area_rejects_degenerate() {
        assert!(ensure_area(&Rect::new(0.0, 0.0, 0.0, 100.0)).is_err());
        assert!(ensure_area(&Rect::new(0.0, 0.0, 100.0, -1.0)).is_err());
        assert!(ensure_area(&Rect::new(0.0, 0.0, 1.0, 1.0)).is_ok());
    }

    #[test]
    fn test_ensure_ratio() {
        assert!(ensure_ratio("ratio", 0.5).is_ok());
        assert!(ensure_ratio("ratio", 0.95).is_err());
        assert!(ensure_ratio("ratio", f64::NAN).is_err());
    }
}
