//! Column and row layouts - windows split evenly along one axis.

use super::{LayoutResult, TilingAlgorithm, helpers};
use crate::placement::WindowId;
use crate::placement::error::PlacementResult;
use crate::placement::geometry::Rect;

/// Windows side by side, equal widths.
#[derive(Debug, Default, Clone, Copy)]
pub struct Columns;

impl TilingAlgorithm for Columns {
    fn name(&self) -> &'static str { "columns" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        Ok(windows.iter().copied().zip(helpers::columns(area, windows.len())).collect())
    }
}

/// Windows stacked top to bottom, equal heights.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rows;

impl TilingAlgorithm for Rows {
    fn name(&self) -> &'static str { "rows" }

    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult> {
        helpers::ensure_area(area)?;
        Ok(windows.iter().copied().zip(helpers::rows(area, windows.len())).collect())
    }
}
