//! Tiling algorithms and the engine that chooses between them.
//!
//! Each algorithm takes an ordered list of windows and a work area and returns
//! one frame per window. Frames are edge-to-edge; spacing is added afterwards
//! by the [`Gaps`] post-pass.
//!
//! # Built-in algorithms
//!
//! - **master**: one master window with the rest in a stack (`ratio`)
//! - **grid**: near-square grid, at most 12 windows
//! - **dwindle**: spiral binary space partitioning (`ratio`)
//! - **columns** / **rows**: equal-width columns or equal-height rows
//! - **monocle**: every window fills the work area
//!
//! # Performance
//!
//! Layout results use `SmallVec` to avoid heap allocations for workspaces with
//! up to 16 windows (the common case).

mod custom;
mod dwindle;
mod engine;
mod gaps;
mod grid;
mod helpers;
mod master;
mod monocle;
mod split;

use std::collections::BTreeMap;

pub use custom::{CustomLayout, HourWindow, LayoutConditions, SelectionContext, dominant_app};
pub use dwindle::Dwindle;
pub use engine::{EngineSettings, SelectionSource, TilingEngine, TilingOutcome, TilingRun};
pub use gaps::Gaps;
pub use grid::{Grid, MAX_WINDOWS as GRID_MAX_WINDOWS};
pub use master::{DEFAULT_RATIO as DEFAULT_MASTER_RATIO, Master};
pub use monocle::Monocle;
use smallvec::SmallVec;
pub use split::{Columns, Rows};

use super::WindowId;
use super::error::{PlacementError, PlacementResult};
use super::geometry::Rect;

// ============================================================================
// Layout Result
// ============================================================================

/// Inline capacity for layout results.
pub const LAYOUT_INLINE_CAP: usize = 16;

/// Result of a layout calculation: `(window, frame)` in input order.
pub type LayoutResult = SmallVec<[(WindowId, Rect); LAYOUT_INLINE_CAP]>;

// ============================================================================
// Algorithm Trait
// ============================================================================

/// A named, swappable layout algorithm.
pub trait TilingAlgorithm: Send + Sync {
    /// Registry name, e.g. `"master"`.
    fn name(&self) -> &'static str;

    /// Computes a frame for every window inside `area`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Layout`] for a degenerate area or when the
    /// algorithm cannot place the given number of windows.
    fn tile(&self, windows: &[WindowId], area: &Rect) -> PlacementResult<LayoutResult>;

    /// Whether the algorithm exposes resizable splits.
    fn supports_resize(&self) -> bool { false }

    /// Current tunable parameters.
    fn parameters(&self) -> BTreeMap<String, f64> { BTreeMap::new() }

    /// Updates a tunable parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for unknown keys or
    /// out-of-range values.
    fn set_parameter(&mut self, key: &str, value: f64) -> PlacementResult<()> {
        let _ = value;
        Err(PlacementError::invalid_config(format!(
            "{} has no parameter '{key}'",
            self.name()
        )))
    }
}

/// Instantiates every built-in algorithm.
#[must_use]
pub fn builtin_algorithms(master_ratio: f64) -> Vec<Box<dyn TilingAlgorithm>> {
    vec![
        Box::new(Master::new(master_ratio)),
        Box::new(Grid),
        Box::new(Dwindle::default()),
        Box::new(Columns),
        Box::new(Rows),
        Box::new(Monocle),
    ]
}
