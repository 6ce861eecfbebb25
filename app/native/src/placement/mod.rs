//! Window placement engine.
//!
//! The subsystems are usable on their own; [`orchestrator::Orchestrator`]
//! wires them to a [`binding::DisplayBinding`] and runs their background loops.
//!
//! ```text
//! binding events ─► orchestrator ─► registry / monitors
//!                        │
//!                        ├─► rules ─► actions ─► tiling / snap ─► animation ─► binding
//!                        └─► focus history ─► focus predictor
//! ```

pub mod actions;
pub mod advisor;
pub mod animation;
pub mod binding;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod lifecycle;
pub mod monitors;
pub mod orchestrator;
pub mod registry;
pub mod rules;
pub mod snap;
pub mod weights;

pub use error::{PlacementError, PlacementResult};
pub use lifecycle::Lifecycle;
pub use orchestrator::Orchestrator;

/// Window identifier assigned by the display server.
pub type WindowId = u32;

/// Monitor identifier assigned by the display server.
pub type MonitorId = u32;

/// Workspace identifier.
pub type WorkspaceId = u32;
