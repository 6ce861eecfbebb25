//! Configuration types for Tessel.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod advisor;
pub mod focus;
pub mod monitors;
pub mod root;
pub mod rules;
pub mod snap;
pub mod tiling;

pub use advisor::AdvisorConfig;
pub use focus::FocusConfig;
pub use monitors::MonitorsConfig;
pub use root::{ConfigError, TesselConfig, config_paths, load_config, load_config_from_path};
pub use rules::RulesConfig;
pub use snap::SnapConfig;
pub use tiling::{AnimationConfig, TilingConfig};
