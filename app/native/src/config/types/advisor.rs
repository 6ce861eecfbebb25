//! External advisor configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Advisor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvisorConfig {
    /// Consult the advisor at all. Every call has a local fallback.
    /// Default: false
    pub enabled: bool,

    /// Time budget per advisor call, in milliseconds.
    /// Default: 500
    pub timeout_ms: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self { Self { enabled: false, timeout_ms: 500 } }
}
