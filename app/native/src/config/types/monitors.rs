//! Monitor configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::monitors::{AppMonitorRule, BALANCED, default_app_rules};

/// Monitor topology configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorsConfig {
    /// Distribution strategy: balanced, primary-focused, application-aware,
    /// context-aware or advisor-optimized.
    /// Default: "balanced"
    pub strategy: String,

    /// Redistribute windows whenever windows or monitors come and go.
    /// Default: false
    pub auto_distribute: bool,

    /// Interval between reconciliations with the display server, in
    /// milliseconds.
    /// Default: 2000
    pub poll_interval_ms: u64,

    /// Monitor role per application, used by the application-aware and
    /// context-aware strategies.
    pub app_rules: Vec<AppMonitorRule>,
}

impl Default for MonitorsConfig {
    fn default() -> Self {
        Self {
            strategy: BALANCED.to_string(),
            auto_distribute: false,
            poll_interval_ms: 2000,
            app_rules: default_app_rules(),
        }
    }
}
