//! Window rules configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::rules::WindowRule;

/// Rules engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
    /// Evaluation workers.
    /// Default: 4
    pub workers: usize,

    /// How long a caller waits for an evaluation, in milliseconds.
    /// Default: 2000
    pub evaluation_timeout_ms: u64,

    /// Pending evaluations before callers wait for queue space.
    /// Default: 256
    pub queue_capacity: usize,

    /// Rule executions kept for statistics.
    /// Default: 500
    pub history_limit: usize,

    /// The rules, evaluated highest priority first.
    pub rules: Vec<WindowRule>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            evaluation_timeout_ms: 2000,
            queue_capacity: 256,
            history_limit: 500,
            rules: Vec::new(),
        }
    }
}
