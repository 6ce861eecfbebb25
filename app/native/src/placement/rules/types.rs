//! Rule definitions and execution records.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::condition::Condition;
use super::schedule::Schedule;
use crate::placement::WindowId;
use crate::placement::actions::WindowAction;

/// Lifecycle event that can trigger rule evaluation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum RuleTrigger {
    WindowCreated,
    WindowFocused,
    WindowMoved,
    WindowResized,
    WindowMinimized,
    WindowClosed,
    /// Explicit evaluation requested through the API.
    Manual,
}

/// One action of a rule, optionally delayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(flatten)]
    pub action: WindowAction,
    /// Pause before running this action.
    #[serde(default)]
    pub delay_ms: u64,
}

impl RuleAction {
    #[must_use]
    pub const fn new(action: WindowAction) -> Self { Self { action, delay_ms: 0 } }

    #[must_use]
    pub const fn delayed(action: WindowAction, delay_ms: u64) -> Self { Self { action, delay_ms } }

    #[must_use]
    pub const fn delay(&self) -> Duration { Duration::from_millis(self.delay_ms) }
}

/// Match statistics kept per rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStats {
    pub match_count: u64,
    pub last_matched: Option<DateTime<Utc>>,
}

const fn default_enabled() -> bool { true }

/// Condition/action automation for windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WindowRule {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Higher priorities are evaluated first.
    #[serde(default)]
    pub priority: i32,
    /// Weighted conditions; the rule matches when more than half the total
    /// weight matches. No conditions always matches.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<RuleAction>,
    /// Events that trigger the rule; empty means every event.
    #[serde(default)]
    pub triggers: BTreeSet<RuleTrigger>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_deserializing)]
    #[schemars(skip)]
    pub stats: RuleStats,
}

impl WindowRule {
    /// Creates an enabled rule with no conditions, triggers or schedule.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            priority: 0,
            conditions: Vec::new(),
            actions: Vec::new(),
            triggers: BTreeSet::new(),
            schedule: None,
            stats: RuleStats::default(),
        }
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn then(mut self, action: WindowAction) -> Self {
        self.actions.push(RuleAction::new(action));
        self
    }

    #[must_use]
    pub fn then_after(mut self, action: WindowAction, delay_ms: u64) -> Self {
        self.actions.push(RuleAction::delayed(action, delay_ms));
        self
    }

    #[must_use]
    pub fn on(mut self, trigger: RuleTrigger) -> Self {
        self.triggers.insert(trigger);
        self
    }

    #[must_use]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Returns `true` if `trigger` should evaluate this rule.
    #[must_use]
    pub fn listens_to(&self, trigger: RuleTrigger) -> bool {
        self.triggers.is_empty() || self.triggers.contains(&trigger)
    }
}

/// Record of one matched rule's execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecution {
    pub id: Uuid,
    pub rule_id: String,
    pub window_id: WindowId,
    pub trigger: RuleTrigger,
    pub at: DateTime<Utc>,
    pub success: bool,
    /// Actions that completed.
    pub actions_run: usize,
    pub failed_action: Option<String>,
    pub error: Option<String>,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserializes_from_config_shape() {
        let rule: WindowRule = serde_json::from_str(
            r#"{
                "id": "browser-max",
                "name": "Maximize browsers",
                "priority": 10,
                "conditions": [{"field": "app", "op": "equals", "value": "browser"}],
                "actions": [{"type": "maximize"}, {"type": "addTag", "tag": "web", "delayMs": 50}],
                "triggers": ["window-created"]
            }"#,
        )
        .unwrap();

        assert!(rule.enabled);
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.actions[0].action, WindowAction::Maximize);
        assert_eq!(rule.actions[1].delay(), Duration::from_millis(50));
        assert!(rule.listens_to(RuleTrigger::WindowCreated));
        assert!(!rule.listens_to(RuleTrigger::WindowFocused));
    }

    #[test]
    fn test_empty_triggers_listen_to_everything() {
        let rule = WindowRule::new("r", "any");
        assert!(rule.listens_to(RuleTrigger::Manual));
        assert!(rule.listens_to(RuleTrigger::WindowClosed));
    }
}
