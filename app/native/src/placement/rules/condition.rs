//! Rule conditions and their evaluation.
//!
//! Every condition inspects one aspect of the window (or the clock) and may
//! be negated. Conditions carry a weight; a rule matches when the matching
//! weight exceeds half of the total weight.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::schedule::ClockTime;
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::registry::Window;

/// Share of the condition weight that must match.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// String comparison. All but `matches` ignore ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StringOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    /// Regular expression search.
    Matches,
}

/// Numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Compare {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Compare {
    #[must_use]
    pub fn test(self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq => (left - right).abs() < f64::EPSILON,
            Self::Ne => (left - right).abs() >= f64::EPSILON,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Window dimension for size checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Width,
    Height,
    Area,
}

/// Axis for position checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    X,
    Y,
}

/// What a condition inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum ConditionCheck {
    Title { op: StringOp, value: String },
    App { op: StringOp, value: String },
    /// The window carries the tag.
    Tag { value: String },
    Workspace { op: Compare, value: i64 },
    Monitor { op: Compare, value: i64 },
    Size { dimension: Dimension, op: Compare, value: f64 },
    Position { axis: Axis, op: Compare, value: f64 },
    /// Local hour of day, start inclusive, end exclusive; wraps past midnight.
    Time { from_hour: u32, to_hour: u32 },
    Minimized { value: bool },
    Maximized { value: bool },
    /// A predicate registered by name at runtime.
    Custom {
        name: String,
        #[serde(default)]
        argument: Option<String>,
    },
}

const fn default_weight() -> f64 { 1.0 }

/// A weighted, optionally negated check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(flatten)]
    pub check: ConditionCheck,
    #[serde(default)]
    pub negate: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Condition {
    #[must_use]
    pub const fn new(check: ConditionCheck) -> Self { Self { check, negate: false, weight: 1.0 } }

    /// `app` equals `value` (case-insensitive).
    #[must_use]
    pub fn app_is(value: impl Into<String>) -> Self {
        Self::new(ConditionCheck::App { op: StringOp::Equals, value: value.into() })
    }

    /// `title` contains `value` (case-insensitive).
    #[must_use]
    pub fn title_contains(value: impl Into<String>) -> Self {
        Self::new(ConditionCheck::Title { op: StringOp::Contains, value: value.into() })
    }

    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    #[must_use]
    pub const fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Checks weight and regex syntax.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] describing the problem.
    pub fn validate(&self) -> PlacementResult<()> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(PlacementError::invalid_config(format!(
                "condition weight must be positive, got {}",
                self.weight
            )));
        }
        if let ConditionCheck::Title { op: StringOp::Matches, value }
        | ConditionCheck::App { op: StringOp::Matches, value } = &self.check
        {
            Regex::new(value).map_err(|err| {
                PlacementError::invalid_config(format!("invalid pattern '{value}': {err}"))
            })?;
        }
        if let ConditionCheck::Time { from_hour, to_hour } = self.check {
            if from_hour > 23 || to_hour > 24 {
                return Err(PlacementError::invalid_config("time condition hours must be 0..=24"));
            }
        }
        Ok(())
    }
}

/// Predicate registered under a name for `custom` conditions.
pub type CustomPredicate = Arc<dyn Fn(&Window, Option<&str>) -> bool + Send + Sync>;

/// Evaluates conditions with a compiled-regex cache and named predicates.
#[derive(Default)]
pub struct ConditionEvaluator {
    regexes: Mutex<HashMap<String, Regex>>,
    predicates: RwLock<HashMap<String, CustomPredicate>>,
}

impl ConditionEvaluator {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers (or replaces) a named predicate.
    pub fn register(&self, name: impl Into<String>, predicate: CustomPredicate) {
        self.predicates.write().insert(name.into(), predicate);
    }

    /// Returns `true` if a predicate is registered under `name`.
    #[must_use]
    pub fn has_predicate(&self, name: &str) -> bool { self.predicates.read().contains_key(name) }

    /// Number of cached compiled patterns.
    #[must_use]
    pub fn cached_patterns(&self) -> usize { self.regexes.lock().len() }

    /// Evaluates a single condition, applying negation.
    #[must_use]
    pub fn check(&self, condition: &Condition, window: &Window, now: ClockTime) -> bool {
        self.raw(&condition.check, window, now) != condition.negate
    }

    /// Weighted majority over `conditions`. No conditions always match.
    #[must_use]
    pub fn matches(&self, conditions: &[Condition], window: &Window, now: ClockTime) -> bool {
        let total: f64 = conditions.iter().map(|c| c.weight).sum();
        if conditions.is_empty() || total <= 0.0 {
            return true;
        }
        let matched: f64 = conditions
            .iter()
            .filter(|c| self.check(c, window, now))
            .map(|c| c.weight)
            .sum();
        matched / total > MATCH_THRESHOLD
    }

    fn raw(&self, check: &ConditionCheck, window: &Window, now: ClockTime) -> bool {
        match check {
            ConditionCheck::Title { op, value } => self.compare_str(*op, &window.title, value),
            ConditionCheck::App { op, value } => self.compare_str(*op, &window.app, value),
            ConditionCheck::Tag { value } => window.has_tag(value),
            ConditionCheck::Workspace { op, value } => {
                compare_int(*op, i64::from(window.workspace_id), *value)
            }
            ConditionCheck::Monitor { op, value } => window
                .monitor_id
                .is_some_and(|monitor| compare_int(*op, i64::from(monitor), *value)),
            ConditionCheck::Size { dimension, op, value } => {
                let actual = match dimension {
                    Dimension::Width => window.frame.width,
                    Dimension::Height => window.frame.height,
                    Dimension::Area => window.frame.area(),
                };
                op.test(actual, *value)
            }
            ConditionCheck::Position { axis, op, value } => {
                let actual = match axis {
                    Axis::X => window.frame.x,
                    Axis::Y => window.frame.y,
                };
                op.test(actual, *value)
            }
            ConditionCheck::Time { from_hour, to_hour } => {
                if from_hour <= to_hour {
                    now.hour >= *from_hour && now.hour < *to_hour
                } else {
                    now.hour >= *from_hour || now.hour < *to_hour
                }
            }
            ConditionCheck::Minimized { value } => window.flags.minimized == *value,
            ConditionCheck::Maximized { value } => window.flags.maximized == *value,
            ConditionCheck::Custom { name, argument } => {
                let predicate = self.predicates.read().get(name).cloned();
                match predicate {
                    Some(predicate) => predicate(window, argument.as_deref()),
                    None => {
                        tracing::debug!("rules: unknown predicate '{name}'");
                        false
                    }
                }
            }
        }
    }

    fn compare_str(&self, op: StringOp, actual: &str, expected: &str) -> bool {
        match op {
            StringOp::Equals => actual.eq_ignore_ascii_case(expected),
            StringOp::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
            StringOp::StartsWith => actual.to_lowercase().starts_with(&expected.to_lowercase()),
            StringOp::EndsWith => actual.to_lowercase().ends_with(&expected.to_lowercase()),
            StringOp::Matches => self.regex_match(expected, actual),
        }
    }

    fn regex_match(&self, pattern: &str, haystack: &str) -> bool {
        let mut cache = self.regexes.lock();
        if let Some(regex) = cache.get(pattern) {
            return regex.is_match(haystack);
        }
        match Regex::new(pattern) {
            Ok(regex) => {
                let matched = regex.is_match(haystack);
                cache.insert(pattern.to_string(), regex);
                matched
            }
            Err(err) => {
                tracing::warn!("rules: invalid pattern '{pattern}': {err}");
                false
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn compare_int(op: Compare, actual: i64, expected: i64) -> bool {
    match op {
        Compare::Eq => actual == expected,
        Compare::Ne => actual != expected,
        _ => op.test(actual as f64, expected as f64),
    }
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator")
            .field("cached_patterns", &self.cached_patterns())
            .field("predicates", &self.predicates.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::binding::WindowSpec;
    use crate::placement::geometry::Rect;
    use crate::placement::rules::schedule::Day;

    fn window() -> Window {
        let spec = WindowSpec::new(1, "Browser", Rect::new(100.0, 50.0, 1280.0, 800.0))
            .with_title("Docs - Browser")
            .on_workspace(2)
            .on_monitor(1);
        Window::from_spec(&spec)
    }

    fn noon() -> ClockTime { ClockTime::new(Day::Tuesday, 12, 0) }

    #[test]
    fn test_single_condition_match_and_miss() {
        let evaluator = ConditionEvaluator::new();
        assert!(evaluator.matches(&[Condition::app_is("browser")], &window(), noon()));
        assert!(!evaluator.matches(&[Condition::app_is("terminal")], &window(), noon()));
    }

    #[test]
    fn test_negation() {
        let evaluator = ConditionEvaluator::new();
        let condition = Condition::app_is("terminal").negated();
        assert!(evaluator.check(&condition, &window(), noon()));
    }

    #[test]
    fn test_weighted_majority() {
        let evaluator = ConditionEvaluator::new();
        // 2.0 of 3.0 matches.
        let heavy = [Condition::app_is("browser").weighted(2.0), Condition::app_is("terminal")];
        assert!(evaluator.matches(&heavy, &window(), noon()));

        // Exactly half does not match.
        let split = [Condition::app_is("browser"), Condition::app_is("terminal")];
        assert!(!evaluator.matches(&split, &window(), noon()));

        assert!(evaluator.matches(&[], &window(), noon()));
    }

    #[test]
    fn test_numeric_and_geometry_checks() {
        let evaluator = ConditionEvaluator::new();
        let checks = [
            ConditionCheck::Workspace { op: Compare::Eq, value: 2 },
            ConditionCheck::Monitor { op: Compare::Ne, value: 3 },
            ConditionCheck::Size { dimension: Dimension::Width, op: Compare::Ge, value: 1280.0 },
            ConditionCheck::Size { dimension: Dimension::Area, op: Compare::Gt, value: 1e6 },
            ConditionCheck::Position { axis: Axis::Y, op: Compare::Lt, value: 100.0 },
            ConditionCheck::Minimized { value: false },
        ];
        for check in checks {
            assert!(evaluator.check(&Condition::new(check.clone()), &window(), noon()), "{check:?}");
        }
    }

    #[test]
    fn test_time_condition_wraps() {
        let evaluator = ConditionEvaluator::new();
        let night = Condition::new(ConditionCheck::Time { from_hour: 22, to_hour: 6 });
        assert!(evaluator.check(&night, &window(), ClockTime::new(Day::Monday, 23, 0)));
        assert!(!evaluator.check(&night, &window(), noon()));
    }

    #[test]
    fn test_regex_is_cached() {
        let evaluator = ConditionEvaluator::new();
        let condition = Condition::new(ConditionCheck::Title {
            op: StringOp::Matches,
            value: r"^Docs\b".into(),
        });
        assert!(evaluator.check(&condition, &window(), noon()));
        assert!(evaluator.check(&condition, &window(), noon()));
        assert_eq!(evaluator.cached_patterns(), 1);
    }

    #[test]
    fn test_custom_predicates() {
        let evaluator = ConditionEvaluator::new();
        let condition = Condition::new(ConditionCheck::Custom {
            name: "wide".into(),
            argument: Some("1000".into()),
        });
        assert!(!evaluator.check(&condition, &window(), noon()));

        evaluator.register(
            "wide",
            Arc::new(|window: &Window, arg: Option<&str>| {
                let min = arg.and_then(|a| a.parse::<f64>().ok()).unwrap_or(0.0);
                window.frame.width > min
            }),
        );
        assert!(evaluator.has_predicate("wide"));
        assert!(evaluator.check(&condition, &window(), noon()));
    }

    #[test]
    fn test_validate() {
        assert!(Condition::app_is("x").weighted(0.0).validate().is_err());
        let bad = Condition::new(ConditionCheck::App { op: StringOp::Matches, value: "(".into() });
        assert!(bad.validate().is_err());
        assert!(Condition::title_contains("x").validate().is_ok());
    }

    #[test]
    fn test_condition_serde_shape() {
        let condition: Condition = serde_json::from_str(
            r#"{"field": "size", "dimension": "width", "op": "gt", "value": 800, "negate": true}"#,
        )
        .unwrap();
        assert!(condition.negate);
        assert!((condition.weight - 1.0).abs() < f64::EPSILON);
        assert!(matches!(condition.check, ConditionCheck::Size { dimension: Dimension::Width, .. }));
    }
}
