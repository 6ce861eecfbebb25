//! Distribution strategies - policies assigning windows to monitors.
//!
//! Every strategy receives the windows to place and the connected monitors
//! (sorted by id) and returns a complete assignment. Strategies never fail on
//! an empty monitor list; they simply return an empty assignment.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::Monitor;
use crate::placement::advisor::{AdvisorRequest, AdvisorTopic, SharedAdvisor, consult};
use crate::placement::error::PlacementResult;
use crate::placement::registry::Window;
use crate::placement::{MonitorId, WindowId};

/// Window → monitor assignment produced by a strategy.
pub type Assignment = BTreeMap<WindowId, MonitorId>;

pub const BALANCED: &str = "balanced";
pub const PRIMARY_FOCUSED: &str = "primary-focused";
pub const APPLICATION_AWARE: &str = "application-aware";
pub const CONTEXT_AWARE: &str = "context-aware";
pub const ADVISOR_OPTIMIZED: &str = "advisor-optimized";

/// Inputs shared by all strategies for one distribution run.
#[derive(Clone)]
pub struct DistributionContext {
    /// Local hour of day, 0-23.
    pub hour: u32,
    pub advisor: Option<SharedAdvisor>,
    pub advisor_timeout: Duration,
}

impl std::fmt::Debug for DistributionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionContext")
            .field("hour", &self.hour)
            .field("advisor", &self.advisor.is_some())
            .field("advisor_timeout", &self.advisor_timeout)
            .finish()
    }
}

/// A policy that assigns windows to monitors.
pub trait DistributionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Assigns every window in `windows` to one of `monitors`.
    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>>;
}

fn primary_of(monitors: &[Monitor]) -> Option<&Monitor> {
    monitors.iter().find(|m| m.is_primary).or_else(|| monitors.first())
}

/// Number of windows the primary receives under the primary-focused policy.
///
/// `ceil(0.7 * n)` in integer arithmetic.
#[must_use]
pub const fn primary_share(count: usize) -> usize { (count * 7).div_ceil(10) }

// ============================================================================
// Balanced
// ============================================================================

/// Round-robin over monitors sorted by id.
#[derive(Debug, Default, Clone, Copy)]
pub struct Balanced;

impl Balanced {
    fn assign(windows: &[Window], monitors: &[Monitor]) -> Assignment {
        if monitors.is_empty() {
            return Assignment::new();
        }
        let mut sorted: Vec<MonitorId> = monitors.iter().map(|m| m.id).collect();
        sorted.sort_unstable();
        windows
            .iter()
            .enumerate()
            .map(|(i, window)| (window.id, sorted[i % sorted.len()]))
            .collect()
    }
}

impl DistributionStrategy for Balanced {
    fn name(&self) -> &'static str { BALANCED }

    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        _context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>> {
        Box::pin(async move { Ok(Self::assign(windows, monitors)) })
    }
}

// ============================================================================
// Primary Focused
// ============================================================================

/// 70% of the windows on the primary, the rest round-robin over secondaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryFocused;

impl PrimaryFocused {
    fn assign(windows: &[Window], monitors: &[Monitor]) -> Assignment {
        let Some(primary) = primary_of(monitors) else {
            return Assignment::new();
        };
        let mut secondaries: Vec<MonitorId> =
            monitors.iter().filter(|m| m.id != primary.id).map(|m| m.id).collect();
        secondaries.sort_unstable();

        let share = primary_share(windows.len());
        windows
            .iter()
            .enumerate()
            .map(|(i, window)| {
                let monitor = if i < share || secondaries.is_empty() {
                    primary.id
                } else {
                    secondaries[(i - share) % secondaries.len()]
                };
                (window.id, monitor)
            })
            .collect()
    }
}

impl DistributionStrategy for PrimaryFocused {
    fn name(&self) -> &'static str { PRIMARY_FOCUSED }

    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        _context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>> {
        Box::pin(async move { Ok(Self::assign(windows, monitors)) })
    }
}

// ============================================================================
// Application Aware
// ============================================================================

/// Kind of monitor an application prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MonitorRole {
    Primary,
    /// The lowest-id non-primary monitor.
    Secondary,
    /// The monitor with the most pixels.
    Largest,
    /// The monitor with the fewest pixels.
    Smallest,
    /// The first monitor taller than wide.
    Portrait,
}

impl MonitorRole {
    fn resolve(self, monitors: &[Monitor]) -> Option<MonitorId> {
        let primary = primary_of(monitors)?;
        let found = match self {
            Self::Primary => Some(primary),
            Self::Secondary => monitors.iter().filter(|m| m.id != primary.id).min_by_key(|m| m.id),
            Self::Largest => monitors.iter().max_by(|a, b| a.area().total_cmp(&b.area())),
            Self::Smallest => monitors.iter().min_by(|a, b| a.area().total_cmp(&b.area())),
            Self::Portrait => monitors.iter().find(|m| m.is_portrait()),
        };
        Some(found.unwrap_or(primary).id)
    }
}

/// Maps an application name to its preferred monitor role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AppMonitorRule {
    /// Application name, matched case-insensitively as a substring.
    pub app: String,
    pub role: MonitorRole,
}

impl AppMonitorRule {
    #[must_use]
    pub fn new(app: impl Into<String>, role: MonitorRole) -> Self { Self { app: app.into(), role } }

    fn matches(&self, app: &str) -> bool { app.to_lowercase().contains(&self.app.to_lowercase()) }
}

/// Default application → role table.
#[must_use]
pub fn default_app_rules() -> Vec<AppMonitorRule> {
    vec![
        AppMonitorRule::new("code", MonitorRole::Primary),
        AppMonitorRule::new("editor", MonitorRole::Primary),
        AppMonitorRule::new("browser", MonitorRole::Largest),
        AppMonitorRule::new("terminal", MonitorRole::Secondary),
        AppMonitorRule::new("chat", MonitorRole::Secondary),
        AppMonitorRule::new("mail", MonitorRole::Secondary),
        AppMonitorRule::new("music", MonitorRole::Smallest),
        AppMonitorRule::new("log", MonitorRole::Portrait),
    ]
}

/// Places windows by a static per-application table; the rest are balanced.
#[derive(Debug, Clone)]
pub struct ApplicationAware {
    rules: Vec<AppMonitorRule>,
}

impl ApplicationAware {
    #[must_use]
    pub const fn new(rules: Vec<AppMonitorRule>) -> Self { Self { rules } }

    fn assign(&self, windows: &[Window], monitors: &[Monitor]) -> Assignment {
        let mut assignment = Assignment::new();
        let mut unmatched = Vec::new();

        for window in windows {
            let target = self
                .rules
                .iter()
                .find(|rule| rule.matches(&window.app))
                .and_then(|rule| rule.role.resolve(monitors));
            match target {
                Some(monitor) => {
                    assignment.insert(window.id, monitor);
                }
                None => unmatched.push(window.clone()),
            }
        }

        assignment.extend(Balanced::assign(&unmatched, monitors));
        assignment
    }
}

impl DistributionStrategy for ApplicationAware {
    fn name(&self) -> &'static str { APPLICATION_AWARE }

    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        _context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>> {
        Box::pin(async move { Ok(self.assign(windows, monitors)) })
    }
}

// ============================================================================
// Context Aware
// ============================================================================

/// Work hours (inclusive start, exclusive end).
const WORK_HOURS: std::ops::Range<u32> = 9..17;
/// Evening hours (inclusive start, exclusive end).
const EVENING_HOURS: std::ops::Range<u32> = 17..22;

/// Switches policy by time of day.
///
/// Work hours use primary-focused, evenings application-aware, everything
/// else balanced.
#[derive(Debug, Clone)]
pub struct ContextAware {
    application: ApplicationAware,
}

impl ContextAware {
    #[must_use]
    pub const fn new(rules: Vec<AppMonitorRule>) -> Self {
        Self { application: ApplicationAware::new(rules) }
    }

    /// Name of the policy used at `hour`.
    #[must_use]
    pub fn policy_for(hour: u32) -> &'static str {
        if WORK_HOURS.contains(&hour) {
            PRIMARY_FOCUSED
        } else if EVENING_HOURS.contains(&hour) {
            APPLICATION_AWARE
        } else {
            BALANCED
        }
    }
}

impl DistributionStrategy for ContextAware {
    fn name(&self) -> &'static str { CONTEXT_AWARE }

    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>> {
        Box::pin(async move {
            let assignment = match Self::policy_for(context.hour) {
                PRIMARY_FOCUSED => PrimaryFocused::assign(windows, monitors),
                APPLICATION_AWARE => self.application.assign(windows, monitors),
                _ => Balanced::assign(windows, monitors),
            };
            Ok(assignment)
        })
    }
}

// ============================================================================
// Advisor Optimized
// ============================================================================

/// Delegates to the external advisor.
///
/// The advisor must answer `{"assignments": {"<window id>": <monitor id>}}`
/// covering every window with known monitors; anything less falls back to
/// balanced.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdvisorOptimized;

impl AdvisorOptimized {
    fn request(windows: &[Window], monitors: &[Monitor]) -> AdvisorRequest {
        let windows: Vec<Value> = windows
            .iter()
            .map(|w| json!({ "id": w.id, "app": w.app, "title": w.title }))
            .collect();
        let monitors: Vec<Value> = monitors
            .iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "name": m.name,
                    "width": m.resolution.width,
                    "height": m.resolution.height,
                    "primary": m.is_primary,
                })
            })
            .collect();
        AdvisorRequest::new(
            AdvisorTopic::MonitorDistribution,
            json!({ "windows": windows, "monitors": monitors }),
        )
    }

    /// Parses a complete assignment, or `None` if it is partial or invalid.
    fn parse(answer: &Value, windows: &[Window], monitors: &[Monitor]) -> Option<Assignment> {
        let table = answer.get("assignments")?.as_object()?;
        let mut assignment = Assignment::new();
        for window in windows {
            let monitor = table.get(&window.id.to_string())?.as_u64()?;
            let monitor = MonitorId::try_from(monitor).ok()?;
            if !monitors.iter().any(|m| m.id == monitor) {
                return None;
            }
            assignment.insert(window.id, monitor);
        }
        Some(assignment)
    }
}

impl DistributionStrategy for AdvisorOptimized {
    fn name(&self) -> &'static str { ADVISOR_OPTIMIZED }

    fn distribute<'a>(
        &'a self,
        windows: &'a [Window],
        monitors: &'a [Monitor],
        context: &'a DistributionContext,
    ) -> BoxFuture<'a, PlacementResult<Assignment>> {
        Box::pin(async move {
            if windows.is_empty() || monitors.is_empty() {
                return Ok(Assignment::new());
            }
            let request = Self::request(windows, monitors);
            let answer =
                consult(context.advisor.as_ref(), request, context.advisor_timeout).await;

            match answer.and_then(|value| Self::parse(&value, windows, monitors)) {
                Some(assignment) => Ok(assignment),
                None => {
                    tracing::debug!("monitors: advisor assignment unusable, falling back to balanced");
                    Ok(Balanced::assign(windows, monitors))
                }
            }
        })
    }
}
