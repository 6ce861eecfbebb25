//! Window rules engine.
//!
//! Rules pair weighted conditions with a list of actions. Lifecycle events are
//! queued for a pool of workers, which evaluate every enabled rule listening
//! to the event (highest priority first) and run the actions of each match
//! in order. Callers wait for the outcome up to the evaluation timeout.
//!
//! A `Manual` evaluation ignores trigger sets; schedules and conditions
//! still apply.

mod condition;
mod schedule;
mod types;
mod worker;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
pub use condition::{
    Axis, Compare, Condition, ConditionCheck, ConditionEvaluator, CustomPredicate, Dimension,
    MATCH_THRESHOLD, StringOp,
};
use parking_lot::{Mutex, RwLock};
pub use schedule::{ClockTime, Day, Schedule};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
pub use types::{RuleAction, RuleExecution, RuleStats, RuleTrigger, WindowRule};
use uuid::Uuid;

use super::actions::ActionExecutor;
use super::error::{EntityKind, PlacementError, PlacementResult};
use super::history::BoundedHistory;
use super::lifecycle::{ComponentStatus, Lifecycle, TaskGroup};
use super::registry::Window;
use crate::config::RulesConfig;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesSettings {
    pub workers: usize,
    pub evaluation_timeout: Duration,
    pub queue_capacity: usize,
    pub history_limit: usize,
}

impl From<&RulesConfig> for RulesSettings {
    fn from(config: &RulesConfig) -> Self {
        Self {
            workers: config.workers,
            evaluation_timeout: Duration::from_millis(config.evaluation_timeout_ms),
            queue_capacity: config.queue_capacity,
            history_limit: config.history_limit,
        }
    }
}

/// Summary for status reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesStats {
    pub rules: usize,
    pub enabled: usize,
    pub executions: usize,
    pub failures: usize,
}

pub(super) struct RulesInner {
    /// Sorted by priority, highest first; insertion order breaks ties.
    rules: RwLock<Vec<WindowRule>>,
    evaluator: ConditionEvaluator,
    executor: Arc<dyn ActionExecutor>,
    history: Mutex<BoundedHistory<RuleExecution>>,
    settings: RulesSettings,
    queue: Mutex<Option<mpsc::Sender<worker::EvaluationRequest>>>,
    tasks: TaskGroup,
}

/// Shared handle to the rules engine.
#[derive(Clone)]
pub struct RulesEngine {
    inner: Arc<RulesInner>,
}

fn validate_rule(rule: &WindowRule) -> PlacementResult<()> {
    if rule.id.trim().is_empty() {
        return Err(PlacementError::invalid_config("rule id must not be empty"));
    }
    if rule.actions.is_empty() {
        return Err(PlacementError::invalid_config(format!(
            "rule '{}' has no actions",
            rule.id
        )));
    }
    for condition in &rule.conditions {
        condition.validate()?;
    }
    if let Some(schedule) = &rule.schedule {
        schedule.validate()?;
    }
    Ok(())
}

impl RulesEngine {
    /// Creates an engine with the configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for zero workers or
    /// queue capacity, and for any invalid rule.
    pub fn new(config: &RulesConfig, executor: Arc<dyn ActionExecutor>) -> PlacementResult<Self> {
        let settings = RulesSettings::from(config);
        if settings.workers == 0 {
            return Err(PlacementError::invalid_config("rules.workers must be at least 1"));
        }
        if settings.queue_capacity == 0 {
            return Err(PlacementError::invalid_config("rules.queueCapacity must be at least 1"));
        }

        let engine = Self {
            inner: Arc::new(RulesInner {
                rules: RwLock::new(Vec::new()),
                evaluator: ConditionEvaluator::new(),
                executor,
                history: Mutex::new(BoundedHistory::new(settings.history_limit)),
                settings,
                queue: Mutex::new(None),
                tasks: TaskGroup::new("rules"),
            }),
        };
        for rule in &config.rules {
            engine.add_rule(rule.clone())?;
        }
        Ok(engine)
    }

    // ========================================================================
    // Rule management
    // ========================================================================

    /// Adds a rule, replacing any rule with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] if the rule is invalid.
    pub fn add_rule(&self, mut rule: WindowRule) -> PlacementResult<Option<WindowRule>> {
        validate_rule(&rule)?;
        let mut rules = self.inner.rules.write();
        let replaced = rules
            .iter()
            .position(|r| r.id == rule.id)
            .map(|index| rules.remove(index));
        if let Some(previous) = &replaced {
            rule.stats = previous.stats.clone();
        }
        tracing::debug!("rules: registered '{}' (priority {})", rule.id, rule.priority);
        rules.push(rule);
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        drop(rules);
        Ok(replaced)
    }

    /// Removes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown id.
    pub fn remove_rule(&self, id: &str) -> PlacementResult<WindowRule> {
        let mut rules = self.inner.rules.write();
        let index = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Rule, id))?;
        Ok(rules.remove(index))
    }

    /// Enables or disables a rule.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown id.
    pub fn set_rule_enabled(&self, id: &str, enabled: bool) -> PlacementResult<()> {
        let mut rules = self.inner.rules.write();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PlacementError::not_found(EntityKind::Rule, id))?;
        rule.enabled = enabled;
        Ok(())
    }

    #[must_use]
    pub fn rule(&self, id: &str) -> Option<WindowRule> {
        self.inner.rules.read().iter().find(|r| r.id == id).cloned()
    }

    /// All rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> Vec<WindowRule> { self.inner.rules.read().clone() }

    #[must_use]
    pub fn rule_count(&self) -> usize { self.inner.rules.read().len() }

    /// Registers a predicate for `custom` conditions.
    pub fn register_predicate(&self, name: impl Into<String>, predicate: CustomPredicate) {
        self.inner.evaluator.register(name, predicate);
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Queues an evaluation at the current local time and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotRunning`] if the workers are not started
    /// and [`PlacementError::EvaluationTimeout`] if no result arrives in time.
    pub async fn evaluate(&self, window: &Window, trigger: RuleTrigger) -> PlacementResult<Vec<RuleExecution>> {
        self.evaluate_at(window, trigger, ClockTime::now()).await
    }

    /// Like [`Self::evaluate`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Self::evaluate`].
    pub async fn evaluate_at(
        &self,
        window: &Window,
        trigger: RuleTrigger,
        now: ClockTime,
    ) -> PlacementResult<Vec<RuleExecution>> {
        let sender = self
            .inner
            .queue
            .lock()
            .clone()
            .ok_or_else(|| PlacementError::NotRunning("rules".to_string()))?;
        let timeout = self.inner.settings.evaluation_timeout;
        let (reply, response) = oneshot::channel();
        let request = worker::EvaluationRequest { window: window.clone(), trigger, now, reply };

        let exchange = async move {
            sender
                .send(request)
                .await
                .map_err(|_| PlacementError::NotRunning("rules".to_string()))?;
            response.await.map_err(|_| PlacementError::NotRunning("rules".to_string()))
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("rules: evaluation for window {} timed out after {timeout:?}", window.id);
                Err(PlacementError::EvaluationTimeout(timeout))
            }
        }
    }

    /// Evaluates on the calling task, bypassing the queue.
    pub async fn evaluate_inline(&self, window: &Window, trigger: RuleTrigger, now: ClockTime) -> Vec<RuleExecution> {
        self.inner.run(window, trigger, now).await
    }

    /// Rules that would fire for `window`, without running any action.
    #[must_use]
    pub fn matching_rules(&self, window: &Window, trigger: RuleTrigger, now: ClockTime) -> Vec<String> {
        self.inner.matching(window, trigger, now).into_iter().map(|r| r.id).collect()
    }

    // ========================================================================
    // Stats
    // ========================================================================

    /// Retained executions, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<RuleExecution> { self.inner.history.lock().to_vec() }

    #[must_use]
    pub fn stats(&self) -> RulesStats {
        let rules = self.inner.rules.read();
        let history = self.inner.history.lock();
        RulesStats {
            rules: rules.len(),
            enabled: rules.iter().filter(|r| r.enabled).count(),
            executions: history.len(),
            failures: history.iter().filter(|e| !e.success).count(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &RulesSettings { &self.inner.settings }
}

impl RulesInner {
    fn matching(&self, window: &Window, trigger: RuleTrigger, now: ClockTime) -> Vec<WindowRule> {
        self.rules
            .read()
            .iter()
            .filter(|rule| rule.enabled)
            .filter(|rule| trigger == RuleTrigger::Manual || rule.listens_to(trigger))
            .filter(|rule| rule.schedule.as_ref().is_none_or(|s| s.is_active(now)))
            .filter(|rule| self.evaluator.matches(&rule.conditions, window, now))
            .cloned()
            .collect()
    }

    pub(super) async fn run(&self, window: &Window, trigger: RuleTrigger, now: ClockTime) -> Vec<RuleExecution> {
        let matched = self.matching(window, trigger, now);
        let mut executions = Vec::with_capacity(matched.len());

        for rule in matched {
            self.mark_matched(&rule.id);
            let execution = self.execute(&rule, window, trigger).await;
            self.history.lock().push(execution.clone());
            executions.push(execution);
        }
        executions
    }

    fn mark_matched(&self, id: &str) {
        if let Some(rule) = self.rules.write().iter_mut().find(|r| r.id == id) {
            rule.stats.match_count += 1;
            rule.stats.last_matched = Some(Utc::now());
        }
    }

    async fn execute(&self, rule: &WindowRule, window: &Window, trigger: RuleTrigger) -> RuleExecution {
        let started = Instant::now();
        let mut execution = RuleExecution {
            id: Uuid::now_v7(),
            rule_id: rule.id.clone(),
            window_id: window.id,
            trigger,
            at: Utc::now(),
            success: true,
            actions_run: 0,
            failed_action: None,
            error: None,
            duration: Duration::ZERO,
        };

        for step in &rule.actions {
            if step.delay_ms > 0 {
                tokio::time::sleep(step.delay()).await;
            }
            if let Err(err) = self.executor.execute(window.id, &step.action).await {
                tracing::warn!("rules: '{}' failed on window {}: {err}", rule.id, window.id);
                execution.success = false;
                execution.failed_action = Some(step.action.name().to_string());
                execution.error = Some(err.to_string());
                break;
            }
            execution.actions_run += 1;
        }

        execution.duration = started.elapsed();
        tracing::debug!(
            "rules: '{}' ran {} action(s) on window {} in {:?}",
            rule.id,
            execution.actions_run,
            window.id,
            execution.duration
        );
        execution
    }
}

impl Lifecycle for RulesEngine {
    fn name(&self) -> &'static str { "rules" }

    fn start(&self) -> PlacementResult<()> {
        let stop = self.inner.tasks.begin()?;
        let (sender, receiver) = mpsc::channel(self.inner.settings.queue_capacity);
        let receiver: worker::SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));

        for index in 0..self.inner.settings.workers {
            self.inner.tasks.spawn(worker::run(
                index,
                Arc::clone(&self.inner),
                Arc::clone(&receiver),
                stop.clone(),
            ));
        }
        *self.inner.queue.lock() = Some(sender);
        tracing::info!("rules: {} worker(s) started", self.inner.settings.workers);
        Ok(())
    }

    fn stop(&self) {
        if self.inner.tasks.halt() {
            self.inner.queue.lock().take();
        }
    }

    fn status(&self) -> ComponentStatus { self.inner.tasks.status() }
}

impl std::fmt::Debug for RulesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesEngine")
            .field("rules", &self.rule_count())
            .field("settings", &self.inner.settings)
            .field("evaluator", &self.inner.evaluator)
            .finish_non_exhaustive()
    }
}
