//! Evaluation worker pool.
//!
//! Requests are pushed onto a bounded queue that every worker drains. Each
//! request carries a oneshot reply channel; callers that gave up waiting
//! simply drop their receiver and the result is discarded.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};

use super::RulesInner;
use super::schedule::ClockTime;
use super::types::{RuleExecution, RuleTrigger};
use crate::placement::lifecycle::StopSignal;
use crate::placement::registry::Window;

/// One queued evaluation.
#[derive(Debug)]
pub(super) struct EvaluationRequest {
    pub window: Window,
    pub trigger: RuleTrigger,
    pub now: ClockTime,
    pub reply: oneshot::Sender<Vec<RuleExecution>>,
}

pub(super) type SharedReceiver = Arc<Mutex<mpsc::Receiver<EvaluationRequest>>>;

/// Drains the queue until stopped or every sender is gone.
pub(super) async fn run(index: usize, inner: Arc<RulesInner>, queue: SharedReceiver, mut stop: StopSignal) {
    tracing::trace!("rules: worker {index} started");
    loop {
        let request = tokio::select! {
            request = async { queue.lock().await.recv().await } => request,
            () = stop.stopped() => break,
        };
        let Some(request) = request else {
            break;
        };

        let executions = inner.run(&request.window, request.trigger, request.now).await;
        if request.reply.send(executions).is_err() {
            tracing::debug!(
                "rules: result for window {} arrived after the caller gave up",
                request.window.id
            );
        }
    }
    tracing::trace!("rules: worker {index} stopped");
}
