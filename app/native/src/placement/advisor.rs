//! Boundary to the optional external advisor.
//!
//! The advisor answers free-form recommendation requests (tiling algorithm,
//! snap zones, monitor assignments, focus ranking) with a JSON value. Every
//! call site treats it as best-effort: requests are time-boxed and any failure
//! falls back to the local heuristic.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use super::error::{PlacementError, PlacementResult};

/// What the advisor is being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisorTopic {
    TilingAlgorithm,
    SnapZones,
    MonitorDistribution,
    FocusPrediction,
}

impl fmt::Display for AdvisorTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TilingAlgorithm => "tiling-algorithm",
            Self::SnapZones => "snap-zones",
            Self::MonitorDistribution => "monitor-distribution",
            Self::FocusPrediction => "focus-prediction",
        };
        f.write_str(name)
    }
}

/// A recommendation request.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorRequest {
    pub topic: AdvisorTopic,
    pub context: Value,
}

impl AdvisorRequest {
    #[must_use]
    pub const fn new(topic: AdvisorTopic, context: Value) -> Self { Self { topic, context } }
}

/// An external recommendation service.
pub trait Advisor: Send + Sync {
    /// Produces a suggestion for the request.
    fn recommend(&self, request: AdvisorRequest) -> BoxFuture<'_, PlacementResult<Value>>;
}

/// Shared handle to an advisor.
pub type SharedAdvisor = Arc<dyn Advisor>;

/// Asks the advisor, bounded by `timeout`.
///
/// Returns `None` when no advisor is configured, the call fails or it does
/// not answer in time. Failures are logged at debug level only.
pub async fn consult(
    advisor: Option<&SharedAdvisor>,
    request: AdvisorRequest,
    timeout: Duration,
) -> Option<Value> {
    let advisor = advisor?;
    let topic = request.topic;

    let result = match tokio::time::timeout(timeout, advisor.recommend(request)).await {
        Ok(result) => result,
        Err(_) => Err(PlacementError::AdvisorTimeout(timeout)),
    };

    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!("advisor: {topic} request failed, using fallback: {err}");
            None
        }
    }
}

/// Advisor that always answers with a fixed value.
///
/// Useful for simulations and tests.
#[derive(Debug, Clone)]
pub struct StaticAdvisor {
    responses: Vec<(AdvisorTopic, Value)>,
    delay: Option<Duration>,
}

impl StaticAdvisor {
    #[must_use]
    pub const fn new() -> Self { Self { responses: Vec::new(), delay: None } }

    /// Answers requests on `topic` with `value`.
    #[must_use]
    pub fn with_response(mut self, topic: AdvisorTopic, value: Value) -> Self {
        self.responses.retain(|(t, _)| *t != topic);
        self.responses.push((topic, value));
        self
    }

    /// Delays every answer by `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for StaticAdvisor {
    fn default() -> Self { Self::new() }
}

impl Advisor for StaticAdvisor {
    fn recommend(&self, request: AdvisorRequest) -> BoxFuture<'_, PlacementResult<Value>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .iter()
                .find(|(topic, _)| *topic == request.topic)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| {
                    PlacementError::AdvisorUnavailable(format!("no answer for {}", request.topic))
                })
        })
    }
}
