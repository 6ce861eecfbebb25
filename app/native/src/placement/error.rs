//! Error types for the placement engine.
//!
//! Every public operation of the engine returns [`PlacementResult`]. The error
//! kinds map directly onto how callers are expected to react:
//!
//! - **Lookup errors** (`NotFound`): returned straight to the caller, never retried
//! - **Lifecycle errors** (`AlreadyRunning`, `NotRunning`, `NoRuntime`)
//! - **Advisor errors**: logged at debug level and always resolved by a fallback
//! - **Action errors** (`ActionFailed`, `Binding`): abort one rule/zone execution only
//! - **Evaluation timeouts**: the evaluation for that event is lost (at-most-once)
//! - **Configuration errors**: rejected when the orchestrator is constructed

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// The kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Window,
    Monitor,
    Zone,
    Rule,
    Layout,
    Algorithm,
    Strategy,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Window => "window",
            Self::Monitor => "monitor",
            Self::Zone => "snap zone",
            Self::Rule => "rule",
            Self::Layout => "layout",
            Self::Algorithm => "tiling algorithm",
            Self::Strategy => "distribution strategy",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during window placement operations.
#[derive(Debug, Clone, Error)]
pub enum PlacementError {
    /// An unknown window/monitor/zone/rule/layout id was referenced.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The id that was not found.
        id: String,
    },

    /// A component was started while already running.
    #[error("{0} is already running")]
    AlreadyRunning(String),

    /// A component that must be running was not.
    #[error("{0} is not running")]
    NotRunning(String),

    /// The external advisor failed or is not configured.
    #[error("advisor unavailable: {0}")]
    AdvisorUnavailable(String),

    /// The external advisor did not answer in time.
    #[error("advisor timed out after {0:?}")]
    AdvisorTimeout(Duration),

    /// A rule or snap action failed to execute.
    #[error("action '{action}' failed: {message}")]
    ActionFailed {
        /// Short name of the failing action.
        action: String,
        /// Error message reported by the executor.
        message: String,
    },

    /// A rules evaluation request was not answered in time.
    #[error("rule evaluation timed out after {0:?}")]
    EvaluationTimeout(Duration),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A tiling algorithm could not produce placements.
    #[error("layout failed: {0}")]
    Layout(String),

    /// The display-server binding rejected a command.
    #[error("display binding error: {0}")]
    Binding(String),

    /// A background component was started outside a Tokio runtime.
    #[error("no async runtime available to start {0}")]
    NoRuntime(String),
}

impl PlacementError {
    /// Creates a not-found error for the given entity.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    /// Creates an action failure error.
    #[must_use]
    pub fn action(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a layout error with the given message.
    #[must_use]
    pub fn layout(message: impl Into<String>) -> Self { Self::Layout(message.into()) }

    /// Creates a binding error with the given message.
    #[must_use]
    pub fn binding(message: impl Into<String>) -> Self { Self::Binding(message.into()) }

    /// Creates an invalid configuration error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Returns `true` if this error indicates a resource was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }

    /// Returns `true` if this error came from the external advisor.
    #[must_use]
    pub const fn is_advisor(&self) -> bool {
        matches!(self, Self::AdvisorUnavailable(_) | Self::AdvisorTimeout(_))
    }

    /// Returns `true` if the failure was caused by a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::AdvisorTimeout(_) | Self::EvaluationTimeout(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PlacementError::not_found(EntityKind::Window, 42).to_string(),
            "window '42' not found"
        );
        assert_eq!(
            PlacementError::not_found(EntityKind::Zone, "left-half").to_string(),
            "snap zone 'left-half' not found"
        );
        assert_eq!(
            PlacementError::AlreadyRunning("animator".to_string()).to_string(),
            "animator is already running"
        );
        assert_eq!(
            PlacementError::action("maximize", "window gone").to_string(),
            "action 'maximize' failed: window gone"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(PlacementError::not_found(EntityKind::Rule, "r1").is_not_found());
        assert!(!PlacementError::NotRunning("rules".into()).is_not_found());

        assert!(PlacementError::AdvisorTimeout(Duration::from_millis(5)).is_advisor());
        assert!(PlacementError::AdvisorUnavailable("offline".into()).is_advisor());
        assert!(!PlacementError::layout("empty").is_advisor());

        assert!(PlacementError::EvaluationTimeout(Duration::from_millis(5)).is_timeout());
        assert!(!PlacementError::binding("closed").is_timeout());
    }
}
