//! Error types for the Tessel binary and library entry points.
//!
//! Subsystems return their own errors ([`PlacementError`], [`ConfigError`]);
//! the CLI folds them into [`TesselError`].

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::placement::PlacementError;

/// Errors surfaced by the command-line interface.
#[derive(Debug, Error)]
pub enum TesselError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),

    /// The configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A placement operation failed.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine-readable error for `--json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl TesselError {
    /// Short kind name used in JSON output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "invalidArguments",
            Self::Config(_) => "config",
            Self::Placement(_) => "placement",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    #[must_use]
    pub fn report(&self) -> ErrorReport { ErrorReport { kind: self.kind(), message: self.to_string() } }
}

impl From<String> for TesselError {
    fn from(msg: String) -> Self { Self::InvalidArguments(msg) }
}

impl From<&str> for TesselError {
    fn from(msg: &str) -> Self { Self::InvalidArguments(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::error::EntityKind;

    #[test]
    fn test_placement_error_is_transparent() {
        let err: TesselError = PlacementError::not_found(EntityKind::Window, 7).into();
        assert_eq!(err.to_string(), "window '7' not found");
        assert_eq!(err.kind(), "placement");
    }

    #[test]
    fn test_config_error_display() {
        let err: TesselError = ConfigError::Invalid("rules.workers must be at least 1".to_string()).into();
        let msg = err.to_string();
        assert!(msg.starts_with("configuration error"));
        assert!(msg.contains("rules.workers"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: TesselError = io_err.into();
        assert!(matches!(err, TesselError::Io(_)));
    }

    #[test]
    fn test_from_str() {
        let err: TesselError = "need at least one monitor".into();
        assert!(matches!(err, TesselError::InvalidArguments(_)));
    }

    #[test]
    fn test_report_serializes_kind() {
        let err = TesselError::InvalidArguments("bad".to_string());
        let json = serde_json::to_string(&err.report()).unwrap();
        assert_eq!(json, r#"{"kind":"invalidArguments","message":"bad"}"#);
    }
}
