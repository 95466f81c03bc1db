//! CLI error types
//!
//! Subsystem errors keep their own codes in JSON error responses.

use std::io;

use thiserror::Error;

use crate::index::IndexError;
use crate::planner::PlannerError;
use crate::schema::SchemaError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file unreadable or invalid
    #[error("Config error: {0}")]
    Config(String),

    /// Request on stdin is not a valid plan request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// stdin/stdout failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema rejected a definition or record
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Index could not be built
    #[error("{0}")]
    Index(#[from] IndexError),

    /// Planning failed
    #[error("{0}")]
    Planner(#[from] PlannerError),
}

impl CliError {
    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// Invalid request
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        CliError::InvalidRequest(msg.into())
    }

    /// Stable error code for JSON responses
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "TIDE_CLI_CONFIG_ERROR",
            CliError::InvalidRequest(_) => "TIDE_CLI_INVALID_REQUEST",
            CliError::Io(_) => "TIDE_CLI_IO_ERROR",
            CliError::Json(_) => "TIDE_CLI_JSON_ERROR",
            CliError::Schema(e) => e.code().code(),
            CliError::Index(e) => e.code().code(),
            CliError::Planner(e) => e.code().code(),
        }
    }

    /// Message without the code prefix
    pub fn message(&self) -> String {
        match self {
            CliError::Config(m) | CliError::InvalidRequest(m) => m.clone(),
            CliError::Io(e) => e.to_string(),
            CliError::Json(e) => e.to_string(),
            CliError::Schema(e) => e.message().to_string(),
            CliError::Index(e) => e.message().to_string(),
            CliError::Planner(e) => e.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexId;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::config_error("x").code(), "TIDE_CLI_CONFIG_ERROR");
        assert_eq!(CliError::invalid_request("x").code(), "TIDE_CLI_INVALID_REQUEST");

        let err: CliError = PlannerError::missing_index(IndexId(1), "AGE").into();
        assert_eq!(err.code(), "TIDE_PLAN_INVARIANT_VIOLATION");
        assert!(err.message().contains("AGE"));
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("Invalid log_level");
        assert_eq!(err.to_string(), "Config error: Invalid log_level");

        let err: CliError = PlannerError::unknown_operator("~").into();
        assert!(err.to_string().contains("TIDE_PLAN_MALFORMED_PREDICATE"));
    }
}
