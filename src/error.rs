//! Error types for coderefine
//!
//! Centralized error handling using thiserror. Only failures that stop work
//! before it begins live here: sandbox timeouts, non-zero exits and cleanup
//! problems are absorbed into `ExecutionResult` instead.

use std::time::Duration;

use thiserror::Error;

use crate::llm::LlmError;

/// All error types that can occur in coderefine
#[derive(Debug, Error)]
pub enum RefineError {
    /// Malformed or out-of-range parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generator or evaluator call failed
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Generator or evaluator did not answer in time
    #[error("Oracle timed out after {0:?}")]
    OracleTimeout(Duration),

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<LlmError> for RefineError {
    fn from(err: LlmError) -> Self {
        RefineError::Oracle(err.to_string())
    }
}

/// Result type alias for coderefine operations
pub type Result<T> = std::result::Result<T, RefineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = RefineError::Validation("timeout must be <= 30".to_string());
        assert_eq!(err.to_string(), "Validation error: timeout must be <= 30");
    }

    #[test]
    fn test_oracle_error() {
        let err = RefineError::Oracle("rate limited".to_string());
        assert_eq!(err.to_string(), "Oracle error: rate limited");
    }

    #[test]
    fn test_oracle_timeout_error() {
        let err = RefineError::OracleTimeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Oracle timed out after 5s");
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: RefineError = LlmError::InvalidResponse("no choices".to_string()).into();
        assert!(matches!(err, RefineError::Oracle(_)));
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RefineError = io_err.into();
        assert!(matches!(err, RefineError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: RefineError = json_err.into();
        assert!(matches!(err, RefineError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(RefineError::Config("missing".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
