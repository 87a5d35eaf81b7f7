//! Application-wide error types using thiserror
//!
//! All errors in the application should be wrapped in AppError
//! to provide consistent error handling across the codebase.

use crate::adapters::errors::SourceError;
use crate::core::errors::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_error_converts_to_app_error() {
        let source_err = SourceError::Timeout(5000);
        let app_err: AppError = source_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Source error"), "Got: {}", msg);
        assert!(msg.contains("5000ms"), "Got: {}", msg);
    }

    #[test]
    fn test_engine_error_converts_to_app_error() {
        let engine_err = EngineError::InvalidInterval {
            interval_hours: dec!(0),
        };
        let app_err: AppError = engine_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Engine error"), "Got: {}", msg);
        assert!(msg.contains("funding interval"), "Got: {}", msg);
    }

    #[test]
    fn test_serde_error_converts_to_app_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = serde_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Serialization error"), "Got: {}", msg);
    }

    #[test]
    fn test_io_error_converts_to_app_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let app_err: AppError = io_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("IO error"), "Got: {}", msg);
        assert!(msg.contains("file missing"), "Got: {}", msg);
    }

    #[test]
    fn test_config_error_display() {
        let app_err = AppError::Config("missing dexes".into());
        assert_eq!(app_err.to_string(), "Configuration error: missing dexes");
    }

    #[test]
    fn test_question_mark_propagation() {
        fn inner() -> Result<()> {
            Err(SourceError::InvalidResponse("empty body".into()))?
        }
        assert!(matches!(inner(), Err(AppError::Source(_))));
    }
}
