//! Logging configuration module
//!
//! Provides configurable JSON/Pretty logging output
//!
//! # Usage
//! ```ignore
//! use funding_arb::config::logging::init_logging;
//! init_logging();
//! ```
//!
//! # Environment Variables
//! - `LOG_FORMAT`: Output format - `json` (default) or `pretty`
//! - `RUST_LOG`: Log level filter (default: `info`)

use tracing_subscriber::EnvFilter;

/// Supported log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; anything but `pretty` means JSON.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// Initialize logging with configurable format
///
/// Reads `LOG_FORMAT` from environment:
/// - `json` (default): Machine-parseable JSON output for production
/// - `pretty`: Human-readable output for development
///
/// Also respects `RUST_LOG` for log level filtering (default: `info`)
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .pretty()
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .init();
        }
    }
}
