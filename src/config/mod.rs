//! Configuration module for scanner settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `ScannerConfig`, `DexConfig`, `SourceConfig`)
//! - YAML loading functionality (`load_config`)
//! - Logging configuration (`init_logging`)
//! - Runtime constants with environment variable overrides

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, DexConfig, ScannerConfig, SourceConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};

// Re-export logging functions
pub use logging::init_logging;
