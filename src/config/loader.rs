//! Configuration loader for YAML files
//!
//! This module handles loading and validating configuration from YAML files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::AppConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Validates the configuration rules
///
/// # Arguments
/// * `path` - YAML file holding the scanner, filters, DEX fee schedules and sources
///
/// # Returns
/// * `Ok(AppConfig)` - Parsed configuration that passed `AppConfig::validate`
/// * `Err(AppError::Config)` - Missing file, YAML error, or a rule violation
/// * `Err(AppError::Io)` - The file exists but could not be opened
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use funding_arb::config::load_config;
///
/// let config = load_config(Path::new("config.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let config: AppConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Same parsing and validation as [`load_config`], without the file access.
///
/// # Arguments
/// * `yaml_content` - Configuration document as text
///
/// # Returns
/// * `Ok(AppConfig)` - Parsed and validated configuration
/// * `Err(AppError::Config)` - YAML error or a rule violation
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================
