//! Runtime constants with environment variable overrides
//!
//! Values here tune the scan loop itself rather than the analysis, so they
//! live outside `config.yaml` and can be changed per deployment.

use std::path::PathBuf;
use std::time::Duration;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

// =============================================================================
// Files
// =============================================================================

/// Path to the YAML configuration (default: `config.yaml`)
///
/// Environment variable: `CONFIG_PATH`
pub fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yaml"))
}

// =============================================================================
// Scan Loop
// =============================================================================

/// Override for `scanner.scan_interval_secs`, if set
///
/// Environment variable: `SCAN_INTERVAL_SECS`
pub fn scan_interval_override() -> Option<Duration> {
    env_parse::<u64>("SCAN_INTERVAL_SECS")
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

/// Cooldown map sweep interval (default: 5 minutes)
///
/// Environment variable: `COOLDOWN_CLEANUP_INTERVAL_SECS`
pub fn cooldown_cleanup_interval() -> Duration {
    Duration::from_secs(env_parse("COOLDOWN_CLEANUP_INTERVAL_SECS").unwrap_or(300))
}

/// Per-source fetch deadline (default: 5000ms)
///
/// Environment variable: `SOURCE_TIMEOUT_MS`
pub fn source_timeout() -> Duration {
    Duration::from_millis(env_parse("SOURCE_TIMEOUT_MS").unwrap_or(5000))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Print all runtime values (for startup logs)
pub fn log_configuration() {
    tracing::info!("=== Runtime Configuration ===");
    tracing::info!("  - Config path: {}", config_path().display());
    tracing::info!("  - Scan interval override: {:?}", scan_interval_override());
    tracing::info!("  - Cooldown cleanup interval: {:?}", cooldown_cleanup_interval());
    tracing::info!("  - Source timeout: {:?}", source_timeout());
    tracing::info!("=============================");
}
