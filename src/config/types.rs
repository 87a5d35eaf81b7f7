//! Configuration types for the funding scanner
//!
//! This module defines all configuration structs that are loaded from YAML.
//! The scan loop builds its `ScanContext` from a validated `AppConfig` once
//! at startup.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::fees::flag_unconventional;
use crate::core::finder::{validate_horizon, OpportunityFilters};
use crate::core::imbalance::DEFAULT_IMBALANCE_THRESHOLD;
use crate::core::rate::SECONDS_PER_HOUR;
use crate::core::types::FeeStructure;
use crate::error::AppError;

// ============================================================================
// Scanner Settings
// ============================================================================

fn default_horizon_hours() -> Decimal {
    Decimal::from(8)
}

fn default_scan_interval_secs() -> u64 {
    30
}

fn default_cooldown_minutes() -> u64 {
    30
}

fn default_imbalance_threshold() -> Decimal {
    DEFAULT_IMBALANCE_THRESHOLD
}

fn default_use_taker() -> bool {
    true
}

/// Analysis pass settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannerConfig {
    /// Holding horizon used for gross profit (hours)
    #[serde(default = "default_horizon_hours")]
    pub holding_horizon_hours: Decimal,
    /// Seconds between analysis passes
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Minutes a symbol stays suppressed after a failure or forced unwind
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,
    /// Maximum leg size drift before a forced close (fraction, 0.05 = 5%)
    #[serde(default = "default_imbalance_threshold")]
    pub imbalance_threshold: Decimal,
    /// Price trades at taker fees (conservative) instead of maker
    #[serde(default = "default_use_taker")]
    pub use_taker_fees: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            holding_horizon_hours: default_horizon_hours(),
            scan_interval_secs: default_scan_interval_secs(),
            cooldown_minutes: default_cooldown_minutes(),
            imbalance_threshold: default_imbalance_threshold(),
            use_taker_fees: default_use_taker(),
        }
    }
}

impl ScannerConfig {
    pub fn holding_horizon_seconds(&self) -> Decimal {
        self.holding_horizon_hours
            .saturating_mul(Decimal::from(SECONDS_PER_HOUR))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_horizon(self.holding_horizon_seconds())?;

        if self.scan_interval_secs == 0 {
            return Err(AppError::Config(
                "scanner.scan_interval_secs must be > 0".to_string(),
            ));
        }

        // Rule: threshold in [0, 1); a fraction of 1 can never be exceeded
        if self.imbalance_threshold < Decimal::ZERO || self.imbalance_threshold >= Decimal::ONE {
            return Err(AppError::Config(format!(
                "scanner.imbalance_threshold must be >= 0 and < 1 (got {})",
                self.imbalance_threshold
            )));
        }

        Ok(())
    }
}

// ============================================================================
// DEX Settings
// ============================================================================

/// Per-DEX fee schedule and funding cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DexConfig {
    /// Maker fee as a fraction of notional (0.0002 = 0.02%)
    pub maker_fee: Decimal,
    /// Taker fee as a fraction of notional
    pub taker_fee: Decimal,
    /// Funding interval used when a source does not report one
    #[serde(default)]
    pub funding_interval_hours: Option<Decimal>,
}

impl DexConfig {
    pub fn fees(&self) -> FeeStructure {
        FeeStructure {
            maker_fee_percent: self.maker_fee,
            taker_fee_percent: self.taker_fee,
        }
    }

    pub fn validate(&self, dex: &str) -> Result<(), AppError> {
        self.fees().validate(dex)?;
        if let Some(hours) = self.funding_interval_hours {
            if hours <= Decimal::ZERO {
                return Err(AppError::Config(format!(
                    "DEX '{}': funding_interval_hours must be > 0 (got {})",
                    dex, hours
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Where a DEX's funding snapshot comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// JSON snapshot on disk, rewritten by an external collector
    File { dex: String, path: PathBuf },
    /// JSON snapshot served over HTTP
    Http {
        dex: String,
        url: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

impl SourceConfig {
    pub fn dex(&self) -> &str {
        match self {
            SourceConfig::File { dex, .. } | SourceConfig::Http { dex, .. } => dex,
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub filters: OpportunityFilters,
    /// DEX id → fee schedule
    #[serde(default)]
    pub dexes: HashMap<String, DexConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        self.scanner.validate()?;
        self.filters.validate()?;

        // Rule: at least one fee schedule, otherwise every candidate is unpriced
        if self.dexes.is_empty() {
            return Err(AppError::Config(
                "Configuration must contain at least one DEX fee schedule".to_string(),
            ));
        }
        for (dex, cfg) in &self.dexes {
            if dex.trim().is_empty() {
                return Err(AppError::Config("DEX id cannot be empty".to_string()));
            }
            cfg.validate(dex)?;
        }
        let schedules: Vec<(String, FeeStructure)> =
            self.dexes.iter().map(|(d, c)| (d.clone(), c.fees())).collect();
        flag_unconventional(schedules.iter().map(|(d, f)| (d.as_str(), f)));

        // Rule: no duplicate source per DEX
        let mut seen = HashSet::new();
        for source in &self.sources {
            let dex = source.dex();
            if dex.trim().is_empty() {
                return Err(AppError::Config("Source DEX id cannot be empty".to_string()));
            }
            if !seen.insert(dex) {
                return Err(AppError::Config(format!("Duplicate source for DEX: '{}'", dex)));
            }
            if !self.dexes.contains_key(dex) {
                warn!(
                    dex = dex,
                    "[CONFIG] Source has no fee schedule, its candidates will be unpriced"
                );
            }
            if let SourceConfig::Http { url, .. } = source {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(AppError::Config(format!(
                        "Source '{}': url must start with http:// or https:// (got {})",
                        dex, url
                    )));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
