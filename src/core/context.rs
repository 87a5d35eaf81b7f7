//! Scan context: the state one analysis pass needs
//!
//! Fee schedules, the cooldown registry, the holding horizon and the filters
//! are built once from `AppConfig` and handed to every pass, so nothing in
//! the engine reads process-wide state.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;

use super::cooldown::{Clock, CooldownManager, SystemClock};
use super::finder::{OpportunityFilters, OpportunityFinder};
use super::imbalance::PositionImbalanceDetector;
use super::lifecycle::{LifecycleAction, PositionLifecycle, TrackedPosition};
use super::types::{DexId, FeeTable, FundingQuote, Opportunity};

/// Everything an analysis pass reads, owned in one place.
#[derive(Debug)]
pub struct ScanContext {
    fees: FeeTable,
    default_intervals: HashMap<DexId, Decimal>,
    filters: OpportunityFilters,
    holding_horizon_seconds: Decimal,
    finder: OpportunityFinder,
    lifecycle: PositionLifecycle,
}

impl ScanContext {
    /// Build from a validated configuration using the wall clock.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Build with an injected clock (tests drive cooldown expiry with it).
    pub fn from_config_with_clock(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let mut fees = FeeTable::new();
        let mut default_intervals = HashMap::new();
        for (dex, dex_config) in &config.dexes {
            let id: DexId = Arc::from(dex.as_str());
            fees.insert(id.clone(), dex_config.fees());
            if let Some(hours) = dex_config.funding_interval_hours {
                default_intervals.insert(id, hours);
            }
        }

        let cooldowns = Arc::new(CooldownManager::with_clock(clock));
        let finder = OpportunityFinder::new(cooldowns.clone(), config.scanner.cooldown_minutes)
            .with_taker_fees(config.scanner.use_taker_fees);
        let lifecycle = PositionLifecycle::new(
            PositionImbalanceDetector::new(config.scanner.imbalance_threshold),
            cooldowns,
        );

        info!(
            dexes = fees.len(),
            horizon_hours = %config.scanner.holding_horizon_hours,
            cooldown_minutes = config.scanner.cooldown_minutes,
            use_taker = config.scanner.use_taker_fees,
            "[CONFIG] Scan context ready"
        );

        Ok(Self {
            fees,
            default_intervals,
            filters: config.filters.clone(),
            holding_horizon_seconds: config.scanner.holding_horizon_seconds(),
            finder,
            lifecycle,
        })
    }

    /// Run one analysis pass over a snapshot of quotes.
    pub fn scan(&self, quotes: &[FundingQuote]) -> Vec<Opportunity> {
        self.scan_with(quotes, &self.filters)
    }

    /// Run one analysis pass with caller-supplied filters.
    pub fn scan_with(&self, quotes: &[FundingQuote], filters: &OpportunityFilters) -> Vec<Opportunity> {
        self.finder.find_opportunities(quotes, &self.fees, self.holding_horizon_seconds, filters)
    }

    /// Evaluate an open position; a forced close puts its symbol on cooldown.
    pub fn evaluate_position(&self, position: &TrackedPosition) -> LifecycleAction {
        self.lifecycle.evaluate(position)
    }

    /// Record a failed open or close for a symbol.
    pub fn record_failure(&self, symbol: &str) {
        self.lifecycle.record_failure(symbol);
    }

    /// Drop cooldown entries that have expired; returns how many were removed.
    pub fn cleanup_cooldowns(&self) -> usize {
        self.finder
            .cooldowns()
            .cleanup_expired(self.finder.cooldown_minutes())
    }

    pub fn fees(&self) -> &FeeTable {
        &self.fees
    }

    /// Funding interval assumed for a DEX whose source omits one.
    pub fn default_intervals(&self) -> &HashMap<DexId, Decimal> {
        &self.default_intervals
    }

    pub fn filters(&self) -> &OpportunityFilters {
        &self.filters
    }

    pub fn holding_horizon_seconds(&self) -> Decimal {
        self.holding_horizon_seconds
    }

    pub fn cooldowns(&self) -> &Arc<CooldownManager> {
        self.finder.cooldowns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DexConfig, ScannerConfig};
    use crate::core::cooldown::ManualClock;
    use rust_decimal_macros::dec;

    fn config() -> AppConfig {
        let mut dexes = HashMap::new();
        dexes.insert(
            "hyperliquid".to_string(),
            DexConfig {
                maker_fee: dec!(0.0001),
                taker_fee: dec!(0.0002),
                funding_interval_hours: Some(dec!(1)),
            },
        );
        dexes.insert(
            "paradex".to_string(),
            DexConfig {
                maker_fee: dec!(0.0001),
                taker_fee: dec!(0.0002),
                funding_interval_hours: None,
            },
        );
        AppConfig {
            scanner: ScannerConfig::default(),
            dexes,
            ..Default::default()
        }
    }

    fn quotes() -> Vec<FundingQuote> {
        vec![
            FundingQuote::new("BTC", "hyperliquid", dec!(0.0001), dec!(1)),
            FundingQuote::new("BTC", "paradex", dec!(0.002), dec!(8)),
        ]
    }

    #[test]
    fn test_context_from_config() {
        let ctx = ScanContext::from_config(&config()).unwrap();
        assert_eq!(ctx.fees().len(), 2);
        assert_eq!(ctx.holding_horizon_seconds(), dec!(28800));
        assert_eq!(ctx.default_intervals().len(), 1);
        assert_eq!(ctx.default_intervals().get("hyperliquid"), Some(&dec!(1)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = config();
        cfg.filters.limit = 0;
        assert!(ScanContext::from_config(&cfg).is_err());
    }

    #[test]
    fn test_scan_finds_pair() {
        let ctx = ScanContext::from_config(&config()).unwrap();
        let opps = ctx.scan(&quotes());
        assert_eq!(opps.len(), 1);
        assert_eq!(&*opps[0].long_dex, "hyperliquid");
        assert_eq!(&*opps[0].short_dex, "paradex");
    }

    #[test]
    fn test_failure_suppresses_until_expiry() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let ctx = ScanContext::from_config_with_clock(&config(), clock.clone()).unwrap();

        ctx.record_failure("BTC");
        assert!(ctx.scan(&quotes()).is_empty());

        clock.advance_minutes(31);
        assert_eq!(ctx.cleanup_cooldowns(), 1);
        assert_eq!(ctx.scan(&quotes()).len(), 1);
    }
}
