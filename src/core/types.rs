//! Core data types for the funding-rate opportunity pipeline.
//!
//! Quotes flow in from collection sources, opportunities flow out to the
//! scheduler and API layer. Symbols and DEX ids use `Arc<str>` so a
//! snapshot can be shared across concurrent analysis passes without copying.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::errors::{EngineError, EngineResult};
use crate::core::rate::normalize;

/// Venue identifier (e.g. "hyperliquid", "paradex", "lighter")
pub type DexId = Arc<str>;

/// Seconds in a (365 day) year, used for annualized figures
pub const SECONDS_PER_YEAR: i64 = 365 * 24 * 3600;

// =============================================================================
// Funding Quote (one DEX, one symbol)
// =============================================================================

/// One DEX's funding data for one symbol at one instant.
///
/// `funding_rate` is a signed fraction charged per funding interval
/// (0.0001 = 0.01%). A positive rate means longs pay shorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingQuote {
    /// Canonical asset ticker (e.g. "BTC")
    pub symbol: Arc<str>,
    /// Venue identifier
    pub dex: DexId,
    /// Signed rate per funding interval
    pub funding_rate: Decimal,
    /// Length of one funding period in hours (1, 4, 8 ...)
    pub funding_interval_hours: Decimal,
    pub index_price: Option<Decimal>,
    pub mark_price: Option<Decimal>,
    pub open_interest_usd: Option<Decimal>,
    pub volume_24h_usd: Option<Decimal>,
}

impl FundingQuote {
    /// Create a quote with the required fields; market metrics start empty.
    pub fn new(
        symbol: impl Into<Arc<str>>,
        dex: impl Into<Arc<str>>,
        funding_rate: Decimal,
        funding_interval_hours: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            dex: dex.into(),
            funding_rate,
            funding_interval_hours,
            index_price: None,
            mark_price: None,
            open_interest_usd: None,
            volume_24h_usd: None,
        }
    }

    pub fn with_index_price(mut self, price: Decimal) -> Self {
        self.index_price = Some(price);
        self
    }

    pub fn with_mark_price(mut self, price: Decimal) -> Self {
        self.mark_price = Some(price);
        self
    }

    pub fn with_open_interest(mut self, oi_usd: Decimal) -> Self {
        self.open_interest_usd = Some(oi_usd);
        self
    }

    pub fn with_volume(mut self, volume_usd: Decimal) -> Self {
        self.volume_24h_usd = Some(volume_usd);
        self
    }

    /// Funding rate reduced to a per-second basis.
    pub fn rate_per_second(&self) -> EngineResult<Decimal> {
        normalize(self.funding_rate, self.funding_interval_hours)
    }
}

// =============================================================================
// Raw Funding Quote (as produced by collection sources)
// =============================================================================

/// Loosely-typed quote as delivered by a collection source.
///
/// Every field is optional so one bad row never fails a whole payload;
/// validation happens in `TryFrom<RawFundingQuote> for FundingQuote`.
/// Numbers are accepted either as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundingQuote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub dex: Option<String>,
    #[serde(default)]
    pub funding_rate: Option<Decimal>,
    #[serde(default)]
    pub funding_interval_hours: Option<Decimal>,
    #[serde(default)]
    pub index_price: Option<Decimal>,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub open_interest_usd: Option<Decimal>,
    #[serde(default)]
    pub volume_24h_usd: Option<Decimal>,
}

impl TryFrom<RawFundingQuote> for FundingQuote {
    type Error = EngineError;

    fn try_from(raw: RawFundingQuote) -> Result<Self, Self::Error> {
        let dex = raw
            .dex
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let malformed = |reason: &str| EngineError::MalformedQuote {
            dex: dex.clone().unwrap_or_default(),
            reason: reason.to_string(),
        };

        let symbol = raw
            .symbol
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| malformed("missing symbol"))?;
        let dex = dex.clone().ok_or_else(|| malformed("missing dex"))?;
        let funding_rate = raw
            .funding_rate
            .ok_or_else(|| malformed("missing funding_rate"))?;
        let interval = raw
            .funding_interval_hours
            .ok_or_else(|| malformed("missing funding_interval_hours"))?;
        if interval <= Decimal::ZERO {
            return Err(EngineError::InvalidInterval {
                interval_hours: interval,
            });
        }

        for (name, price) in [("index_price", raw.index_price), ("mark_price", raw.mark_price)] {
            if matches!(price, Some(p) if p <= Decimal::ZERO) {
                return Err(malformed(&format!("{} must be > 0", name)));
            }
        }
        for (name, metric) in [
            ("open_interest_usd", raw.open_interest_usd),
            ("volume_24h_usd", raw.volume_24h_usd),
        ] {
            if matches!(metric, Some(m) if m < Decimal::ZERO) {
                return Err(malformed(&format!("{} must be >= 0", name)));
            }
        }

        Ok(FundingQuote {
            symbol: Arc::from(symbol.trim()),
            dex: Arc::from(dex),
            funding_rate,
            funding_interval_hours: interval,
            index_price: raw.index_price,
            mark_price: raw.mark_price,
            open_interest_usd: raw.open_interest_usd,
            volume_24h_usd: raw.volume_24h_usd,
        })
    }
}

// =============================================================================
// Fee Structure
// =============================================================================

/// Per-DEX maker/taker fee schedule.
///
/// Both values are fractions of notional (0.0005 = 0.05%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeStructure {
    #[serde(alias = "maker_fee")]
    pub maker_fee_percent: Decimal,
    #[serde(alias = "taker_fee")]
    pub taker_fee_percent: Decimal,
}

/// DEX id → fee schedule
pub type FeeTable = HashMap<DexId, FeeStructure>;

// =============================================================================
// Opportunity
// =============================================================================

/// One candidate arbitrage: long `long_dex`, short `short_dex`, same symbol.
///
/// Read-only result record, recomputed on every analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub symbol: Arc<str>,
    pub long_dex: DexId,
    pub short_dex: DexId,
    /// Raw per-interval rates as quoted
    pub long_funding_rate: Decimal,
    pub short_funding_rate: Decimal,
    pub long_interval_hours: Decimal,
    pub short_interval_hours: Decimal,
    /// Normalized per-second rates
    pub long_rate_per_sec: Decimal,
    pub short_rate_per_sec: Decimal,
    /// `short_rate_per_sec - long_rate_per_sec`
    pub divergence: Decimal,
    pub holding_horizon_seconds: Decimal,
    /// `divergence * holding_horizon_seconds`
    pub gross_profit_period: Decimal,
    /// Open + close on both legs, fraction of notional
    pub total_fee_cost: Decimal,
    /// `gross_profit_period - total_fee_cost`
    pub net_profit_percent: Decimal,
    /// Thinner leg's open interest
    pub min_oi_usd: Option<Decimal>,
    /// Thinner leg's 24h volume
    pub min_volume_24h_usd: Option<Decimal>,
    /// Index price gap between legs, in percent: (short - long) / long * 100
    pub price_spread_percent: Option<Decimal>,
}

impl Opportunity {
    /// Divergence scaled to a year, as a fraction (0.10 = 10% APR).
    ///
    /// Saturates at the `Decimal` bounds instead of overflowing.
    pub fn annualized_divergence(&self) -> Decimal {
        self.divergence.saturating_mul(Decimal::from(SECONDS_PER_YEAR))
    }

    #[inline]
    pub fn is_profitable(&self) -> bool {
        self.net_profit_percent > Decimal::ZERO
    }
}

// =============================================================================
// Leg Pair
// =============================================================================

/// Live size of each leg of one logical cross-DEX position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegPair {
    pub long_quantity: Option<Decimal>,
    pub short_quantity: Option<Decimal>,
}

impl LegPair {
    pub fn new(long_quantity: Option<Decimal>, short_quantity: Option<Decimal>) -> Self {
        Self {
            long_quantity,
            short_quantity,
        }
    }
}

// =============================================================================
// Utility
// =============================================================================

/// Get current time in milliseconds since epoch.
#[inline]
pub fn current_time_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
