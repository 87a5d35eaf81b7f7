//! Cross-DEX funding arbitrage finder.
//!
//! For every symbol quoted on at least two venues, pairs each DEX with every
//! other one, normalizes both funding rates to per-second terms and prices
//! the four trades of the delta-neutral pair. Candidates are then filtered,
//! cooled-down symbols dropped, and the survivors ranked.
//!
//! # Sign convention
//! A positive funding rate means longs pay shorts. Going long on the venue
//! with the lower rate and short on the one with the higher rate earns
//! `short_rate - long_rate` per second, which is the `divergence`.
//!
//! Bad data never aborts a pass: malformed quotes, duplicate quotes and
//! unpriced pairs are logged and skipped so one flaky venue only costs its
//! own candidates.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::cooldown::CooldownManager;
use crate::core::errors::{EngineError, EngineResult};
use crate::core::fees::total_arbitrage_cost;
use crate::core::types::{FeeTable, FundingQuote, Opportunity};

/// Default number of opportunities returned
pub const DEFAULT_LIMIT: usize = 10;

// =============================================================================
// Filters
// =============================================================================

/// Ranking key for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    NetProfitPercent,
    Divergence,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::NetProfitPercent => write!(f, "net_profit_percent"),
            SortKey::Divergence => write!(f, "divergence"),
        }
    }
}

/// Risk filters applied to every candidate.
///
/// Build through [`OpportunityFilters::builder`] or validate a
/// deserialized value with [`OpportunityFilters::validate`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityFilters {
    /// Exclude candidates whose net profit is below this fraction
    pub min_profit_percent: Decimal,
    /// Exclude when the thinner leg's OI is above this ceiling (low-OI farming)
    pub max_oi_usd: Option<Decimal>,
    /// Exclude when the thinner leg's 24h volume is below this floor
    pub min_volume_24h_usd: Option<Decimal>,
    /// Keep only candidates with at least one leg on these DEXs
    pub include_dexes: Option<HashSet<String>>,
    /// Drop candidates with any leg on these DEXs
    pub exclude_dexes: Option<HashSet<String>>,
    pub limit: usize,
    pub sort_by: SortKey,
    pub sort_desc: bool,
    /// Diagnostics: keep negative-divergence directions and ignore
    /// `min_profit_percent`
    pub include_below_threshold: bool,
}

impl Default for OpportunityFilters {
    fn default() -> Self {
        Self {
            min_profit_percent: Decimal::ZERO,
            max_oi_usd: None,
            min_volume_24h_usd: None,
            include_dexes: None,
            exclude_dexes: None,
            limit: DEFAULT_LIMIT,
            sort_by: SortKey::NetProfitPercent,
            sort_desc: true,
            include_below_threshold: false,
        }
    }
}

impl OpportunityFilters {
    pub fn builder() -> FiltersBuilder {
        FiltersBuilder::default()
    }

    /// Reject configurations that are caller mistakes.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(max_oi) = self.max_oi_usd {
            if max_oi < Decimal::ZERO {
                return Err(EngineError::InvalidFilter(format!(
                    "max_oi_usd must be >= 0 (got {})",
                    max_oi
                )));
            }
        }
        if let Some(min_vol) = self.min_volume_24h_usd {
            if min_vol < Decimal::ZERO {
                return Err(EngineError::InvalidFilter(format!(
                    "min_volume_24h_usd must be >= 0 (got {})",
                    min_vol
                )));
            }
        }
        if self.limit == 0 {
            return Err(EngineError::InvalidFilter(
                "limit must be at least 1".to_string(),
            ));
        }
        if let Some(include) = &self.include_dexes {
            if include.is_empty() {
                return Err(EngineError::InvalidFilter(
                    "include_dexes is set but empty".to_string(),
                ));
            }
            if let Some(exclude) = &self.exclude_dexes {
                let mut overlap: Vec<&String> = include.intersection(exclude).collect();
                if !overlap.is_empty() {
                    overlap.sort();
                    return Err(EngineError::InvalidFilter(format!(
                        "DEXs both included and excluded: {:?}",
                        overlap
                    )));
                }
            }
        }
        Ok(())
    }

    fn dex_allowed(&self, long_dex: &str, short_dex: &str) -> bool {
        if let Some(include) = &self.include_dexes {
            if !include.contains(long_dex) && !include.contains(short_dex) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_dexes {
            if exclude.contains(long_dex) || exclude.contains(short_dex) {
                return false;
            }
        }
        true
    }

    /// `Err(reason)` when the candidate is filtered out.
    fn check(&self, opp: &Opportunity) -> Result<(), &'static str> {
        if !self.include_below_threshold && opp.net_profit_percent < self.min_profit_percent {
            return Err("below min_profit_percent");
        }
        if let Some(max_oi) = self.max_oi_usd {
            match opp.min_oi_usd {
                Some(oi) if oi <= max_oi => {}
                Some(_) => return Err("open interest above max_oi_usd"),
                None => return Err("open interest unknown"),
            }
        }
        if let Some(min_vol) = self.min_volume_24h_usd {
            match opp.min_volume_24h_usd {
                Some(vol) if vol >= min_vol => {}
                Some(_) => return Err("volume below min_volume_24h_usd"),
                None => return Err("volume unknown"),
            }
        }
        if !self.dex_allowed(&opp.long_dex, &opp.short_dex) {
            return Err("dex not allowed");
        }
        Ok(())
    }
}

/// Builder that validates on `build()`.
#[derive(Debug, Clone, Default)]
pub struct FiltersBuilder {
    filters: OpportunityFilters,
}

impl FiltersBuilder {
    pub fn min_profit_percent(mut self, value: Decimal) -> Self {
        self.filters.min_profit_percent = value;
        self
    }

    pub fn max_oi_usd(mut self, value: Decimal) -> Self {
        self.filters.max_oi_usd = Some(value);
        self
    }

    pub fn min_volume_24h_usd(mut self, value: Decimal) -> Self {
        self.filters.min_volume_24h_usd = Some(value);
        self
    }

    pub fn include_dexes<I, S>(mut self, dexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.include_dexes = Some(dexes.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_dexes<I, S>(mut self, dexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.exclude_dexes = Some(dexes.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.filters.limit = limit;
        self
    }

    pub fn sort_by(mut self, key: SortKey, descending: bool) -> Self {
        self.filters.sort_by = key;
        self.filters.sort_desc = descending;
        self
    }

    pub fn include_below_threshold(mut self, enabled: bool) -> Self {
        self.filters.include_below_threshold = enabled;
        self
    }

    pub fn build(self) -> EngineResult<OpportunityFilters> {
        self.filters.validate()?;
        Ok(self.filters)
    }
}

/// Reject a non-positive holding horizon.
pub fn validate_horizon(holding_horizon_seconds: Decimal) -> EngineResult<()> {
    if holding_horizon_seconds <= Decimal::ZERO {
        return Err(EngineError::InvalidFilter(format!(
            "holding horizon must be > 0 seconds (got {})",
            holding_horizon_seconds
        )));
    }
    Ok(())
}

// =============================================================================
// Finder
// =============================================================================

/// One venue's normalized entry inside a symbol group
struct Leg<'a> {
    quote: &'a FundingQuote,
    rate_per_sec: Decimal,
}

/// Finds and ranks funding arbitrage opportunities.
///
/// Holds no per-pass state; concurrent calls only share the cooldown map.
#[derive(Debug, Clone)]
pub struct OpportunityFinder {
    cooldowns: Arc<CooldownManager>,
    cooldown_minutes: u64,
    use_taker: bool,
}

impl OpportunityFinder {
    /// Taker-fee pricing with the given cooldown window.
    pub fn new(cooldowns: Arc<CooldownManager>, cooldown_minutes: u64) -> Self {
        Self {
            cooldowns,
            cooldown_minutes,
            use_taker: true,
        }
    }

    /// Price entries and exits at maker instead of taker fees.
    pub fn with_taker_fees(mut self, use_taker: bool) -> Self {
        self.use_taker = use_taker;
        self
    }

    pub fn cooldowns(&self) -> &Arc<CooldownManager> {
        &self.cooldowns
    }

    pub fn cooldown_minutes(&self) -> u64 {
        self.cooldown_minutes
    }

    /// Run one analysis pass over a quote snapshot.
    pub fn find_opportunities(
        &self,
        quotes: &[FundingQuote],
        fees: &FeeTable,
        holding_horizon_seconds: Decimal,
        filters: &OpportunityFilters,
    ) -> Vec<Opportunity> {
        let groups = group_by_symbol(quotes);
        let mut candidates = Vec::new();

        for (symbol, legs) in &groups {
            if legs.len() < 2 {
                debug!(symbol = symbol.as_ref(), "[SCAN] Single venue, skipping");
                continue;
            }
            if self.cooldowns.is_in_cooldown(symbol, self.cooldown_minutes) {
                debug!(symbol = symbol.as_ref(), "[SCAN] Symbol in cooldown, skipping");
                continue;
            }

            for (i, a) in legs.iter().enumerate() {
                for b in &legs[i + 1..] {
                    for (long, short) in directions(a, b, filters.include_below_threshold) {
                        let Some(opp) = self.price_pair(long, short, fees, holding_horizon_seconds)
                        else {
                            continue;
                        };
                        match filters.check(&opp) {
                            Ok(()) => candidates.push(opp),
                            Err(reason) => debug!(
                                symbol = symbol.as_ref(),
                                long = opp.long_dex.as_ref(),
                                short = opp.short_dex.as_ref(),
                                reason = reason,
                                "[SCAN] Candidate filtered"
                            ),
                        }
                    }
                }
            }
        }

        rank(&mut candidates, filters.sort_by, filters.sort_desc);
        candidates.truncate(filters.limit);

        debug!(
            quotes = quotes.len(),
            symbols = groups.len(),
            returned = candidates.len(),
            "[SCAN] Pass complete"
        );
        candidates
    }

    /// Build the opportunity for one direction, or `None` if unpriced.
    fn price_pair(
        &self,
        long: &Leg<'_>,
        short: &Leg<'_>,
        fees: &FeeTable,
        holding_horizon_seconds: Decimal,
    ) -> Option<Opportunity> {
        let (long_q, short_q) = (long.quote, short.quote);

        let (Some(long_fees), Some(short_fees)) =
            (fees.get(long_q.dex.as_ref()), fees.get(short_q.dex.as_ref()))
        else {
            debug!(
                symbol = long_q.symbol.as_ref(),
                long = long_q.dex.as_ref(),
                short = short_q.dex.as_ref(),
                "[SCAN] Missing fee schedule, candidate unpriced"
            );
            return None;
        };
        for (dex, schedule) in [(&long_q.dex, long_fees), (&short_q.dex, short_fees)] {
            if let Err(e) = schedule.validate(dex) {
                warn!(dex = dex.as_ref(), error = %e, "[SCAN] Untrusted fee schedule, candidate unpriced");
                return None;
            }
        }

        let total_fee_cost = total_arbitrage_cost(long_fees, short_fees, self.use_taker);
        let priced = short
            .rate_per_sec
            .checked_sub(long.rate_per_sec)
            .and_then(|divergence| {
                let gross = divergence.checked_mul(holding_horizon_seconds)?;
                Some((divergence, gross, gross.checked_sub(total_fee_cost)?))
            });
        let Some((divergence, gross_profit_period, net_profit_percent)) = priced else {
            warn!(
                symbol = long_q.symbol.as_ref(),
                long = long_q.dex.as_ref(),
                short = short_q.dex.as_ref(),
                "[SCAN] Profit arithmetic overflowed, candidate unpriced"
            );
            return None;
        };

        Some(Opportunity {
            symbol: long_q.symbol.clone(),
            long_dex: long_q.dex.clone(),
            short_dex: short_q.dex.clone(),
            long_funding_rate: long_q.funding_rate,
            short_funding_rate: short_q.funding_rate,
            long_interval_hours: long_q.funding_interval_hours,
            short_interval_hours: short_q.funding_interval_hours,
            long_rate_per_sec: long.rate_per_sec,
            short_rate_per_sec: short.rate_per_sec,
            divergence,
            holding_horizon_seconds,
            gross_profit_period,
            total_fee_cost,
            net_profit_percent,
            min_oi_usd: min_of(long_q.open_interest_usd, short_q.open_interest_usd),
            min_volume_24h_usd: min_of(long_q.volume_24h_usd, short_q.volume_24h_usd),
            price_spread_percent: price_spread(long_q.index_price, short_q.index_price),
        })
    }
}

/// Group valid quotes by symbol, one leg per DEX, legs sorted by DEX id.
fn group_by_symbol(quotes: &[FundingQuote]) -> BTreeMap<Arc<str>, Vec<Leg<'_>>> {
    let mut groups: BTreeMap<Arc<str>, Vec<Leg<'_>>> = BTreeMap::new();

    for quote in quotes {
        let rate_per_sec = match quote.rate_per_second() {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    symbol = quote.symbol.as_ref(),
                    dex = quote.dex.as_ref(),
                    error = %e,
                    "[SCAN] Skipping invalid quote"
                );
                continue;
            }
        };
        let legs = groups.entry(quote.symbol.clone()).or_default();
        if legs.iter().any(|l| l.quote.dex == quote.dex) {
            warn!(
                symbol = quote.symbol.as_ref(),
                dex = quote.dex.as_ref(),
                "[SCAN] Duplicate quote in snapshot, keeping first"
            );
            continue;
        }
        legs.push(Leg {
            quote,
            rate_per_sec,
        });
    }

    for legs in groups.values_mut() {
        legs.sort_by(|a, b| a.quote.dex.cmp(&b.quote.dex));
    }
    groups
}

/// (long, short) orientations worth pricing for a DEX pair.
///
/// Normally only the non-negative divergence side survives; on an exact
/// tie the first orientation (by DEX id) is kept so a pair is never listed
/// twice.
fn directions<'l, 'a>(
    a: &'l Leg<'a>,
    b: &'l Leg<'a>,
    include_both: bool,
) -> Vec<(&'l Leg<'a>, &'l Leg<'a>)> {
    if include_both {
        return vec![(a, b), (b, a)];
    }
    if b.rate_per_sec >= a.rate_per_sec {
        vec![(a, b)]
    } else {
        vec![(b, a)]
    }
}

fn min_of(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    Some(a?.min(b?))
}

fn price_spread(long_price: Option<Decimal>, short_price: Option<Decimal>) -> Option<Decimal> {
    let (long_price, short_price) = (long_price?, short_price?);
    if long_price <= Decimal::ZERO {
        return None;
    }
    short_price
        .checked_sub(long_price)?
        .checked_div(long_price)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Sort by key, then symbol ascending, then DEX ids, for stable output.
fn rank(opportunities: &mut [Opportunity], key: SortKey, descending: bool) {
    opportunities.sort_by(|a, b| {
        let primary = match key {
            SortKey::NetProfitPercent => a.net_profit_percent.cmp(&b.net_profit_percent),
            SortKey::Divergence => a.divergence.cmp(&b.divergence),
        };
        let primary = if descending { primary.reverse() } else { primary };
        primary
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.long_dex.cmp(&b.long_dex))
            .then_with(|| a.short_dex.cmp(&b.short_dex))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cooldown::ManualClock;
    use crate::core::types::FeeStructure;
    use rust_decimal_macros::dec;

    const HORIZON_8H: Decimal = Decimal::from_parts(28_800, 0, 0, false, 0);

    fn fee_table(entries: &[(&str, Decimal, Decimal)]) -> FeeTable {
        entries
            .iter()
            .map(|(dex, maker, taker)| {
                (
                    Arc::from(*dex),
                    FeeStructure {
                        maker_fee_percent: *maker,
                        taker_fee_percent: *taker,
                    },
                )
            })
            .collect()
    }

    fn zero_fees(dexes: &[&str]) -> FeeTable {
        let entries: Vec<_> = dexes.iter().map(|d| (*d, dec!(0), dec!(0))).collect();
        fee_table(&entries)
    }

    fn finder() -> (Arc<ManualClock>, OpportunityFinder) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cooldowns = Arc::new(CooldownManager::with_clock(clock.clone()));
        (clock, OpportunityFinder::new(cooldowns, 30))
    }

    fn quote(symbol: &str, dex: &str, rate: Decimal, hours: Decimal) -> FundingQuote {
        FundingQuote::new(symbol, dex, rate, hours)
    }

    #[test]
    fn test_single_dex_symbol_excluded() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "hyperliquid", dec!(0.0001), dec!(1)),
            quote("ETH", "hyperliquid", dec!(0.0001), dec!(1)),
            quote("ETH", "paradex", dec!(-0.0001), dec!(8)),
        ];
        let fees = zero_fees(&["hyperliquid", "paradex"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "ETH");
    }

    #[test]
    fn test_direction_longs_the_lower_rate() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "hyperliquid", dec!(0.0001), dec!(1)),
            quote("BTC", "paradex", dec!(0.0001), dec!(8)),
        ];
        let fees = zero_fees(&["hyperliquid", "paradex"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        // Hourly venue pays 8x per second → short it, long the 8h venue
        assert_eq!(opps[0].long_dex.as_ref(), "paradex");
        assert_eq!(opps[0].short_dex.as_ref(), "hyperliquid");
        assert!(opps[0].divergence > Decimal::ZERO);
    }

    #[test]
    fn test_net_profit_accounts_for_fees() {
        let (_, finder) = finder();
        // 0.0036 per hour = 0.000001/s; horizon 1000s → gross 0.001
        let quotes = vec![
            quote("SOL", "a", dec!(0), dec!(1)),
            quote("SOL", "b", dec!(0.0036), dec!(1)),
        ];
        let fees = fee_table(&[
            ("a", dec!(0.0001), dec!(0.0002)),
            ("b", dec!(0.0001), dec!(0.0002)),
        ]);
        let opps = finder.find_opportunities(&quotes, &fees, dec!(1000), &OpportunityFilters::default());
        let opp = &opps[0];
        assert_eq!(opp.gross_profit_period, dec!(0.001));
        assert_eq!(opp.total_fee_cost, dec!(0.0008));
        assert_eq!(opp.net_profit_percent, dec!(0.0002));
        assert!(opp.is_profitable());
    }

    #[test]
    fn test_missing_fee_schedule_discards_candidate() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
        ];
        let fees = zero_fees(&["a"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert!(opps.is_empty());
    }

    #[test]
    fn test_out_of_bounds_fee_schedule_discards_candidate() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
        ];
        let fees = fee_table(&[("a", dec!(0), dec!(0)), ("b", dec!(0.02), dec!(0.05))]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert!(opps.is_empty());
    }

    #[test]
    fn test_invalid_interval_quote_skipped_not_fatal() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(0)),
            quote("ETH", "a", dec!(0), dec!(1)),
            quote("ETH", "b", dec!(0.001), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "ETH");
    }

    #[test]
    fn test_overflowing_pair_skipped_other_symbols_kept() {
        let (_, finder) = finder();
        // Each rate normalizes, but their spread over 8h does not fit a Decimal
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
            quote("WIF", "a", Decimal::MAX, dec!(1)),
            quote("WIF", "b", Decimal::MIN, dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "BTC");
    }

    #[test]
    fn test_unnormalizable_quote_skipped_other_symbols_kept() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
            quote("ETH", "a", dec!(0), dec!(1)),
            quote("ETH", "b", dec!(0.0001), Decimal::MAX),
            quote("SOL", "a", dec!(0), dec!(1)),
            quote("SOL", "b", Decimal::MAX, Decimal::new(1, 28)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "BTC");
    }

    #[test]
    fn test_extreme_index_prices_leave_spread_unknown() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)).with_index_price(Decimal::new(1, 28)),
            quote("BTC", "b", dec!(0.001), dec!(1)).with_index_price(Decimal::MAX),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].price_spread_percent, None);
    }

    #[test]
    fn test_duplicate_quote_keeps_first() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
            quote("BTC", "b", dec!(0.5), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].short_funding_rate, dec!(0.001));
    }

    #[test]
    fn test_equal_rates_listed_once() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "b", dec!(0.0001), dec!(1)),
            quote("BTC", "a", dec!(0.0001), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].long_dex.as_ref(), "a");
        assert_eq!(opps[0].divergence, Decimal::ZERO);
    }

    #[test]
    fn test_include_below_threshold_keeps_both_directions() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
        ];
        let fees = fee_table(&[("a", dec!(0.001), dec!(0.001)), ("b", dec!(0.001), dec!(0.001))]);
        let filters = OpportunityFilters::builder()
            .min_profit_percent(dec!(0.5))
            .include_below_threshold(true)
            .build()
            .unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, dec!(60), &filters);
        assert_eq!(opps.len(), 2);
        assert!(opps.iter().any(|o| o.divergence < Decimal::ZERO));
    }

    #[test]
    fn test_min_profit_filter() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.0036), dec!(1)),
            quote("ETH", "a", dec!(0), dec!(1)),
            quote("ETH", "b", dec!(0.036), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let filters = OpportunityFilters::builder()
            .min_profit_percent(dec!(0.005))
            .build()
            .unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, dec!(1000), &filters);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "ETH");
    }

    #[test]
    fn test_max_oi_is_a_ceiling_on_thinner_leg() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)).with_open_interest(dec!(900000000)),
            quote("BTC", "b", dec!(0.001), dec!(1)).with_open_interest(dec!(500000000)),
            quote("WIF", "a", dec!(0), dec!(1)).with_open_interest(dec!(2000000)),
            quote("WIF", "b", dec!(0.001), dec!(1)).with_open_interest(dec!(800000)),
            quote("ETH", "a", dec!(0), dec!(1)),
            quote("ETH", "b", dec!(0.001), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let filters = OpportunityFilters::builder()
            .max_oi_usd(dec!(1000000))
            .build()
            .unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &filters);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "WIF");
        assert_eq!(opps[0].min_oi_usd, Some(dec!(800000)));
    }

    #[test]
    fn test_min_volume_floor_on_thinner_leg() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)).with_volume(dec!(10000000)),
            quote("BTC", "b", dec!(0.001), dec!(1)).with_volume(dec!(5000)),
            quote("ETH", "a", dec!(0), dec!(1)).with_volume(dec!(10000000)),
            quote("ETH", "b", dec!(0.001), dec!(1)).with_volume(dec!(2000000)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let filters = OpportunityFilters::builder()
            .min_volume_24h_usd(dec!(1000000))
            .build()
            .unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &filters);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol.as_ref(), "ETH");
        assert_eq!(opps[0].min_volume_24h_usd, Some(dec!(2000000)));
    }

    #[test]
    fn test_include_and_exclude_dexes() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
            quote("BTC", "c", dec!(0.002), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b", "c"]);

        let include = OpportunityFilters::builder().include_dexes(["c"]).build().unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &include);
        assert_eq!(opps.len(), 2);
        assert!(opps.iter().all(|o| o.long_dex.as_ref() == "c" || o.short_dex.as_ref() == "c"));

        let exclude = OpportunityFilters::builder().exclude_dexes(["c"]).build().unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &exclude);
        assert_eq!(opps.len(), 1);
        assert_eq!((opps[0].long_dex.as_ref(), opps[0].short_dex.as_ref()), ("a", "b"));
    }

    #[test]
    fn test_symbol_in_cooldown_is_dropped() {
        let (clock, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let filters = OpportunityFilters::default();

        finder.cooldowns().mark("BTC");
        assert!(finder.find_opportunities(&quotes, &fees, HORIZON_8H, &filters).is_empty());

        clock.advance_minutes(30);
        assert_eq!(finder.find_opportunities(&quotes, &fees, HORIZON_8H, &filters).len(), 1);
    }

    #[test]
    fn test_sorting_and_symbol_tie_break() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("SOL", "a", dec!(0), dec!(1)),
            quote("SOL", "b", dec!(0.001), dec!(1)),
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
            quote("ETH", "a", dec!(0), dec!(1)),
            quote("ETH", "b", dec!(0.004), dec!(1)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        let symbols: Vec<&str> = opps.iter().map(|o| o.symbol.as_ref()).collect();
        assert_eq!(symbols, vec!["ETH", "BTC", "SOL"]);

        let ascending = OpportunityFilters::builder()
            .sort_by(SortKey::Divergence, false)
            .build()
            .unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &ascending);
        let symbols: Vec<&str> = opps.iter().map(|o| o.symbol.as_ref()).collect();
        assert_eq!(symbols, vec!["BTC", "SOL", "ETH"]);
    }

    #[test]
    fn test_limit_truncates() {
        let (_, finder) = finder();
        let mut quotes = Vec::new();
        for i in 0..20 {
            let sym = format!("S{:02}", i);
            quotes.push(quote(&sym, "a", dec!(0), dec!(1)));
            quotes.push(quote(&sym, "b", Decimal::new(i + 1, 4), dec!(1)));
        }
        let fees = zero_fees(&["a", "b"]);
        let filters = OpportunityFilters::builder().limit(5).build().unwrap();
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &filters);
        assert_eq!(opps.len(), 5);
        assert_eq!(opps[0].symbol.as_ref(), "S19");
    }

    #[test]
    fn test_price_spread_from_index_prices() {
        let (_, finder) = finder();
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)).with_index_price(dec!(100)),
            quote("BTC", "b", dec!(0.001), dec!(1)).with_index_price(dec!(101)),
        ];
        let fees = zero_fees(&["a", "b"]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps[0].price_spread_percent, Some(dec!(1)));
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let (_, finder) = finder();
        let opps = finder.find_opportunities(&[], &FeeTable::new(), HORIZON_8H, &OpportunityFilters::default());
        assert!(opps.is_empty());
    }

    #[test]
    fn test_maker_pricing() {
        let (_, finder) = finder();
        let finder = finder.with_taker_fees(false);
        let quotes = vec![
            quote("BTC", "a", dec!(0), dec!(1)),
            quote("BTC", "b", dec!(0.001), dec!(1)),
        ];
        let fees = fee_table(&[("a", dec!(0.0001), dec!(0.0005)), ("b", dec!(0.0001), dec!(0.0005))]);
        let opps = finder.find_opportunities(&quotes, &fees, HORIZON_8H, &OpportunityFilters::default());
        assert_eq!(opps[0].total_fee_cost, dec!(0.0004));
    }

    #[test]
    fn test_filter_validation() {
        assert!(OpportunityFilters::builder().max_oi_usd(dec!(-1)).build().is_err());
        assert!(OpportunityFilters::builder().min_volume_24h_usd(dec!(-1)).build().is_err());
        assert!(OpportunityFilters::builder().limit(0).build().is_err());
        let overlap = OpportunityFilters::builder()
            .include_dexes(["a", "b"])
            .exclude_dexes(["b"])
            .build()
            .unwrap_err();
        assert!(overlap.to_string().contains("both included and excluded"));
        let empty: [&str; 0] = [];
        assert!(OpportunityFilters::builder().include_dexes(empty).build().is_err());
        assert!(OpportunityFilters::default().validate().is_ok());
    }

    #[test]
    fn test_filters_deserialize_with_defaults() {
        let yaml = "max_oi_usd: 5000000\nsort_by: divergence\n";
        let filters: OpportunityFilters = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(filters.max_oi_usd, Some(dec!(5000000)));
        assert_eq!(filters.sort_by, SortKey::Divergence);
        assert_eq!(filters.limit, DEFAULT_LIMIT);
        assert!(filters.sort_desc);
    }

    #[test]
    fn test_horizon_validation() {
        assert!(validate_horizon(dec!(0)).is_err());
        assert!(validate_horizon(dec!(3600)).is_ok());
    }
}
