//! Funding source trait definition
//!
//! The FundingRateSource trait is the seam between per-DEX collectors and
//! the opportunity engine. Implementations only fetch and label rows;
//! validation and normalization happen in the collector.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::errors::SourceResult;
use crate::adapters::symbols::canonical_symbol;
use crate::core::types::RawFundingQuote;

/// Common trait for all funding snapshot producers
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
///
/// struct StaticRates {
///     rows: Vec<RawFundingQuote>,
/// }
///
/// #[async_trait]
/// impl FundingRateSource for StaticRates {
///     fn dex(&self) -> &str {
///         "vest"
///     }
///
///     async fn fetch_rates(&self) -> SourceResult<Vec<RawFundingQuote>> {
///         Ok(self.rows.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait FundingRateSource: Send + Sync {
    /// DEX id this source reports for; used when a row carries no `dex`
    fn dex(&self) -> &str;

    /// Fetch the latest funding snapshot
    ///
    /// Rows may be partially filled; the collector drops the unusable ones.
    async fn fetch_rates(&self) -> SourceResult<Vec<RawFundingQuote>>;

    /// Deadline for one fetch, when the source was configured with its own
    ///
    /// `None` means the collector's default applies.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Map a venue ticker to the canonical base asset
    ///
    /// Override when a venue uses a convention `canonical_symbol` misses.
    fn normalize_symbol(&self, raw: &str) -> Option<String> {
        canonical_symbol(raw)
    }
}
