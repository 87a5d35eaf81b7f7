//! Snapshot collection across all sources
//!
//! Every source is polled concurrently once per pass. A source that fails
//! or times out drops out of that pass only; rows that fail validation are
//! dropped one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::adapters::errors::{SourceError, SourceResult};
use crate::adapters::http::HttpSnapshotSource;
use crate::adapters::snapshot::FileSnapshotSource;
use crate::adapters::traits::FundingRateSource;
use crate::config::{AppConfig, SourceConfig};
use crate::core::types::{DexId, FundingQuote, RawFundingQuote};

/// Shared handle to a source
pub type SharedSource = Arc<dyn FundingRateSource>;

/// One pass worth of validated quotes
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub quotes: Vec<FundingQuote>,
    pub collected_at: DateTime<Utc>,
    /// DEX ids whose fetch failed this pass
    pub failed_sources: Vec<String>,
    /// Rows dropped for bad symbols or failed validation
    pub skipped_rows: usize,
}

impl RateSnapshot {
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Build the configured sources.
///
/// `default_timeout` applies to HTTP sources without their own `timeout_ms`.
pub fn sources_from_config(config: &AppConfig, default_timeout: Duration) -> Vec<SharedSource> {
    config
        .sources
        .iter()
        .map(|source| -> SharedSource {
            match source {
                SourceConfig::File { dex, path } => {
                    Arc::new(FileSnapshotSource::new(dex.clone(), path.clone()))
                }
                SourceConfig::Http {
                    dex,
                    url,
                    timeout_ms,
                } => {
                    let timeout = timeout_ms
                        .map(Duration::from_millis)
                        .unwrap_or(default_timeout);
                    Arc::new(HttpSnapshotSource::new(dex.clone(), url.clone(), timeout))
                }
            }
        })
        .collect()
}

/// Fetch under the source's own deadline, or `default_timeout` if it has none.
async fn fetch_with_timeout(
    source: &SharedSource,
    default_timeout: Duration,
) -> SourceResult<Vec<RawFundingQuote>> {
    let timeout = source.timeout().unwrap_or(default_timeout);
    match tokio::time::timeout(timeout, source.fetch_rates()).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Fill in what a source left implicit and validate one row.
fn normalize_row(
    source: &dyn FundingRateSource,
    mut row: RawFundingQuote,
    default_intervals: &HashMap<DexId, Decimal>,
) -> Result<FundingQuote, String> {
    let dex = row
        .dex
        .take()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| source.dex().to_string());

    if let Some(raw_symbol) = row.symbol.take() {
        match source.normalize_symbol(&raw_symbol) {
            Some(symbol) => row.symbol = Some(symbol),
            None => return Err(format!("unrecognized symbol '{}'", raw_symbol)),
        }
    }
    if row.funding_interval_hours.is_none() {
        row.funding_interval_hours = default_intervals.get(dex.as_str()).copied();
    }
    row.dex = Some(dex);

    FundingQuote::try_from(row).map_err(|e| e.to_string())
}

/// Poll every source concurrently and merge the valid rows.
///
/// `default_timeout` bounds sources that carry no deadline of their own.
pub async fn collect_quotes(
    sources: &[SharedSource],
    default_intervals: &HashMap<DexId, Decimal>,
    default_timeout: Duration,
) -> RateSnapshot {
    let results = join_all(sources.iter().map(|s| fetch_with_timeout(s, default_timeout))).await;

    let mut quotes = Vec::new();
    let mut failed_sources = Vec::new();
    let mut skipped_rows = 0;

    for (source, result) in sources.iter().zip(results) {
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!(dex = source.dex(), error = %e, "[SOURCE] Fetch failed, skipping this pass");
                failed_sources.push(source.dex().to_string());
                continue;
            }
        };

        let row_count = rows.len();
        for row in rows {
            match normalize_row(source.as_ref(), row, default_intervals) {
                Ok(quote) => quotes.push(quote),
                Err(reason) => {
                    skipped_rows += 1;
                    debug!(dex = source.dex(), reason = %reason, "[SOURCE] Row dropped");
                }
            }
        }
        debug!(dex = source.dex(), rows = row_count, "[SOURCE] Rows received");
    }

    if skipped_rows > 0 {
        warn!(skipped = skipped_rows, "[SOURCE] Dropped malformed rows");
    }
    info!(
        quotes = quotes.len(),
        sources = sources.len(),
        failed = failed_sources.len(),
        "[SOURCE] Snapshot collected"
    );

    RateSnapshot {
        quotes,
        collected_at: Utc::now(),
        failed_sources,
        skipped_rows,
    }
}
