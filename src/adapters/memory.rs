//! In-memory funding source
//!
//! Holds rows pushed by another component (a websocket feed, a replay
//! harness). Also the standard stand-in for a venue in tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::adapters::errors::{SourceError, SourceResult};
use crate::adapters::traits::FundingRateSource;
use crate::core::types::RawFundingQuote;

/// Funding source backed by a shared, replaceable row set
#[derive(Debug, Default)]
pub struct InMemorySource {
    dex: String,
    rows: Mutex<Vec<RawFundingQuote>>,
    /// When true, `fetch_rates` fails with an HTTP error
    fail: AtomicBool,
    /// Number of `fetch_rates` calls (thread-safe for async tests)
    pub fetch_count: Arc<AtomicU64>,
}

impl InMemorySource {
    pub fn new(dex: impl Into<String>) -> Self {
        Self {
            dex: dex.into(),
            ..Default::default()
        }
    }

    /// Builder: seed with rows
    pub fn with_rows(self, rows: Vec<RawFundingQuote>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Builder: seed with `(symbol, rate, interval_hours)` triples
    pub fn with_rates<S: Into<String>>(
        self,
        rates: impl IntoIterator<Item = (S, rust_decimal::Decimal, rust_decimal::Decimal)>,
    ) -> Self {
        let dex = self.dex.clone();
        let rows = rates
            .into_iter()
            .map(|(symbol, rate, hours)| RawFundingQuote {
                symbol: Some(symbol.into()),
                dex: Some(dex.clone()),
                funding_rate: Some(rate),
                funding_interval_hours: Some(hours),
                ..Default::default()
            })
            .collect();
        self.with_rows(rows)
    }

    /// Create a source whose fetches always fail
    pub fn failing(dex: impl Into<String>) -> Self {
        let source = Self::new(dex);
        source.set_failing(true);
        source
    }

    /// Replace the current row set
    pub fn set_rows(&self, rows: Vec<RawFundingQuote>) {
        let mut guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        *guard = rows;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FundingRateSource for InMemorySource {
    fn dex(&self) -> &str {
        &self.dex
    }

    async fn fetch_rates(&self) -> SourceResult<Vec<RawFundingQuote>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Http(format!("{} unavailable", self.dex)));
        }
        let guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }
}
