//! HTTP-backed funding snapshot source

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::errors::{SourceError, SourceResult};
use crate::adapters::snapshot::parse_snapshot;
use crate::adapters::traits::FundingRateSource;
use crate::core::types::RawFundingQuote;

/// Connect timeout for snapshot endpoints (ms)
pub const HTTP_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Idle connections kept per host between passes
pub const HTTP_POOL_MAX_IDLE: usize = 2;

/// Build the shared client for a source
///
/// Falls back to a default client if the builder is rejected.
pub fn create_http_client(dex: &str, timeout: Duration) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::info!(
        phase = "init",
        dex = %dex,
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "[SOURCE] HTTP client configured"
    );
    client
}

/// Polls a JSON snapshot endpoint.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    dex: String,
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    pub fn new(dex: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        let dex = dex.into();
        let client = create_http_client(&dex, timeout);
        Self {
            dex,
            url: url.into(),
            timeout,
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FundingRateSource for HttpSnapshotSource {
    fn dex(&self) -> &str {
        &self.dex
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn fetch_rates(&self) -> SourceResult<Vec<RawFundingQuote>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("{} returned {}", self.url, status)));
        }
        let body = response.bytes().await?;
        let rows = parse_snapshot(&self.dex, &body)?;
        debug!(dex = %self.dex, rows = rows.len(), "[SOURCE] HTTP snapshot fetched");
        Ok(rows)
    }
}
