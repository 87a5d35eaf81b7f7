//! JSON funding snapshots and the file-backed source
//!
//! A snapshot is either a list of quote rows or a bare `{symbol: rate}`
//! map. The map form carries no interval, so the DEX's configured default
//! applies downstream.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::adapters::errors::SourceResult;
use crate::adapters::traits::FundingRateSource;
use crate::core::types::RawFundingQuote;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotPayload {
    Quotes(Vec<RawFundingQuote>),
    Rates(BTreeMap<String, Decimal>),
}

/// Parse a JSON snapshot body into raw rows for `dex`.
pub fn parse_snapshot(dex: &str, body: &[u8]) -> SourceResult<Vec<RawFundingQuote>> {
    let payload: SnapshotPayload = serde_json::from_slice(body)?;
    let rows = match payload {
        SnapshotPayload::Quotes(rows) => rows,
        SnapshotPayload::Rates(rates) => rates
            .into_iter()
            .map(|(symbol, rate)| RawFundingQuote {
                symbol: Some(symbol),
                dex: Some(dex.to_string()),
                funding_rate: Some(rate),
                ..Default::default()
            })
            .collect(),
    };
    Ok(rows)
}

/// Reads a snapshot an external collector keeps rewriting on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    dex: String,
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(dex: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            dex: dex.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FundingRateSource for FileSnapshotSource {
    fn dex(&self) -> &str {
        &self.dex
    }

    async fn fetch_rates(&self) -> SourceResult<Vec<RawFundingQuote>> {
        let body = tokio::fs::read(&self.path).await?;
        let rows = parse_snapshot(&self.dex, &body)?;
        debug!(
            dex = %self.dex,
            path = %self.path.display(),
            rows = rows.len(),
            "[SOURCE] Snapshot file read"
        );
        Ok(rows)
    }
}
