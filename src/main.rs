//! Funding scanner entry point
//!
//! 1. Loads configuration and builds the scan context
//! 2. Polls every funding source on a fixed interval
//! 3. Logs ranked opportunities for each pass
//! 4. Sweeps expired cooldowns in the background

use std::time::Duration;

use anyhow::Context;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use funding_arb::adapters::{collect_quotes, sources_from_config};
use funding_arb::config::{constants, init_logging, load_config};
use funding_arb::core::ScanContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Config + logging
    // =========================================================================
    dotenvy::dotenv().ok();
    init_logging();

    info!("=== Funding Scanner ===");
    constants::log_configuration();

    let config_path = constants::config_path();
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!(
        dexes = config.dexes.len(),
        sources = config.sources.len(),
        "[CONFIG] Loaded {}",
        config_path.display()
    );

    // =========================================================================
    // 2. Context + sources
    // =========================================================================
    let ctx = ScanContext::from_config(&config)?;
    let source_timeout = constants::source_timeout();
    let sources = sources_from_config(&config, source_timeout);
    if sources.is_empty() {
        warn!("[CONFIG] No sources configured, every pass will be empty");
    }

    let scan_every = constants::scan_interval_override()
        .unwrap_or_else(|| Duration::from_secs(config.scanner.scan_interval_secs));
    let mut scan_tick = interval(scan_every);
    scan_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cleanup_tick = interval(constants::cooldown_cleanup_interval());
    cleanup_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = scan_every.as_secs(), "Press Ctrl+C to shutdown");

    // =========================================================================
    // 3. Scan loop until Ctrl+C
    // =========================================================================
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = scan_tick.tick() => {
                let snapshot = collect_quotes(&sources, ctx.default_intervals(), source_timeout).await;
                let opportunities = ctx.scan(&snapshot.quotes);
                info!(
                    quotes = snapshot.quotes.len(),
                    failed_sources = ?snapshot.failed_sources,
                    opportunities = opportunities.len(),
                    "[SCAN] Pass complete"
                );
                for (rank, opp) in opportunities.iter().enumerate() {
                    info!(
                        rank = rank + 1,
                        symbol = %opp.symbol,
                        long = %opp.long_dex,
                        short = %opp.short_dex,
                        divergence = %opp.divergence,
                        net_profit = %opp.net_profit_percent,
                        apr = %opp.annualized_divergence(),
                        "[SCAN] Opportunity"
                    );
                }
            }
            _ = cleanup_tick.tick() => {
                let removed = ctx.cleanup_cooldowns();
                if removed > 0 {
                    info!(removed = removed, "[COOLDOWN] Expired entries swept");
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl+C, stopping");
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("=== Shutdown complete ===");
    Ok(())
}
