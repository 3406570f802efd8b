//! Polygon MEV Bot - Main Entry Point

use poly_mev_bot::*;
use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use crate::execution::PaperSubmitter;
use crate::network::{retry_with_backoff, FixedGasOracle, RetryConfig};
use crate::quotes::{SimulatedVenue, Venue};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    let config = Config::load();

    info!("🤖 Polygon MEV Bot v0.3.0 - Opportunity Detection & Execution");
    info!("📋 Configuration:");
    info!("   Scan Interval: {}ms", config.scan_interval_ms);
    info!("   Quote Cache TTL: {}ms", config.quote_cache_ttl_ms);
    info!("   Min Profit Rate: {}", config.min_profit_rate);
    info!("   Max Concurrent Executions: {}", config.max_concurrent);
    info!("   Execution Timeout: {}s", config.execution_timeout_secs);
    info!("   Max Daily Loss Rate: {}", config.max_daily_loss_rate);
    info!("   Tokens: {}", config.tokens.len());
    info!("   Triangular Paths: {}", config.triangular_paths.len());

    if config.enable_live_submission {
        config::validate_environment(&config)?;
        info!("   ⚠️  Live submission enabled");
    } else {
        info!("   📝 Paper mode - no transactions leave the process");
    }

    let venues = build_paper_venues(&config);
    info!("   Venues: {}", venues.len());

    // Probe each venue once so a dead quote source surfaces at startup
    // instead of as silent empty scans.
    let retry = RetryConfig::from_config(&config);
    let probe_in = &config.tokens[0];
    let probe_out = &config.tokens[1];
    for venue in &venues {
        let quote = retry_with_backoff(
            || async { venue.amount_out(probe_in, probe_out, Decimal::ONE).await },
            &retry,
            venue.name(),
        )
        .await?;
        info!("✅ {} quoting {}/{} at {}", venue.name(), probe_in.symbol, probe_out.symbol, quote);
    }

    let engine = TradingEngine::new(
        config.clone(),
        venues,
        Arc::new(PaperSubmitter::default()),
        Arc::new(FixedGasOracle::default()),
    );

    let capital = std::env::var("INITIAL_CAPITAL")
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(config.min_capital);
    engine.start(capital).await?;

    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received");

    let stats = engine.stop().await;
    info!("📊 Final stats:\n{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

fn build_paper_venues(config: &Config) -> Vec<Arc<dyn Venue>> {
    let jitter_bps = 40;
    ["quickswap", "sushiswap", "apeswap", "jetswap", "polycat"]
        .iter()
        .map(|name| {
            Arc::new(SimulatedVenue::seeded(name, &config.tokens, jitter_bps)) as Arc<dyn Venue>
        })
        .collect()
}
