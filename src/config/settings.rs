//! Engine configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::types::{default_tokens, default_triangular_paths, Token};

// Quote aggregation
pub const QUOTE_CACHE_TTL_MS: u64 = 200;
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 500;
pub const MIN_SCAN_INTERVAL_MS: u64 = 100;
pub const MAX_SCAN_INTERVAL_MS: u64 = 5_000;

// Profit model
pub const SWAP_FEE_RATE: Decimal = dec!(0.003); // 0.3% per trade
pub const FLASH_LOAN_FEE_RATE: Decimal = dec!(0.0009); // AAVE V3 premium
pub const DEFAULT_MIN_PROFIT_RATE: Decimal = dec!(0.0005); // 0.05%
pub const DEFAULT_REFERENCE_AMOUNT: Decimal = dec!(1);
pub const DEFAULT_GAS_COST_ESTIMATE: Decimal = dec!(0.05);

// Execution limits
pub const MAX_CONCURRENT_EXECUTIONS: usize = 5;
pub const MIN_SUBMISSION_INTERVAL_MS: u64 = 500;
pub const EXECUTION_TIMEOUT_SECS: u64 = 30;
pub const TIMEOUT_SWEEP_INTERVAL_MS: u64 = 1_000;

// Gas policy
pub const GAS_PRICE_MULTIPLIER_PCT: u64 = 110;
pub const GAS_LIMIT_MULTIPLIER_PCT: u64 = 120;
pub const DEFAULT_GAS_LIMIT_ESTIMATE: u64 = 250_000;

// Sandwich scanning
pub const SANDWICH_FRONT_RUN_RATIO: Decimal = dec!(0.2);
pub const SANDWICH_CANDIDATE_WINDOW_SECS: u64 = 10;
pub const SANDWICH_PURGE_AGE_SECS: u64 = 30;
pub const DEFAULT_MAX_SANDWICH_GAS_GWEI: u64 = 100;

// Risk limits
pub const MAX_DAILY_LOSS_RATE: Decimal = dec!(0.03);
pub const MAX_CONSECUTIVE_LOSSES: u32 = 3;
pub const DEFAULT_MIN_CAPITAL: Decimal = dec!(100);

pub const METRICS_EMIT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub scan_interval_ms: u64,
    pub quote_cache_ttl_ms: u64,
    pub min_profit_rate: Decimal,
    pub reference_amount: Decimal,
    pub flash_loan_amount: Decimal,
    pub mm_order_size: Decimal,
    pub mm_min_spread: Decimal,
    pub max_concurrent: usize,
    pub min_submission_interval_ms: u64,
    pub execution_timeout_secs: u64,
    pub max_sandwich_gas_gwei: u64,
    pub gas_cost_estimate: Decimal,
    pub count_timeouts_as_losses: bool,
    pub min_capital: Decimal,
    pub max_daily_loss_rate: Decimal,
    pub max_consecutive_losses: u32,
    /// Exposed for a higher layer; the scan loop itself never retries.
    pub max_retries: u32,
    pub metrics_emit_interval_secs: u64,
    pub enable_live_submission: bool,
    pub rpc_endpoint: Option<String>,
    pub private_key: Option<String>,
    pub wallet_address: Option<String>,
    pub tokens: Vec<Token>,
    pub triangular_paths: Vec<[Token; 3]>,
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    env::var(key)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn load() -> Self {
        let tokens = default_tokens();
        let triangular_paths = default_triangular_paths(&tokens);

        Self {
            scan_interval_ms: env_u64("SCAN_INTERVAL_MS", DEFAULT_SCAN_INTERVAL_MS)
                .clamp(MIN_SCAN_INTERVAL_MS, MAX_SCAN_INTERVAL_MS),
            quote_cache_ttl_ms: env_u64("QUOTE_CACHE_TTL_MS", QUOTE_CACHE_TTL_MS),
            min_profit_rate: env_decimal("MIN_PROFIT_RATE", DEFAULT_MIN_PROFIT_RATE)
                .max(Decimal::ZERO),
            reference_amount: env_decimal("REFERENCE_AMOUNT", DEFAULT_REFERENCE_AMOUNT),
            flash_loan_amount: env_decimal("FLASH_LOAN_AMOUNT", dec!(1000)),
            mm_order_size: env_decimal("MM_ORDER_SIZE", dec!(0.1)),
            mm_min_spread: env_decimal("MM_MIN_SPREAD", dec!(0.001)),
            max_concurrent: env_u64("MAX_CONCURRENT_EXECUTIONS", MAX_CONCURRENT_EXECUTIONS as u64)
                as usize,
            min_submission_interval_ms: env_u64(
                "MIN_SUBMISSION_INTERVAL_MS",
                MIN_SUBMISSION_INTERVAL_MS,
            ),
            execution_timeout_secs: env_u64("EXECUTION_TIMEOUT_SECS", EXECUTION_TIMEOUT_SECS),
            max_sandwich_gas_gwei: env_u64("MAX_SANDWICH_GAS_GWEI", DEFAULT_MAX_SANDWICH_GAS_GWEI),
            gas_cost_estimate: env_decimal("GAS_COST_ESTIMATE", DEFAULT_GAS_COST_ESTIMATE),
            count_timeouts_as_losses: env_bool("COUNT_TIMEOUTS_AS_LOSSES", true),
            min_capital: env_decimal("MIN_CAPITAL", DEFAULT_MIN_CAPITAL),
            max_daily_loss_rate: env_decimal("MAX_DAILY_LOSS_RATE", MAX_DAILY_LOSS_RATE),
            max_consecutive_losses: env_u64(
                "MAX_CONSECUTIVE_LOSSES",
                MAX_CONSECUTIVE_LOSSES as u64,
            ) as u32,
            max_retries: env_u64("MAX_RETRIES", 3) as u32,
            metrics_emit_interval_secs: env_u64(
                "METRICS_EMIT_INTERVAL_SECS",
                METRICS_EMIT_INTERVAL_SECS,
            ),
            enable_live_submission: env_bool("ENABLE_LIVE_SUBMISSION", false),
            rpc_endpoint: env::var("RPC_ENDPOINT").ok(),
            private_key: env::var("PRIVATE_KEY").ok(),
            wallet_address: env::var("WALLET_ADDRESS").ok(),
            tokens,
            triangular_paths,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.quote_cache_ttl_ms)
    }

    pub fn min_submission_interval(&self) -> Duration {
        Duration::from_millis(self.min_submission_interval_ms)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load()
    }
}
