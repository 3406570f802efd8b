//! Multi-DEX arbitrage and MEV opportunity engine for Polygon
//!
//! The engine scans venue quotes and buffered pending transactions for
//! direct, triangular, flash-loan, sandwich and market-making opportunities,
//! ranks them, and drives the best candidate through a concurrency-limited
//! execution pipeline guarded by drawdown and loss-streak limits.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod quotes;
pub mod mempool;
pub mod detectors;
pub mod execution;
pub mod risk;
pub mod metrics;
pub mod engine;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use engine::TradingEngine;
pub use errors::{BotError, BotResult};
pub use types::*;
