//! Custom error types for the engine

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Quote fetch failed on {venue}: {message}")]
    Quote {
        venue: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Execution capacity exhausted: {active}/{max} slots in flight")]
    CapacityExhausted {
        active: usize,
        max: usize,
    },

    #[error("Duplicate submission rejected for {dedup_key}")]
    DuplicateSubmission {
        dedup_key: String,
    },

    #[error("Trading halted by risk guard: {reason}")]
    RiskHalted {
        reason: String,
    },

    #[error("Insufficient capital: {provided} provided, minimum is {minimum}")]
    InsufficientCapital {
        provided: Decimal,
        minimum: Decimal,
    },

    #[error("Environment validation failed: {reason}")]
    Environment {
        reason: String,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },
}

pub type BotResult<T> = Result<T, BotError>;
