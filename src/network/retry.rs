//! Jittered exponential backoff for the startup venue probes

use anyhow::Result;
use rand::Rng;
use std::time::Duration;
use tracing::warn;
use crate::config::Config;
use crate::errors::{BotError, BotResult};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Attempt budget comes from the MAX_RETRIES knob; a zero knob still
    /// probes once.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            ..Self::default()
        }
    }

    /// Delay after the given zero-based attempt: doubling from the initial
    /// delay, capped, with up to 10% random jitter on top.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let doubled = self
            .initial_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped = doubled.min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0..=capped / 10);
        Duration::from_millis(capped + jitter)
    }
}

/// Runs `operation` until it succeeds or the attempt budget is spent. The
/// terminal error keeps the probed target's name and the last underlying
/// failure.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    target: &str,
) -> BotResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..config.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt + 1 < config.max_attempts {
                    let delay = config.backoff_delay(attempt);
                    warn!(
                        "Probe of {} failed on attempt {}/{}: {}. Backing off {:?}",
                        target,
                        attempt + 1,
                        config.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(BotError::Network {
        message: format!(
            "{} still failing after {} attempts",
            target, config.max_attempts
        ),
        source: last_error,
        retry_count: config.max_attempts,
    })
}
