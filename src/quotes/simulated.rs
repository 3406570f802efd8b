//! Simulated venues for paper-trading runs and tests

use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use crate::errors::BotError;
use crate::types::Token;
use super::Venue;

/// Fixed-rate venue with optional per-call jitter. With zero jitter it is
/// fully deterministic, which the detector tests rely on.
pub struct SimulatedVenue {
    name: String,
    rates: HashMap<(Address, Address), Decimal>,
    jitter_bps: u32,
}

impl SimulatedVenue {
    pub fn new(name: &str, jitter_bps: u32) -> Self {
        Self {
            name: name.to_string(),
            rates: HashMap::new(),
            jitter_bps,
        }
    }

    pub fn with_rate(mut self, token_in: &Token, token_out: &Token, rate: Decimal) -> Self {
        self.rates.insert((token_in.address, token_out.address), rate);
        self
    }

    /// Unit rates for every ordered pair of `tokens`; jitter makes venues
    /// disagree enough to surface occasional paper arbitrage.
    pub fn seeded(name: &str, tokens: &[Token], jitter_bps: u32) -> Self {
        let mut venue = Self::new(name, jitter_bps);
        for token_in in tokens {
            for token_out in tokens {
                if token_in != token_out {
                    venue
                        .rates
                        .insert((token_in.address, token_out.address), dec!(1));
                }
            }
        }
        venue
    }
}

#[async_trait]
impl Venue for SimulatedVenue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn amount_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: Decimal,
    ) -> Result<Decimal> {
        let rate = self
            .rates
            .get(&(token_in.address, token_out.address))
            .ok_or_else(|| {
                anyhow::Error::from(BotError::Quote {
                    venue: self.name.clone(),
                    message: format!("no market for {}/{}", token_in.symbol, token_out.symbol),
                    source: None,
                })
            })?;

        let mut out = amount_in * rate;
        if self.jitter_bps > 0 {
            let jitter = rand::rng().random_range(-(self.jitter_bps as i64)..=self.jitter_bps as i64);
            out *= Decimal::ONE + Decimal::from(jitter) / dec!(10000);
        }
        Ok(out)
    }
}
