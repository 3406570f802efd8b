//! Venue quote capability seam

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use crate::types::Token;

/// Output amounts keyed by venue name.
pub type VenueQuotes = HashMap<String, Decimal>;

/// A liquidity source exposing a price-quote capability. Each call is
/// fallible per venue; the aggregator excludes failures from its snapshot.
#[async_trait]
pub trait Venue: Send + Sync {
    fn name(&self) -> &str;

    /// Output amount for swapping `amount_in` of `token_in` into `token_out`.
    async fn amount_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: Decimal,
    ) -> Result<Decimal>;
}
