//! Sandwich candidate scanning over buffered pending swaps

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::config::{
    SANDWICH_CANDIDATE_WINDOW_SECS, SANDWICH_FRONT_RUN_RATIO, SANDWICH_PURGE_AGE_SECS,
    SWAP_FEE_RATE,
};
use crate::mempool::{decode_swap, DecodedSwap};
use crate::types::{Opportunity, OpportunityKind};
use super::{DetectionContext, OpportunityDetector};

/// Profit estimator for one candidate. Swappable so the detector logic stays
/// fixed while the model evolves.
pub trait SandwichProfitModel: Send + Sync {
    fn estimate(&self, swap: &DecodedSwap, front_amount: Decimal) -> Decimal;
}

/// Constant-depth price-impact model: the victim's trade moves the price by
/// victim / (victim + depth), the front-run position captures that move, and
/// both legs pay the swap fee.
pub struct PriceImpactModel {
    pub assumed_pool_depth: Decimal,
}

impl Default for PriceImpactModel {
    fn default() -> Self {
        Self {
            assumed_pool_depth: dec!(100000),
        }
    }
}

impl SandwichProfitModel for PriceImpactModel {
    fn estimate(&self, swap: &DecodedSwap, front_amount: Decimal) -> Decimal {
        let impact = swap.amount_in / (swap.amount_in + self.assumed_pool_depth);
        front_amount * impact - dec!(2) * SWAP_FEE_RATE * front_amount
    }
}

pub struct SandwichDetector {
    model: Arc<dyn SandwichProfitModel>,
}

impl SandwichDetector {
    pub fn new(model: Arc<dyn SandwichProfitModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl OpportunityDetector for SandwichDetector {
    fn name(&self) -> &'static str {
        "sandwich"
    }

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity> {
        let window = Duration::from_secs(SANDWICH_CANDIDATE_WINDOW_SECS);
        let purge_age = Duration::from_secs(SANDWICH_PURGE_AGE_SECS);
        let gas_cap_wei = u128::from(ctx.config.max_sandwich_gas_gwei) * 1_000_000_000;

        let mut out = Vec::new();
        for buffered in ctx.mempool.usable(window, purge_age).await {
            // Outbidding past the cap would eat the profit.
            if buffered.record.gas_price_wei > gas_cap_wei {
                continue;
            }

            let swap = match decode_swap(&buffered.record.input) {
                Some(swap) => swap,
                None => {
                    debug!("Skipping undecodable pending tx {}", buffered.record.hash);
                    continue;
                }
            };

            let front_amount = SANDWICH_FRONT_RUN_RATIO * swap.amount_in;
            let profit = self.model.estimate(&swap, front_amount);
            let threshold = ctx.config.min_profit_rate * front_amount;
            if profit <= threshold {
                continue;
            }

            let remaining = window.saturating_sub(buffered.seen_at.elapsed());
            let deadline = Utc::now()
                + chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::zero());

            out.push(Opportunity::new(
                OpportunityKind::Sandwich {
                    target_tx_hash: buffered.record.hash.clone(),
                    token_in: swap.token_in,
                    token_out: swap.token_out,
                    front_amount,
                    victim_amount: swap.amount_in,
                    deadline,
                },
                profit,
                dec!(0.95),
            ));
        }
        out
    }
}
