//! Three-leg cycle arbitrage detection

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::config::SWAP_FEE_RATE;
use crate::types::{Opportunity, OpportunityKind};
use super::{DetectionContext, OpportunityDetector};

/// Relative return of the cycle A -> B -> C -> A at the given leg prices,
/// where each price is quoted as units of the leg's input token per unit of
/// its output token. Each leg pays the swap fee once. Returns None when any
/// price is non-positive.
pub fn triangular_profit(
    p_ab: Decimal,
    p_bc: Decimal,
    p_ca: Decimal,
    fee_rate: Decimal,
) -> Option<Decimal> {
    if p_ab <= Decimal::ZERO || p_bc <= Decimal::ZERO || p_ca <= Decimal::ZERO {
        return None;
    }
    let keep = Decimal::ONE - fee_rate;
    Some((Decimal::ONE / p_ab) * (Decimal::ONE / p_bc) * (Decimal::ONE / p_ca) * keep * keep * keep
        - Decimal::ONE)
}

/// Walks each configured three-token cycle routing every leg through the
/// venue with the best per-unit rate.
pub struct TriangularArbitrageDetector;

impl TriangularArbitrageDetector {
    async fn best_leg_rate(
        ctx: &DetectionContext,
        token_in: &crate::types::Token,
        token_out: &crate::types::Token,
    ) -> Option<Decimal> {
        let quotes = ctx.aggregator.get_prices(token_in, token_out, Decimal::ONE).await;
        quotes.values().max().copied()
    }
}

#[async_trait]
impl OpportunityDetector for TriangularArbitrageDetector {
    fn name(&self) -> &'static str {
        "triangular"
    }

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity> {
        let amount_in = ctx.config.reference_amount;
        let mut out = Vec::new();

        for path in &ctx.config.triangular_paths {
            let [a, b, c] = path;

            let r_ab = match Self::best_leg_rate(ctx, a, b).await {
                Some(rate) if rate > Decimal::ZERO => rate,
                _ => continue,
            };
            let r_bc = match Self::best_leg_rate(ctx, b, c).await {
                Some(rate) if rate > Decimal::ZERO => rate,
                _ => continue,
            };
            let r_ca = match Self::best_leg_rate(ctx, c, a).await {
                Some(rate) if rate > Decimal::ZERO => rate,
                _ => continue,
            };

            // A venue rate is output per unit input; the cycle math wants the
            // inverse price on each leg.
            let relative = match triangular_profit(
                Decimal::ONE / r_ab,
                Decimal::ONE / r_bc,
                Decimal::ONE / r_ca,
                SWAP_FEE_RATE,
            ) {
                Some(relative) => relative,
                None => continue,
            };

            if relative > ctx.config.min_profit_rate {
                out.push(Opportunity::new(
                    OpportunityKind::Triangular {
                        path: path.clone(),
                        relative_return: relative,
                        amount_in,
                    },
                    relative * amount_in,
                    dec!(0.85),
                ));
            }
        }
        out
    }
}
