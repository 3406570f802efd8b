//! Flash-loan amplified cross-venue arbitrage

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::config::FLASH_LOAN_FEE_RATE;
use crate::types::{Opportunity, OpportunityKind};
use super::{DetectionContext, OpportunityDetector};

/// Same spread math as the direct strategy but sized by the loan amount, with
/// the lender premium and a gas estimate charged on top.
pub struct FlashLoanDetector;

#[async_trait]
impl OpportunityDetector for FlashLoanDetector {
    fn name(&self) -> &'static str {
        "flash_loan"
    }

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity> {
        let amount = ctx.config.flash_loan_amount;
        let fees = FLASH_LOAN_FEE_RATE * amount + ctx.config.gas_cost_estimate;
        let threshold = ctx.config.min_profit_rate * amount;
        let mut out = Vec::new();

        for (i, token_in) in ctx.config.tokens.iter().enumerate() {
            for token_out in ctx.config.tokens.iter().skip(i + 1) {
                let quotes = ctx.aggregator.get_prices(token_in, token_out, amount).await;
                if quotes.len() < 2 {
                    continue;
                }

                // Same tie-break as the direct strategy: amount first, venue
                // name second.
                let by_amount_then_name =
                    |a: &(&String, &Decimal), b: &(&String, &Decimal)| a.1.cmp(b.1).then(a.0.cmp(b.0));
                let (buy_venue, min_out) = match quotes.iter().min_by(by_amount_then_name) {
                    Some((venue, out)) => (venue.clone(), *out),
                    None => continue,
                };
                let (sell_venue, max_out) = match quotes.iter().max_by(by_amount_then_name) {
                    Some((venue, out)) => (venue.clone(), *out),
                    None => continue,
                };

                let profit = max_out - min_out - fees;
                if profit > threshold {
                    out.push(Opportunity::new(
                        OpportunityKind::FlashLoan {
                            token_in: token_in.clone(),
                            token_out: token_out.clone(),
                            amount,
                            buy_venue,
                            sell_venue,
                        },
                        profit,
                        dec!(0.85),
                    ));
                }
            }
        }
        out
    }
}
