//! Direct cross-venue arbitrage detection

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::config::SWAP_FEE_RATE;
use crate::types::{Opportunity, OpportunityKind};
use super::{DetectionContext, OpportunityDetector};

/// Buy on the cheapest venue, sell on the most expensive one, same pair.
pub struct DirectArbitrageDetector;

#[async_trait]
impl OpportunityDetector for DirectArbitrageDetector {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity> {
        let amount_in = ctx.config.reference_amount;
        let fee = SWAP_FEE_RATE * amount_in;
        let threshold = ctx.config.min_profit_rate * amount_in;
        let mut out = Vec::new();

        for token_a in &ctx.config.tokens {
            for token_b in &ctx.config.tokens {
                if token_a == token_b {
                    continue;
                }

                let quotes = ctx.aggregator.get_prices(token_a, token_b, amount_in).await;
                // Arbitrage math needs at least two reporting venues.
                if quotes.len() < 2 {
                    continue;
                }

                // Ties on amount break on venue name; map iteration order
                // must never pick the venue.
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

                let profit = max_out - min_out - fee;
                if profit > threshold {
                    out.push(Opportunity::new(
                        OpportunityKind::Direct {
                            token_a: token_a.clone(),
                            token_b: token_b.clone(),
                            buy_venue,
                            sell_venue,
                            amount_in,
                        },
                        profit,
                        dec!(0.9),
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use std::sync::Arc;
    use std::time::Duration;
    use crate::{
        config::Config,
        mempool::PendingTxBuffer,
        quotes::{QuoteAggregator, SimulatedVenue, Venue},
        types::Token,
    };

    fn pair() -> (Token, Token) {
        (
            Token::new("X", Address::repeat_byte(0x11)),
            Token::new("Y", Address::repeat_byte(0x22)),
        )
    }

    fn context(venues: Vec<Arc<dyn Venue>>, tokens: Vec<Token>) -> DetectionContext {
        let config = Config {
            tokens,
            triangular_paths: vec![],
            min_profit_rate: dec!(0.0005),
            reference_amount: Decimal::ONE,
            ..Config::load()
        };
        DetectionContext {
            aggregator: Arc::new(QuoteAggregator::new(venues, Duration::from_millis(200))),
            mempool: Arc::new(PendingTxBuffer::new()),
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn emits_buy_low_sell_high_with_fee_netted_out() {
        let (x, y) = pair();
        let venues: Vec<Arc<dyn Venue>> = vec![
            Arc::new(SimulatedVenue::new("venue_a", 0).with_rate(&x, &y, dec!(100))),
            Arc::new(SimulatedVenue::new("venue_b", 0).with_rate(&x, &y, dec!(105))),
            Arc::new(SimulatedVenue::new("venue_c", 0).with_rate(&x, &y, dec!(98))),
        ];
        let ctx = context(venues, vec![x, y]);

        let opportunities = DirectArbitrageDetector.produce_opportunities(&ctx).await;
        assert_eq!(opportunities.len(), 1);

        let opp = &opportunities[0];
        // 105 - 98 - 0.003 * 1
        assert_eq!(opp.expected_profit, dec!(6.997));
        match &opp.kind {
            OpportunityKind::Direct {
                buy_venue,
                sell_venue,
                ..
            } => {
                assert_eq!(buy_venue, "venue_c");
                assert_eq!(sell_venue, "venue_b");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[tokio::test]
    async fn tied_quotes_pick_venues_by_name() {
        let (x, y) = pair();
        let venues: Vec<Arc<dyn Venue>> = vec![
            Arc::new(SimulatedVenue::new("beta", 0).with_rate(&x, &y, dec!(100))),
            Arc::new(SimulatedVenue::new("alpha", 0).with_rate(&x, &y, dec!(100))),
            Arc::new(SimulatedVenue::new("gamma", 0).with_rate(&x, &y, dec!(107))),
            Arc::new(SimulatedVenue::new("delta", 0).with_rate(&x, &y, dec!(107))),
        ];
        let ctx = context(venues, vec![x, y]);

        let opportunities = DirectArbitrageDetector.produce_opportunities(&ctx).await;
        assert_eq!(opportunities.len(), 1);
        match &opportunities[0].kind {
            OpportunityKind::Direct {
                buy_venue,
                sell_venue,
                ..
            } => {
                // Lexically first of the tied minimums, last of the tied
                // maximums.
                assert_eq!(buy_venue, "alpha");
                assert_eq!(sell_venue, "gamma");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[tokio::test]
    async fn never_emits_with_fewer_than_two_venues() {
        let (x, y) = pair();
        let venues: Vec<Arc<dyn Venue>> = vec![Arc::new(
            SimulatedVenue::new("only", 0).with_rate(&x, &y, dec!(100)),
        )];
        let ctx = context(venues, vec![x, y]);

        let opportunities = DirectArbitrageDetector.produce_opportunities(&ctx).await;
        assert!(opportunities.is_empty());
    }

    #[tokio::test]
    async fn spread_below_fee_plus_threshold_is_ignored() {
        let (x, y) = pair();
        let venues: Vec<Arc<dyn Venue>> = vec![
            Arc::new(SimulatedVenue::new("venue_a", 0).with_rate(&x, &y, dec!(100))),
            Arc::new(SimulatedVenue::new("venue_b", 0).with_rate(&x, &y, dec!(100.003))),
        ];
        let ctx = context(venues, vec![x, y]);

        let opportunities = DirectArbitrageDetector.produce_opportunities(&ctx).await;
        assert!(opportunities.is_empty());
    }
}
