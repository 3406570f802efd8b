//! Spread-capture market making over an order-book source

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use crate::types::{Opportunity, OpportunityKind, Token};
use super::{DetectionContext, OpportunityDetector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopOfBook {
    pub highest_bid: Decimal,
    pub lowest_ask: Decimal,
}

/// Book snapshots come from outside the quote aggregator; a source that has
/// no book for the pair answers None and the pair is skipped.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    async fn top_of_book(&self, base: &Token, quote: &Token) -> Option<TopOfBook>;
}

/// Placeholder source for paper runs without book connectivity.
pub struct NullOrderBookSource;

#[async_trait]
impl OrderBookSource for NullOrderBookSource {
    async fn top_of_book(&self, _base: &Token, _quote: &Token) -> Option<TopOfBook> {
        None
    }
}

pub struct MarketMakingDetector {
    source: Arc<dyn OrderBookSource>,
}

impl MarketMakingDetector {
    pub fn new(source: Arc<dyn OrderBookSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl OpportunityDetector for MarketMakingDetector {
    fn name(&self) -> &'static str {
        "market_making"
    }

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity> {
        let order_size = ctx.config.mm_order_size;
        let mut out = Vec::new();

        for (i, base) in ctx.config.tokens.iter().enumerate() {
            for quote in ctx.config.tokens.iter().skip(i + 1) {
                let book = match self.source.top_of_book(base, quote).await {
                    Some(book) => book,
                    None => continue,
                };
                if book.highest_bid <= Decimal::ZERO || book.lowest_ask <= book.highest_bid {
                    continue;
                }

                let spread = (book.lowest_ask - book.highest_bid) / book.highest_bid;
                if spread <= ctx.config.mm_min_spread {
                    continue;
                }

                // Quote just inside the book on both sides.
                let bid_price = book.highest_bid * dec!(1.001);
                let ask_price = book.lowest_ask * dec!(0.999);
                let expected = (ask_price - bid_price) * order_size;
                if expected <= Decimal::ZERO {
                    continue;
                }

                out.push(Opportunity::new(
                    OpportunityKind::MarketMaking {
                        token_a: base.clone(),
                        token_b: quote.clone(),
                        bid_price,
                        ask_price,
                        amount: order_size,
                    },
                    expected,
                    dec!(0.8),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use std::collections::HashMap;
    use std::time::Duration;
    use crate::{
        config::Config,
        mempool::PendingTxBuffer,
        quotes::QuoteAggregator,
    };

    struct FixedBook {
        books: HashMap<(Address, Address), TopOfBook>,
    }

    #[async_trait]
    impl OrderBookSource for FixedBook {
        async fn top_of_book(&self, base: &Token, quote: &Token) -> Option<TopOfBook> {
            self.books.get(&(base.address, quote.address)).copied()
        }
    }

    fn pair() -> (Token, Token) {
        (
            Token::new("X", Address::repeat_byte(0x11)),
            Token::new("Y", Address::repeat_byte(0x22)),
        )
    }

    fn context(tokens: Vec<Token>) -> DetectionContext {
        let config = Config {
            tokens,
            triangular_paths: vec![],
            mm_order_size: dec!(10),
            mm_min_spread: dec!(0.001),
            ..Config::load()
        };
        DetectionContext {
            aggregator: Arc::new(QuoteAggregator::new(vec![], Duration::from_millis(200))),
            mempool: Arc::new(PendingTxBuffer::new()),
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn wide_spread_emits_inside_quotes() {
        let (x, y) = pair();
        let mut books = HashMap::new();
        books.insert(
            (x.address, y.address),
            TopOfBook {
                highest_bid: dec!(100),
                lowest_ask: dec!(101),
            },
        );
        let detector = MarketMakingDetector::new(Arc::new(FixedBook { books }));
        let ctx = context(vec![x, y]);

        let opportunities = detector.produce_opportunities(&ctx).await;
        assert_eq!(opportunities.len(), 1);
        match &opportunities[0].kind {
            OpportunityKind::MarketMaking {
                bid_price,
                ask_price,
                amount,
                ..
            } => {
                assert_eq!(*bid_price, dec!(100.1));
                assert_eq!(*ask_price, dec!(100.899));
                assert_eq!(*amount, dec!(10));
                // (100.899 - 100.1) * 10
                assert_eq!(opportunities[0].expected_profit, dec!(7.99));
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[tokio::test]
    async fn tight_spread_is_ignored() {
        let (x, y) = pair();
        let mut books = HashMap::new();
        books.insert(
            (x.address, y.address),
            TopOfBook {
                highest_bid: dec!(100),
                lowest_ask: dec!(100.05),
            },
        );
        let detector = MarketMakingDetector::new(Arc::new(FixedBook { books }));
        let ctx = context(vec![x, y]);

        assert!(detector.produce_opportunities(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn null_source_never_emits() {
        let (x, y) = pair();
        let detector = MarketMakingDetector::new(Arc::new(NullOrderBookSource));
        let ctx = context(vec![x, y]);
        assert!(detector.produce_opportunities(&ctx).await.is_empty());
    }
}
