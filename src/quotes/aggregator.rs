//! Per-venue quote aggregation behind a TTL cache

use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::debug;
use crate::types::Token;
use super::{Venue, VenueQuotes};

type QuoteKey = (Address, Address, Decimal);

struct CacheEntry {
    quotes: VenueQuotes,
    fetched_at: Instant,
}

pub struct QuoteAggregator {
    venues: Vec<Arc<dyn Venue>>,
    cache: RwLock<HashMap<QuoteKey, CacheEntry>>,
    ttl: Duration,
}

impl QuoteAggregator {
    pub fn new(venues: Vec<Arc<dyn Venue>>, ttl: Duration) -> Self {
        Self {
            venues,
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    /// Venue -> amount_out snapshot for the pair. Served from cache while the
    /// entry is live; otherwise a fresh fan-out runs and the settled
    /// successes are cached before returning. Callers must treat fewer than
    /// two reporting venues as "no opportunity".
    pub async fn get_prices(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: Decimal,
    ) -> VenueQuotes {
        let key = (token_in.address, token_out.address, amount_in);

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return entry.quotes.clone();
                }
            }
        }

        let quotes = self.fetch_all(token_in, token_out, amount_in).await;
        self.cache.write().await.insert(
            key,
            CacheEntry {
                quotes: quotes.clone(),
                fetched_at: Instant::now(),
            },
        );
        quotes
    }

    /// Concurrent fan-out with no cross-venue ordering guarantee. A failed or
    /// non-positive quote excludes that venue, never the whole call.
    async fn fetch_all(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: Decimal,
    ) -> VenueQuotes {
        let mut set = JoinSet::new();
        for venue in &self.venues {
            let venue = Arc::clone(venue);
            let token_in = token_in.clone();
            let token_out = token_out.clone();
            set.spawn(async move {
                match venue.amount_out(&token_in, &token_out, amount_in).await {
                    Ok(out) if out > Decimal::ZERO => Some((venue.name().to_string(), out)),
                    Ok(out) => {
                        debug!("Venue {} returned non-positive quote {}", venue.name(), out);
                        None
                    }
                    Err(e) => {
                        debug!("Quote fetch failed on {}: {}", venue.name(), e);
                        None
                    }
                }
            });
        }

        let mut quotes = VenueQuotes::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(Some((name, out))) = joined {
                quotes.insert(name, out);
            }
        }
        quotes
    }

    /// Drops entries past their TTL so stale pairs do not accumulate.
    pub async fn clear_expired(&self) {
        let ttl = self.ttl;
        self.cache
            .write()
            .await
            .retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingVenue {
        name: &'static str,
        quote: Option<Decimal>,
        calls: AtomicUsize,
    }

    impl CountingVenue {
        fn new(name: &'static str, quote: Option<Decimal>) -> Arc<Self> {
            Arc::new(Self {
                name,
                quote,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Venue for CountingVenue {
        fn name(&self) -> &str {
            self.name
        }

        async fn amount_out(
            &self,
            _token_in: &Token,
            _token_out: &Token,
            _amount_in: Decimal,
        ) -> anyhow::Result<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quote.ok_or_else(|| anyhow!("venue offline"))
        }
    }

    fn pair() -> (Token, Token) {
        (
            Token::new("X", Address::repeat_byte(0x11)),
            Token::new("Y", Address::repeat_byte(0x22)),
        )
    }

    #[tokio::test]
    async fn serves_identical_map_from_cache_within_ttl() {
        let venue_a = CountingVenue::new("a", Some(dec!(100)));
        let venue_b = CountingVenue::new("b", Some(dec!(105)));
        let aggregator = QuoteAggregator::new(
            vec![venue_a.clone(), venue_b.clone()],
            Duration::from_millis(200),
        );
        let (x, y) = pair();

        let first = aggregator.get_prices(&x, &y, dec!(1)).await;
        let second = aggregator.get_prices(&x, &y, dec!(1)).await;

        assert_eq!(first, second);
        assert_eq!(venue_a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(venue_b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refetches_after_ttl_expiry() {
        let venue = CountingVenue::new("a", Some(dec!(100)));
        let aggregator = QuoteAggregator::new(vec![venue.clone()], Duration::from_millis(30));
        let (x, y) = pair();

        aggregator.get_prices(&x, &y, dec!(1)).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        aggregator.get_prices(&x, &y, dec!(1)).await;

        assert_eq!(venue.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn excludes_failing_venue_from_snapshot() {
        let good = CountingVenue::new("good", Some(dec!(100)));
        let bad = CountingVenue::new("bad", None);
        let aggregator =
            QuoteAggregator::new(vec![good, bad], Duration::from_millis(200));
        let (x, y) = pair();

        let quotes = aggregator.get_prices(&x, &y, dec!(1)).await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes.get("good"), Some(&dec!(100)));
        assert!(!quotes.contains_key("bad"));
    }

    #[tokio::test]
    async fn excludes_non_positive_quotes() {
        let zero = CountingVenue::new("zero", Some(dec!(0)));
        let aggregator = QuoteAggregator::new(vec![zero], Duration::from_millis(200));
        let (x, y) = pair();

        let quotes = aggregator.get_prices(&x, &y, dec!(1)).await;
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn distinct_amounts_are_cached_separately() {
        let venue = CountingVenue::new("a", Some(dec!(100)));
        let aggregator = QuoteAggregator::new(vec![venue.clone()], Duration::from_millis(200));
        let (x, y) = pair();

        aggregator.get_prices(&x, &y, dec!(1)).await;
        aggregator.get_prices(&x, &y, dec!(2)).await;

        assert_eq!(venue.calls.load(Ordering::SeqCst), 2);
    }
}
