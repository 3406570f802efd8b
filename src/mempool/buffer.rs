//! Bounded-staleness buffer over the external mempool subscription

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// One record from the pending-transaction feed.
#[derive(Debug, Clone)]
pub struct PendingTxRecord {
    pub hash: String,
    pub input: Vec<u8>,
    pub gas_price_wei: u128,
}

#[derive(Debug, Clone)]
pub struct BufferedTx {
    pub record: PendingTxRecord,
    pub seen_at: Instant,
}

#[derive(Default)]
pub struct PendingTxBuffer {
    inner: RwLock<HashMap<String, BufferedTx>>,
}

impl PendingTxBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fed by the external mempool subscription. Re-announcements of a hash
    /// already buffered keep the original seen-at instant.
    pub async fn push(&self, record: PendingTxRecord) {
        let mut map = self.inner.write().await;
        map.entry(record.hash.clone()).or_insert_with(|| BufferedTx {
            record,
            seen_at: Instant::now(),
        });
    }

    /// Purges records older than `purge_age` outright, then returns those
    /// still inside the candidate `window`.
    pub async fn usable(&self, window: Duration, purge_age: Duration) -> Vec<BufferedTx> {
        let mut map = self.inner.write().await;
        map.retain(|_, tx| tx.seen_at.elapsed() < purge_age);
        map.values()
            .filter(|tx| tx.seen_at.elapsed() <= window)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str) -> PendingTxRecord {
        PendingTxRecord {
            hash: hash.to_string(),
            input: vec![],
            gas_price_wei: 30_000_000_000,
        }
    }

    #[tokio::test]
    async fn duplicate_hashes_are_buffered_once() {
        let buffer = PendingTxBuffer::new();
        buffer.push(record("0xabc")).await;
        buffer.push(record("0xabc")).await;
        assert_eq!(buffer.len().await, 1);
    }

    #[tokio::test]
    async fn usable_respects_window_and_purges_old_records() {
        let buffer = PendingTxBuffer::new();
        buffer.push(record("0xaaa")).await;

        let usable = buffer
            .usable(Duration::from_millis(100), Duration::from_millis(200))
            .await;
        assert_eq!(usable.len(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        // Outside the candidate window but not yet purge age.
        let usable = buffer
            .usable(Duration::from_millis(100), Duration::from_millis(400))
            .await;
        assert!(usable.is_empty());
        assert_eq!(buffer.len().await, 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        // Past purge age: removed outright.
        let usable = buffer
            .usable(Duration::from_millis(100), Duration::from_millis(200))
            .await;
        assert!(usable.is_empty());
        assert!(buffer.is_empty().await);
    }
}
