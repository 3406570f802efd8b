//! Incremental performance counters and periodic emission

use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use crate::types::{ExecutionOutcome, SlotStatus};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub scanned: u64,
    pub valid: u64,
    pub executed: u64,
    pub successful: u64,
    pub failed: u64,
    pub avg_execution_ms: f64,
    pub win_rate: f64,
}

/// Where periodic snapshots go. The default sink is the structured log.
pub trait MetricsSink: Send + Sync {
    fn emit(&self, snapshot: &MetricsSnapshot);
}

pub struct LogSink;

impl MetricsSink for LogSink {
    fn emit(&self, snapshot: &MetricsSnapshot) {
        info!(
            scanned = snapshot.scanned,
            valid = snapshot.valid,
            executed = snapshot.executed,
            successful = snapshot.successful,
            failed = snapshot.failed,
            avg_execution_ms = snapshot.avg_execution_ms,
            win_rate = snapshot.win_rate,
            "📊 Performance metrics"
        );
    }
}

#[derive(Default)]
struct Counters {
    scanned: u64,
    valid: u64,
    executed: u64,
    successful: u64,
    failed: u64,
    avg_execution_ms: f64,
}

#[derive(Default)]
pub struct MetricsCollector {
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_scanned(&self, count: u64) {
        self.counters.write().await.scanned += count;
    }

    pub async fn record_valid(&self, count: u64) {
        self.counters.write().await.valid += count;
    }

    /// Folds one finished execution into the counters. The duration average
    /// is updated incrementally so no sample history is kept.
    pub async fn record_execution(&self, outcome: &ExecutionOutcome) {
        let mut counters = self.counters.write().await;
        counters.executed += 1;
        match outcome.status {
            SlotStatus::Confirmed => counters.successful += 1,
            SlotStatus::Failed | SlotStatus::TimedOut => counters.failed += 1,
            SlotStatus::Pending | SlotStatus::Submitted => {}
        }

        let sample = outcome.duration.as_secs_f64() * 1000.0;
        counters.avg_execution_ms +=
            (sample - counters.avg_execution_ms) / counters.executed as f64;
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.read().await;
        let win_rate = if counters.executed == 0 {
            0.0
        } else {
            counters.successful as f64 / counters.executed as f64 * 100.0
        };
        MetricsSnapshot {
            scanned: counters.scanned,
            valid: counters.valid,
            executed: counters.executed,
            successful: counters.successful,
            failed: counters.failed,
            avg_execution_ms: counters.avg_execution_ms,
            win_rate,
        }
    }

    pub async fn win_rate(&self) -> f64 {
        self.snapshot().await.win_rate
    }

    /// Emits a snapshot on every interval until the collector is dropped.
    pub fn spawn_emitter(
        self: &Arc<Self>,
        interval: Duration,
        sink: Arc<dyn MetricsSink>,
    ) {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(collector) => sink.emit(&collector.snapshot().await),
                    None => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn outcome(status: SlotStatus, millis: u64) -> ExecutionOutcome {
        ExecutionOutcome {
            slot_id: "slot".to_string(),
            strategy: "direct",
            status,
            realized_profit: rust_decimal::Decimal::ZERO,
            duration: Duration::from_millis(millis),
        }
    }

    #[tokio::test]
    async fn average_updates_incrementally() {
        let collector = MetricsCollector::new();
        collector
            .record_execution(&outcome(SlotStatus::Confirmed, 100))
            .await;
        collector
            .record_execution(&outcome(SlotStatus::Failed, 200))
            .await;

        let snapshot = collector.snapshot().await;
        assert_eq!(snapshot.executed, 2);
        assert_eq!(snapshot.successful, 1);
        assert_eq!(snapshot.failed, 1);
        assert!((snapshot.avg_execution_ms - 150.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn win_rate_is_zero_with_no_executions() {
        let collector = MetricsCollector::new();
        assert_eq!(collector.win_rate().await, 0.0);
    }

    #[tokio::test]
    async fn win_rate_counts_confirmed_over_executed() {
        let collector = MetricsCollector::new();
        collector
            .record_execution(&outcome(SlotStatus::Confirmed, 10))
            .await;
        collector
            .record_execution(&outcome(SlotStatus::Confirmed, 10))
            .await;
        collector
            .record_execution(&outcome(SlotStatus::TimedOut, 10))
            .await;
        collector
            .record_execution(&outcome(SlotStatus::Failed, 10))
            .await;

        assert_eq!(collector.win_rate().await, 50.0);
    }

    proptest! {
        #[test]
        fn incremental_average_matches_arithmetic_mean(samples in prop::collection::vec(1u64..10_000, 1..50)) {
            tokio_test::block_on(async {
                let collector = MetricsCollector::new();
                for millis in &samples {
                    collector
                        .record_execution(&outcome(SlotStatus::Confirmed, *millis))
                        .await;
                }

                let expected =
                    samples.iter().map(|m| *m as f64).sum::<f64>() / samples.len() as f64;
                let snapshot = collector.snapshot().await;
                prop_assert!((snapshot.avg_execution_ms - expected).abs() < 1e-6);
                Ok(())
            })?;
        }
    }
}
