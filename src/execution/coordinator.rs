//! Concurrency-limited execution with pacing, dedup and timeout sweeping

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use crate::config::{Config, TIMEOUT_SWEEP_INTERVAL_MS};
use crate::errors::{BotError, BotResult};
use crate::network::{GasOracle, GasPolicy};
use crate::risk::RiskGuard;
use crate::types::{ExecutionOutcome, ExecutionSlot, Opportunity, SlotStatus};
use super::{SubmissionStatus, TradeIntent, TransactionSubmitter};

pub struct ExecutionCoordinator {
    slots: RwLock<HashMap<String, ExecutionSlot>>,
    last_submission: Mutex<Option<Instant>>,
    completions: UnboundedSender<ExecutionOutcome>,
    submitter: Arc<dyn TransactionSubmitter>,
    gas_oracle: Arc<dyn GasOracle>,
    gas_policy: GasPolicy,
    risk_guard: Arc<RiskGuard>,
    max_concurrent: usize,
    min_submission_interval: Duration,
    execution_timeout: Duration,
    gas_cost_estimate: Decimal,
    sequence: AtomicU64,
}

impl ExecutionCoordinator {
    pub fn new(
        config: &Config,
        submitter: Arc<dyn TransactionSubmitter>,
        gas_oracle: Arc<dyn GasOracle>,
        risk_guard: Arc<RiskGuard>,
    ) -> (Arc<Self>, UnboundedReceiver<ExecutionOutcome>) {
        let (tx, rx) = unbounded_channel();
        let coordinator = Arc::new(Self {
            slots: RwLock::new(HashMap::new()),
            last_submission: Mutex::new(None),
            completions: tx,
            submitter,
            gas_oracle,
            gas_policy: GasPolicy::default(),
            risk_guard,
            max_concurrent: config.max_concurrent,
            min_submission_interval: config.min_submission_interval(),
            execution_timeout: config.execution_timeout(),
            gas_cost_estimate: config.gas_cost_estimate,
            sequence: AtomicU64::new(0),
        });
        Self::spawn_timeout_sweep(&coordinator);
        (coordinator, rx)
    }

    pub async fn outstanding(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Admits one opportunity into a slot and drives it in the background.
    /// Admission is all-or-nothing: risk halt, a full table and an in-flight
    /// duplicate each reject without side effects.
    pub async fn submit(self: &Arc<Self>, opportunity: Opportunity) -> BotResult<String> {
        if let Some(reason) = self.risk_guard.halt_reason().await {
            return Err(BotError::RiskHalted { reason });
        }

        let dedup_key = opportunity.dedup_key();
        let slot_id = format!(
            "{}-{}-{}",
            opportunity.strategy_tag(),
            Utc::now().timestamp_millis(),
            self.sequence.fetch_add(1, Ordering::Relaxed)
        );

        {
            // Capacity, dedup and insertion under one write lock so the slot
            // count never overshoots the limit.
            let mut slots = self.slots.write().await;
            if slots.len() >= self.max_concurrent {
                return Err(BotError::CapacityExhausted {
                    active: slots.len(),
                    max: self.max_concurrent,
                });
            }
            if slots.values().any(|slot| slot.dedup_key == dedup_key) {
                return Err(BotError::DuplicateSubmission { dedup_key });
            }
            slots.insert(
                slot_id.clone(),
                ExecutionSlot::new(slot_id.clone(), opportunity.clone()),
            );
        }

        // Pacing suspends only this path; detection and in-flight slots keep
        // running.
        {
            let mut last = self.last_submission.lock().await;
            if let Some(previous) = *last {
                let since = previous.elapsed();
                if since < self.min_submission_interval {
                    tokio::time::sleep(self.min_submission_interval - since).await;
                }
            }
            *last = Some(Instant::now());
        }

        let coordinator = Arc::clone(self);
        let id = slot_id.clone();
        tokio::spawn(async move {
            coordinator.drive(id, opportunity).await;
        });

        Ok(slot_id)
    }

    async fn drive(&self, slot_id: String, opportunity: Opportunity) {
        if let Some(slot) = self.slots.write().await.get_mut(&slot_id) {
            slot.status = SlotStatus::Submitted;
        }

        let intent = match self.build_intent(&opportunity).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Gas pricing failed for slot {}: {}", slot_id, e);
                self.finalize(&slot_id, SlotStatus::Failed, -self.gas_cost_estimate)
                    .await;
                return;
            }
        };

        match self.submitter.submit(&intent).await {
            Ok(receipt) => match receipt.status {
                SubmissionStatus::Confirmed { realized_profit } => {
                    let realized = realized_profit.unwrap_or(opportunity.expected_profit);
                    info!(
                        "✅ Slot {} confirmed as {} with profit {}",
                        slot_id, receipt.tx_hash, realized
                    );
                    self.finalize(&slot_id, SlotStatus::Confirmed, realized).await;
                }
                SubmissionStatus::Reverted => {
                    warn!("❌ Slot {} reverted as {}", slot_id, receipt.tx_hash);
                    self.finalize(&slot_id, SlotStatus::Failed, -self.gas_cost_estimate)
                        .await;
                }
            },
            Err(e) => {
                warn!("❌ Slot {} submission failed: {}", slot_id, e);
                self.finalize(&slot_id, SlotStatus::Failed, -self.gas_cost_estimate)
                    .await;
            }
        }
    }

    async fn build_intent(&self, opportunity: &Opportunity) -> anyhow::Result<TradeIntent> {
        let oracle_price = self.gas_oracle.gas_price_wei().await?;
        Ok(TradeIntent {
            opportunity_id: opportunity.id.clone(),
            strategy: opportunity.strategy_tag(),
            expected_profit: opportunity.expected_profit,
            gas_price_wei: self.gas_policy.priced(oracle_price),
            gas_limit: self.gas_policy.limited(self.gas_oracle.gas_limit_estimate()),
        })
    }

    /// Removes the slot and emits its outcome exactly once. A slot already
    /// taken by the sweep (or vice versa) is a no-op here.
    async fn finalize(&self, slot_id: &str, status: SlotStatus, realized_profit: Decimal) {
        let slot = match self.slots.write().await.remove(slot_id) {
            Some(slot) => slot,
            None => return,
        };

        let outcome = ExecutionOutcome {
            slot_id: slot.id,
            strategy: slot.opportunity.strategy_tag(),
            status,
            realized_profit,
            duration: slot.started_at.elapsed(),
        };
        // Receiver dropped means the engine is shutting down.
        let _ = self.completions.send(outcome);
    }

    fn spawn_timeout_sweep(coordinator: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(coordinator);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_millis(TIMEOUT_SWEEP_INTERVAL_MS));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let coordinator = match weak.upgrade() {
                    Some(coordinator) => coordinator,
                    None => break,
                };

                let expired: Vec<String> = coordinator
                    .slots
                    .read()
                    .await
                    .values()
                    .filter(|slot| slot.started_at.elapsed() >= coordinator.execution_timeout)
                    .map(|slot| slot.id.clone())
                    .collect();

                for slot_id in expired {
                    debug!("⏱️ Slot {} timed out", slot_id);
                    coordinator
                        .finalize(&slot_id, SlotStatus::TimedOut, -coordinator.gas_cost_estimate)
                        .await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use tokio::sync::Notify;
    use crate::execution::SubmissionReceipt;
    use crate::network::FixedGasOracle;
    use crate::types::{OpportunityKind, Token};

    struct StalledSubmitter {
        release: Notify,
    }

    #[async_trait]
    impl TransactionSubmitter for StalledSubmitter {
        async fn submit(&self, _intent: &TradeIntent) -> anyhow::Result<SubmissionReceipt> {
            self.release.notified().await;
            Ok(SubmissionReceipt {
                tx_hash: "0xstalled".to_string(),
                status: SubmissionStatus::Reverted,
            })
        }
    }

    struct InstantSubmitter;

    #[async_trait]
    impl TransactionSubmitter for InstantSubmitter {
        async fn submit(&self, intent: &TradeIntent) -> anyhow::Result<SubmissionReceipt> {
            Ok(SubmissionReceipt {
                tx_hash: "0xinstant".to_string(),
                status: SubmissionStatus::Confirmed {
                    realized_profit: Some(intent.expected_profit),
                },
            })
        }
    }

    fn opportunity(sell_venue: &str) -> Opportunity {
        Opportunity::new(
            OpportunityKind::Direct {
                token_a: Token::new("X", Address::repeat_byte(0x11)),
                token_b: Token::new("Y", Address::repeat_byte(0x22)),
                buy_venue: "buy".to_string(),
                sell_venue: sell_venue.to_string(),
                amount_in: dec!(1),
            },
            dec!(5),
            dec!(0.9),
        )
    }

    async fn coordinator_with(
        config: Config,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> (Arc<ExecutionCoordinator>, UnboundedReceiver<ExecutionOutcome>) {
        let risk_guard = Arc::new(RiskGuard::new(&config));
        risk_guard.set_initial_capital(dec!(1000)).await;
        ExecutionCoordinator::new(
            &config,
            submitter,
            Arc::new(FixedGasOracle::default()),
            risk_guard,
        )
    }

    fn fast_config() -> Config {
        Config {
            min_submission_interval_ms: 0,
            ..Config::load()
        }
    }

    #[tokio::test]
    async fn sixth_submission_is_rejected_at_capacity() {
        let (coordinator, _rx) = coordinator_with(
            fast_config(),
            Arc::new(StalledSubmitter {
                release: Notify::new(),
            }),
        )
        .await;

        for i in 0..5 {
            coordinator
                .submit(opportunity(&format!("venue{}", i)))
                .await
                .unwrap();
        }
        assert_eq!(coordinator.outstanding().await, 5);

        let rejected = coordinator.submit(opportunity("venue5")).await;
        match rejected {
            Err(BotError::CapacityExhausted { active, max }) => {
                assert_eq!(active, 5);
                assert_eq!(max, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_in_flight_submission_is_rejected() {
        let (coordinator, _rx) = coordinator_with(
            fast_config(),
            Arc::new(StalledSubmitter {
                release: Notify::new(),
            }),
        )
        .await;

        coordinator.submit(opportunity("venue")).await.unwrap();
        let rejected = coordinator.submit(opportunity("venue")).await;
        assert!(matches!(
            rejected,
            Err(BotError::DuplicateSubmission { .. })
        ));
    }

    #[tokio::test]
    async fn submissions_are_spaced_by_the_minimum_interval() {
        let config = Config {
            min_submission_interval_ms: 50,
            ..Config::load()
        };
        let (coordinator, _rx) = coordinator_with(config, Arc::new(InstantSubmitter)).await;

        let started = Instant::now();
        coordinator.submit(opportunity("venue_a")).await.unwrap();
        coordinator.submit(opportunity("venue_b")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn confirmed_submission_emits_its_outcome_and_frees_the_slot() {
        let (coordinator, mut rx) =
            coordinator_with(fast_config(), Arc::new(InstantSubmitter)).await;

        coordinator.submit(opportunity("venue")).await.unwrap();
        let outcome = rx.recv().await.expect("one outcome");
        assert_eq!(outcome.status, SlotStatus::Confirmed);
        assert_eq!(outcome.realized_profit, dec!(5));
        assert_eq!(outcome.strategy, "direct");
        assert_eq!(coordinator.outstanding().await, 0);
    }

    #[tokio::test]
    async fn halted_guard_rejects_before_touching_slots() {
        let config = fast_config();
        let risk_guard = Arc::new(RiskGuard::new(&config));
        risk_guard.set_initial_capital(dec!(1000)).await;
        for _ in 0..3 {
            risk_guard.update_profit_metrics(dec!(-1)).await;
        }

        let (coordinator, _rx) = ExecutionCoordinator::new(
            &config,
            Arc::new(InstantSubmitter),
            Arc::new(FixedGasOracle::default()),
            risk_guard,
        );

        let rejected = coordinator.submit(opportunity("venue")).await;
        assert!(matches!(rejected, Err(BotError::RiskHalted { .. })));
        assert_eq!(coordinator.outstanding().await, 0);
    }

    #[tokio::test]
    async fn stalled_slot_is_swept_as_a_timeout() {
        let config = Config {
            min_submission_interval_ms: 0,
            execution_timeout_secs: 0,
            ..Config::load()
        };
        let (coordinator, mut rx) = coordinator_with(
            config,
            Arc::new(StalledSubmitter {
                release: Notify::new(),
            }),
        )
        .await;

        coordinator.submit(opportunity("venue")).await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("sweep within one interval")
            .expect("one outcome");

        assert_eq!(outcome.status, SlotStatus::TimedOut);
        assert_eq!(outcome.realized_profit, dec!(-0.05));
        assert_eq!(coordinator.outstanding().await, 0);
    }
}
