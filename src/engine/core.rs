//! Scan loop, lifecycle and dashboard statistics

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use crate::config::Config;
use crate::detectors::{default_detectors, rank_opportunities, DetectionContext, OpportunityDetector};
use crate::errors::{BotError, BotResult};
use crate::execution::{ExecutionCoordinator, TransactionSubmitter};
use crate::mempool::PendingTxBuffer;
use crate::metrics::{LogSink, MetricsCollector};
use crate::network::GasOracle;
use crate::quotes::{QuoteAggregator, Venue};
use crate::risk::RiskGuard;
use crate::types::{
    EngineStats, ExecutionOutcome, ExecutionStats, HealthStatus, MonitoringSummary, SlotStatus,
    ToggleAction,
};

pub struct TradingEngine {
    config: Arc<Config>,
    aggregator: Arc<QuoteAggregator>,
    detectors: Vec<Arc<dyn OpportunityDetector>>,
    coordinator: Arc<ExecutionCoordinator>,
    risk_guard: Arc<RiskGuard>,
    metrics: Arc<MetricsCollector>,
    mempool: Arc<PendingTxBuffer>,
    running: AtomicBool,
    scan_in_flight: AtomicBool,
    background_started: AtomicBool,
    stop: Notify,
    completions: Mutex<Option<UnboundedReceiver<ExecutionOutcome>>>,
}

impl TradingEngine {
    pub fn new(
        config: Config,
        venues: Vec<Arc<dyn Venue>>,
        submitter: Arc<dyn TransactionSubmitter>,
        gas_oracle: Arc<dyn GasOracle>,
    ) -> Arc<Self> {
        let config = Arc::new(config);
        let aggregator = Arc::new(QuoteAggregator::new(venues, config.quote_cache_ttl()));
        let risk_guard = Arc::new(RiskGuard::new(&config));
        let (coordinator, completions) = ExecutionCoordinator::new(
            &config,
            submitter,
            gas_oracle,
            Arc::clone(&risk_guard),
        );

        Arc::new(Self {
            config,
            aggregator,
            detectors: default_detectors(),
            coordinator,
            risk_guard,
            metrics: Arc::new(MetricsCollector::new()),
            mempool: Arc::new(PendingTxBuffer::new()),
            running: AtomicBool::new(false),
            scan_in_flight: AtomicBool::new(false),
            background_started: AtomicBool::new(false),
            stop: Notify::new(),
            completions: Mutex::new(Some(completions)),
        })
    }

    /// Feed handle for the pending-transaction subscription.
    pub fn mempool(&self) -> Arc<PendingTxBuffer> {
        Arc::clone(&self.mempool)
    }

    /// Validates capital, arms the risk guard and launches the scan loop.
    /// Starting an already running engine just reports current stats.
    pub async fn start(self: &Arc<Self>, capital: Decimal) -> BotResult<EngineStats> {
        if capital < self.config.min_capital {
            return Err(BotError::InsufficientCapital {
                provided: capital,
                minimum: self.config.min_capital,
            });
        }

        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Engine already running, start ignored");
            return Ok(self.get_stats().await);
        }

        self.risk_guard.set_initial_capital(capital).await;
        if !self.background_started.swap(true, Ordering::SeqCst) {
            self.spawn_completion_consumer().await;
            self.metrics.spawn_emitter(
                Duration::from_secs(self.config.metrics_emit_interval_secs),
                Arc::new(LogSink),
            );
        }

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_scan_loop().await;
        });

        info!("🚀 Engine started with capital {}", capital);
        Ok(self.get_stats().await)
    }

    pub async fn stop(self: &Arc<Self>) -> EngineStats {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_waiters();
        info!("🛑 Engine stopped");
        self.get_stats().await
    }

    pub async fn toggle(self: &Arc<Self>, action: ToggleAction, capital: Decimal) -> BotResult<EngineStats> {
        match action {
            ToggleAction::Start => self.start(capital).await,
            ToggleAction::Stop => Ok(self.stop().await),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn get_stats(&self) -> EngineStats {
        let running = self.is_running();
        let health_status = if !running {
            HealthStatus::Stopped
        } else if self.risk_guard.halt_reason().await.is_some() {
            HealthStatus::Halted
        } else {
            HealthStatus::Healthy
        };
        let outstanding = self.coordinator.outstanding().await;

        EngineStats {
            running,
            positions: outstanding,
            profits: self.risk_guard.profits().await,
            monitoring: MonitoringSummary {
                health_status,
                win_rate: self.metrics.win_rate().await,
                execution_stats: ExecutionStats {
                    queue_length: outstanding,
                },
            },
        }
    }

    /// Drains the outcome channel for the life of the process, feeding the
    /// counters and the risk guard.
    async fn spawn_completion_consumer(self: &Arc<Self>) {
        let mut receiver = match self.completions.lock().await.take() {
            Some(receiver) => receiver,
            None => return,
        };

        let metrics = Arc::clone(&self.metrics);
        let risk_guard = Arc::clone(&self.risk_guard);
        let count_timeouts = self.config.count_timeouts_as_losses;
        tokio::spawn(async move {
            while let Some(outcome) = receiver.recv().await {
                metrics.record_execution(&outcome).await;
                if outcome.status == SlotStatus::TimedOut && !count_timeouts {
                    continue;
                }
                risk_guard.update_profit_metrics(outcome.realized_profit).await;
            }
        });
    }

    async fn run_scan_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.scan_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.is_running() {
                        break;
                    }
                    let engine = Arc::clone(&self);
                    tokio::spawn(async move {
                        engine.scan_tick().await;
                    });
                }
                _ = self.stop.notified() => {
                    if !self.is_running() {
                        break;
                    }
                }
            }
        }
        debug!("Scan loop exited");
    }

    /// One detection pass. A pass still in flight makes this tick a no-op so
    /// slow venues cannot pile passes on top of each other.
    async fn scan_tick(self: Arc<Self>) {
        if self.scan_in_flight.swap(true, Ordering::SeqCst) {
            return;
        }

        let ctx = Arc::new(DetectionContext {
            aggregator: Arc::clone(&self.aggregator),
            mempool: Arc::clone(&self.mempool),
            config: Arc::clone(&self.config),
        });

        let mut set = JoinSet::new();
        for detector in &self.detectors {
            let detector = Arc::clone(detector);
            let ctx = Arc::clone(&ctx);
            set.spawn(async move { detector.produce_opportunities(&ctx).await });
        }

        let mut candidates = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(mut found) = joined {
                candidates.append(&mut found);
            }
        }
        self.aggregator.clear_expired().await;

        self.metrics.record_scanned(candidates.len() as u64).await;
        let ranked = rank_opportunities(candidates);
        self.metrics.record_valid(ranked.len() as u64).await;

        if let Some(best) = ranked.into_iter().next() {
            // Spacing sleeps on the submission path must not stall the next
            // detection pass.
            let engine = Arc::clone(&self);
            tokio::spawn(async move {
                match engine.coordinator.submit(best).await {
                    Ok(slot_id) => debug!("Submitted slot {}", slot_id),
                    Err(BotError::CapacityExhausted { active, max }) => {
                        debug!("Execution at capacity ({}/{})", active, max);
                    }
                    Err(BotError::DuplicateSubmission { dedup_key }) => {
                        debug!("Already executing {}", dedup_key);
                    }
                    Err(BotError::RiskHalted { reason }) => {
                        warn!("🛑 Submission blocked by risk guard: {}", reason);
                    }
                    Err(e) => warn!("Submission failed: {}", e),
                }
            });
        }

        self.scan_in_flight.store(false, Ordering::SeqCst);
    }
}
