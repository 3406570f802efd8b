//! Execution slot state machine types

use rust_decimal::Decimal;
use serde::Serialize;
use std::time::{Duration, Instant};
use super::Opportunity;

#[derive(Debug, Clone)]
pub struct ExecutionSlot {
    pub id: String,
    pub opportunity: Opportunity,
    pub dedup_key: String,
    pub started_at: Instant,
    pub status: SlotStatus,
}

impl ExecutionSlot {
    pub fn new(id: String, opportunity: Opportunity) -> Self {
        let dedup_key = opportunity.dedup_key();
        Self {
            id,
            opportunity,
            dedup_key,
            started_at: Instant::now(),
            status: SlotStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    Pending,
    Submitted,
    Confirmed,
    Failed,
    TimedOut,
}

impl SlotStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SlotStatus::Confirmed | SlotStatus::Failed | SlotStatus::TimedOut
        )
    }
}

/// Emitted on the completion channel once a slot reaches a terminal state.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub slot_id: String,
    pub strategy: &'static str,
    pub status: SlotStatus,
    pub realized_profit: Decimal,
    pub duration: Duration,
}
