//! Dashboard-facing engine statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub running: bool,
    pub positions: usize,
    pub profits: ProfitSummary,
    pub monitoring: MonitoringSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfitSummary {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSummary {
    pub health_status: HealthStatus,
    pub win_rate: f64,
    pub execution_stats: ExecutionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStats {
    pub queue_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Halted,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Start,
    Stop,
}
