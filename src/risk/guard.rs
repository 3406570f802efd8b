//! Drawdown and loss-streak circuit breaker

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;
use crate::config::Config;
use crate::types::ProfitSummary;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskState {
    pub daily_profit: Decimal,
    pub weekly_profit: Decimal,
    pub total_profit: Decimal,
    pub consecutive_losses: u32,
}

/// Halts new submissions once the daily drawdown limit or the consecutive
/// loss limit is hit. In-flight slots are left to finish on their own.
pub struct RiskGuard {
    state: RwLock<RiskState>,
    initial_capital: RwLock<Decimal>,
    max_daily_loss_rate: Decimal,
    max_consecutive_losses: u32,
}

impl RiskGuard {
    pub fn new(config: &Config) -> Self {
        Self {
            state: RwLock::new(RiskState::default()),
            initial_capital: RwLock::new(Decimal::ZERO),
            max_daily_loss_rate: config.max_daily_loss_rate,
            max_consecutive_losses: config.max_consecutive_losses,
        }
    }

    pub async fn set_initial_capital(&self, capital: Decimal) {
        *self.initial_capital.write().await = capital;
    }

    /// Pure limit check: true while trading is allowed. The drawdown
    /// boundary is inclusive, so exactly hitting it already disallows.
    pub fn check(&self, daily_profit: Decimal, capital: Decimal, consecutive_losses: u32) -> bool {
        if consecutive_losses >= self.max_consecutive_losses {
            return false;
        }
        !(capital > Decimal::ZERO && daily_profit <= -(self.max_daily_loss_rate * capital))
    }

    /// Applies the limit check to the live state.
    pub async fn allows(&self) -> bool {
        self.halt_reason().await.is_none()
    }

    /// None while trading is allowed, otherwise the reason to surface.
    pub async fn halt_reason(&self) -> Option<String> {
        let capital = *self.initial_capital.read().await;
        if capital <= Decimal::ZERO {
            return Some("no capital configured".to_string());
        }

        let state = self.state.read().await;
        if state.consecutive_losses >= self.max_consecutive_losses {
            return Some(format!(
                "{} consecutive losses (limit {})",
                state.consecutive_losses, self.max_consecutive_losses
            ));
        }
        if !self.check(state.daily_profit, capital, state.consecutive_losses) {
            return Some(format!(
                "daily drawdown {} breached {}% of capital {}",
                state.daily_profit,
                self.max_daily_loss_rate * Decimal::ONE_HUNDRED,
                capital
            ));
        }
        None
    }

    /// Applies one realized result. Any negative result extends the loss
    /// streak; anything else resets it.
    pub async fn update_profit_metrics(&self, realized_profit: Decimal) {
        let mut state = self.state.write().await;
        state.daily_profit += realized_profit;
        state.weekly_profit += realized_profit;
        state.total_profit += realized_profit;

        if realized_profit < Decimal::ZERO {
            state.consecutive_losses += 1;
            if state.consecutive_losses >= self.max_consecutive_losses {
                warn!(
                    "🛑 Loss streak hit {} - halting new submissions",
                    state.consecutive_losses
                );
            }
        } else {
            state.consecutive_losses = 0;
        }
    }

    pub async fn profits(&self) -> ProfitSummary {
        let state = self.state.read().await;
        ProfitSummary {
            daily: state.daily_profit,
            weekly: state.weekly_profit,
            total: state.total_profit,
        }
    }

    pub async fn snapshot(&self) -> RiskState {
        self.state.read().await.clone()
    }

    pub async fn reset(&self) {
        *self.state.write().await = RiskState::default();
    }

    pub async fn reset_daily(&self) {
        self.state.write().await.daily_profit = Decimal::ZERO;
    }

    pub async fn reset_weekly(&self) {
        self.state.write().await.weekly_profit = Decimal::ZERO;
    }
}
