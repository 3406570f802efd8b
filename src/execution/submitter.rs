//! Transaction submission seam and its paper-trading implementation

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use uuid::Uuid;

/// Everything the submitter needs to price and send one trade.
#[derive(Debug, Clone)]
pub struct TradeIntent {
    pub opportunity_id: String,
    pub strategy: &'static str,
    pub expected_profit: Decimal,
    pub gas_price_wei: u128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub tx_hash: String,
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// None means the submitter could not measure the fill; the expected
    /// profit stands in.
    Confirmed { realized_profit: Option<Decimal> },
    Reverted,
}

#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, intent: &TradeIntent) -> anyhow::Result<SubmissionReceipt>;
}

/// Paper submitter: no chain interaction, just latency, a success ratio and
/// slippage against the expected profit.
pub struct PaperSubmitter {
    pub success_rate: f64,
    pub latency_ms: u64,
    pub slippage_bps: u32,
}

impl Default for PaperSubmitter {
    fn default() -> Self {
        Self {
            success_rate: 0.85,
            latency_ms: 120,
            slippage_bps: 50,
        }
    }
}

#[async_trait]
impl TransactionSubmitter for PaperSubmitter {
    async fn submit(&self, intent: &TradeIntent) -> anyhow::Result<SubmissionReceipt> {
        tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;

        let tx_hash = format!("0xpaper-{}", Uuid::new_v4());
        if rand::random::<f64>() < self.success_rate {
            let slippage = Decimal::from(self.slippage_bps) / dec!(10000);
            let realized = intent.expected_profit * (Decimal::ONE - slippage);
            Ok(SubmissionReceipt {
                tx_hash,
                status: SubmissionStatus::Confirmed {
                    realized_profit: Some(realized),
                },
            })
        } else {
            Ok(SubmissionReceipt {
                tx_hash,
                status: SubmissionStatus::Reverted,
            })
        }
    }
}
