//! Candidate opportunity variants produced by the detectors

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::Token;

#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub kind: OpportunityKind,
    /// Absolute profit in quote-token base units, net of the per-trade fee
    /// estimate. Relative figures are normalized before they land here.
    pub expected_profit: Decimal,
    pub confidence: Decimal,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum OpportunityKind {
    Direct {
        token_a: Token,
        token_b: Token,
        buy_venue: String,
        sell_venue: String,
        amount_in: Decimal,
    },
    Triangular {
        path: [Token; 3],
        relative_return: Decimal,
        amount_in: Decimal,
    },
    Sandwich {
        target_tx_hash: String,
        token_in: Address,
        token_out: Address,
        front_amount: Decimal,
        victim_amount: Decimal,
        deadline: DateTime<Utc>,
    },
    FlashLoan {
        token_in: Token,
        token_out: Token,
        amount: Decimal,
        buy_venue: String,
        sell_venue: String,
    },
    MarketMaking {
        token_a: Token,
        token_b: Token,
        bid_price: Decimal,
        ask_price: Decimal,
        amount: Decimal,
    },
}

impl Opportunity {
    pub fn new(kind: OpportunityKind, expected_profit: Decimal, confidence: Decimal) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            expected_profit,
            confidence,
            discovered_at: Utc::now(),
        }
    }

    pub fn strategy_tag(&self) -> &'static str {
        self.kind.strategy_tag()
    }

    /// Identity used by the coordinator to reject a second in-flight
    /// submission targeting the same trade.
    pub fn dedup_key(&self) -> String {
        match &self.kind {
            OpportunityKind::Direct {
                token_a,
                token_b,
                buy_venue,
                sell_venue,
                ..
            } => format!(
                "direct:{}:{}:{}:{}",
                token_a.symbol, token_b.symbol, buy_venue, sell_venue
            ),
            OpportunityKind::Triangular { path, .. } => format!(
                "triangular:{}:{}:{}",
                path[0].symbol, path[1].symbol, path[2].symbol
            ),
            OpportunityKind::Sandwich { target_tx_hash, .. } => {
                format!("sandwich:{}", target_tx_hash)
            }
            OpportunityKind::FlashLoan {
                token_in, token_out, ..
            } => format!("flash_loan:{}:{}", token_in.symbol, token_out.symbol),
            OpportunityKind::MarketMaking { token_a, token_b, .. } => {
                format!("market_making:{}:{}", token_a.symbol, token_b.symbol)
            }
        }
    }
}

impl OpportunityKind {
    pub fn strategy_tag(&self) -> &'static str {
        match self {
            OpportunityKind::Direct { .. } => "direct",
            OpportunityKind::Triangular { .. } => "triangular",
            OpportunityKind::Sandwich { .. } => "sandwich",
            OpportunityKind::FlashLoan { .. } => "flash_loan",
            OpportunityKind::MarketMaking { .. } => "market_making",
        }
    }
}
