//! Gas price source and submission gas policy

use async_trait::async_trait;
use crate::config::{
    DEFAULT_GAS_LIMIT_ESTIMATE, GAS_LIMIT_MULTIPLIER_PCT, GAS_PRICE_MULTIPLIER_PCT,
};

/// Source of the current network gas price.
#[async_trait]
pub trait GasOracle: Send + Sync {
    async fn gas_price_wei(&self) -> anyhow::Result<u128>;

    fn gas_limit_estimate(&self) -> u64 {
        DEFAULT_GAS_LIMIT_ESTIMATE
    }
}

/// Constant-price oracle for paper runs.
pub struct FixedGasOracle {
    price_wei: u128,
}

impl FixedGasOracle {
    pub fn new(price_wei: u128) -> Self {
        Self { price_wei }
    }
}

impl Default for FixedGasOracle {
    fn default() -> Self {
        // 30 gwei
        Self::new(30_000_000_000)
    }
}

#[async_trait]
impl GasOracle for FixedGasOracle {
    async fn gas_price_wei(&self) -> anyhow::Result<u128> {
        Ok(self.price_wei)
    }
}

/// Pads oracle values so submissions do not sit underpriced or run out of
/// gas at the margin.
#[derive(Debug, Clone, Copy)]
pub struct GasPolicy {
    pub price_multiplier_pct: u64,
    pub limit_multiplier_pct: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            price_multiplier_pct: GAS_PRICE_MULTIPLIER_PCT,
            limit_multiplier_pct: GAS_LIMIT_MULTIPLIER_PCT,
        }
    }
}

impl GasPolicy {
    pub fn priced(&self, oracle_price_wei: u128) -> u128 {
        oracle_price_wei * u128::from(self.price_multiplier_pct) / 100
    }

    pub fn limited(&self, estimate: u64) -> u64 {
        estimate * self.limit_multiplier_pct / 100
    }
}
