//! Opportunity detection strategies

pub mod direct;
pub mod triangular;
pub mod sandwich;
pub mod flash_loan;
pub mod market_making;
pub mod ranker;

pub use direct::*;
pub use triangular::*;
pub use sandwich::*;
pub use flash_loan::*;
pub use market_making::*;
pub use ranker::*;

use async_trait::async_trait;
use std::sync::Arc;
use crate::{
    config::Config,
    mempool::PendingTxBuffer,
    quotes::QuoteAggregator,
    types::Opportunity,
};

/// Shared read-only inputs for one detection pass.
pub struct DetectionContext {
    pub aggregator: Arc<QuoteAggregator>,
    pub mempool: Arc<PendingTxBuffer>,
    pub config: Arc<Config>,
}

/// Detectors are side-effect free besides reading shared caches. They never
/// error: a candidate that fails to decode or compute is simply dropped and
/// the scan continues.
#[async_trait]
pub trait OpportunityDetector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce_opportunities(&self, ctx: &DetectionContext) -> Vec<Opportunity>;
}

/// The full strategy registry wired with default models. New strategies are
/// added here without touching the ranker.
pub fn default_detectors() -> Vec<Arc<dyn OpportunityDetector>> {
    vec![
        Arc::new(DirectArbitrageDetector),
        Arc::new(TriangularArbitrageDetector),
        Arc::new(SandwichDetector::new(Arc::new(PriceImpactModel::default()))),
        Arc::new(FlashLoanDetector),
        Arc::new(MarketMakingDetector::new(Arc::new(NullOrderBookSource))),
    ]
}
