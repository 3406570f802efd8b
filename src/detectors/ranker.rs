//! Candidate ranking across strategies

use rust_decimal::Decimal;
use crate::types::Opportunity;

/// Drops non-positive candidates and orders the rest best-first. Ties on
/// profit break on discovery time (earlier wins), then on strategy tag so the
/// order is total.
pub fn rank_opportunities(mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    opportunities.retain(|opp| opp.expected_profit > Decimal::ZERO);
    opportunities.sort_by(|a, b| {
        b.expected_profit
            .cmp(&a.expected_profit)
            .then(a.discovered_at.cmp(&b.discovered_at))
            .then(a.strategy_tag().cmp(b.strategy_tag()))
    });
    opportunities
}
