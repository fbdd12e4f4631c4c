use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Deposit;

/// Lifetime sums across the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Total amount ever routed to each target.
    pub per_target: BTreeMap<String, f64>,
    /// Total amount ever deposited; equals the sum of the per-target
    /// values up to floating rounding.
    pub grand_total: f64,
    /// Number of deposits recorded.
    pub deposit_count: usize,
}

/// Sums every deposit and its per-target allocations.
///
/// Pure function of the ledger snapshot; recomputed fresh on each call.
pub fn totals(deposits: &[Deposit]) -> Totals {
    let mut totals = Totals::default();
    for deposit in deposits {
        totals.grand_total += deposit.amount;
        totals.deposit_count += 1;
        for (target, amount) in &deposit.allocations {
            *totals.per_target.entry(target.clone()).or_insert(0.0) += amount;
        }
    }
    totals
}
