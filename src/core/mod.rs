//! Core logic for the append-only deposit ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod plan;
mod report;
mod stats;
mod tracker;

pub use plan::{AllocationPlan, PlanError, WEIGHT_EPSILON};
pub use report::{Totals, totals};
pub use stats::{Statistics, Window, WindowStats, statistics};
pub use tracker::{DepositTracker, TrackerError};

/// Errors that can occur when creating a [`Deposit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositError {
    /// The amount provided is not positive.
    NonPositiveAmount,
}

impl std::fmt::Display for DepositError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositError::NonPositiveAmount => write!(f, "amount must be positive"),
        }
    }
}

impl std::error::Error for DepositError {}

/// A single recorded deposit together with its per-target split.
///
/// Deposits are immutable once created; the split is computed from the
/// allocation plan that was active at recording time and is never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    /// Time at which the deposit was recorded.
    pub timestamp: DateTime<Utc>,
    /// Total amount deposited.
    pub amount: f64,
    /// Amount routed to each target, keyed by target identifier.
    pub allocations: BTreeMap<String, f64>,
}

impl Deposit {
    /// Creates a deposit by splitting `amount` according to `plan`.
    pub fn new(
        amount: f64,
        plan: &AllocationPlan,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, DepositError> {
        let allocations = plan.allocate(amount)?;
        Ok(Self {
            timestamp,
            amount,
            allocations,
        })
    }
}

/// Ordered collection of deposits, insertion order = chronological order.
///
/// The ledger is append-only apart from removing the most recently inserted
/// deposit and clearing the whole history; it never reorders.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    deposits: Vec<Deposit>,
}

impl Ledger {
    /// Appends a deposit to the ledger.
    pub fn append(&mut self, deposit: Deposit) {
        self.deposits.push(deposit);
    }

    /// Returns an iterator over all deposits in insertion order.
    pub fn deposits(&self) -> impl Iterator<Item = &Deposit> {
        self.deposits.iter()
    }

    /// Returns the full history as a slice in insertion order.
    pub fn as_slice(&self) -> &[Deposit] {
        &self.deposits
    }

    /// The most recently inserted deposit, if any.
    pub fn last(&self) -> Option<&Deposit> {
        self.deposits.last()
    }

    /// Removes and returns the most recently inserted deposit.
    pub fn pop_last(&mut self) -> Option<Deposit> {
        self.deposits.pop()
    }

    /// Removes every deposit.
    pub fn clear(&mut self) {
        self.deposits.clear();
    }

    /// Returns up to `limit` deposits, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &Deposit> {
        self.deposits.iter().rev().take(limit)
    }

    /// Number of recorded deposits.
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    /// Whether the ledger holds no deposits.
    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> AllocationPlan {
        AllocationPlan::new(BTreeMap::from([
            ("stocks".to_string(), 0.6),
            ("bonds".to_string(), 0.4),
        ]))
        .unwrap()
    }

    #[test]
    fn append_and_iterate() {
        let mut ledger = Ledger::default();
        ledger.append(Deposit::new(1.0, &plan(), Utc::now()).unwrap());
        ledger.append(Deposit::new(2.0, &plan(), Utc::now()).unwrap());

        let amounts: Vec<_> = ledger.deposits().map(|d| d.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0]);
    }

    #[test]
    fn pop_last_removes_newest_first() {
        let mut ledger = Ledger::default();
        ledger.append(Deposit::new(1.0, &plan(), Utc::now()).unwrap());
        ledger.append(Deposit::new(2.0, &plan(), Utc::now()).unwrap());

        assert_eq!(ledger.pop_last().map(|d| d.amount), Some(2.0));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.last().map(|d| d.amount), Some(1.0));
    }

    #[test]
    fn recent_yields_newest_first() {
        let mut ledger = Ledger::default();
        for amount in [1.0, 2.0, 3.0] {
            ledger.append(Deposit::new(amount, &plan(), Utc::now()).unwrap());
        }

        let recent: Vec<_> = ledger.recent(2).map(|d| d.amount).collect();
        assert_eq!(recent, vec![3.0, 2.0]);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert_eq!(
            Deposit::new(0.0, &plan(), Utc::now()),
            Err(DepositError::NonPositiveAmount)
        );
        assert_eq!(
            Deposit::new(-10.0, &plan(), Utc::now()),
            Err(DepositError::NonPositiveAmount)
        );
    }

    #[test]
    fn persisted_layout_is_stable() {
        let mut ledger = Ledger::default();
        ledger.append(Deposit::new(100.0, &plan(), Utc::now()).unwrap());

        let value: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&ledger).unwrap(),
        )
        .unwrap();
        let entry = &value["deposits"][0];
        assert!(entry["timestamp"].is_string());
        assert_eq!(entry["amount"], 100.0);
        assert_eq!(entry["allocations"]["stocks"], 60.0);
        assert_eq!(entry["allocations"]["bonds"], 40.0);
    }
}
