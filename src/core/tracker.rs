use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::storage::{DocumentStore, StorageError};

use super::{
    AllocationPlan, Deposit, DepositError, Ledger, Statistics, Totals, statistics, totals,
};

/// Errors surfaced by [`DepositTracker`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The amount supplied was not positive.
    InvalidAmount,
    /// The operation requires at least one recorded deposit.
    EmptyLedger,
    /// The durable write failed; in-memory state was rolled back and the
    /// operation did not happen.
    Storage(StorageError),
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::InvalidAmount => write!(f, "deposit amount must be positive"),
            TrackerError::EmptyLedger => write!(f, "no deposits recorded"),
            TrackerError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for TrackerError {
    fn from(e: StorageError) -> Self {
        TrackerError::Storage(e)
    }
}

impl From<DepositError> for TrackerError {
    fn from(e: DepositError) -> Self {
        match e {
            DepositError::NonPositiveAmount => TrackerError::InvalidAmount,
        }
    }
}

/// Stateful front door over the ledger.
///
/// Owns the allocation plan, the in-memory history and the durable store.
/// Every mutation persists the resulting state before returning success;
/// when the write fails the in-memory ledger is rolled back so no partial
/// state is ever observable.
pub struct DepositTracker<S: DocumentStore> {
    plan: AllocationPlan,
    ledger: Ledger,
    store: S,
}

impl<S: DocumentStore> DepositTracker<S> {
    /// Opens a tracker over previously persisted state. A store with no
    /// saved document yields an empty ledger.
    pub fn open(store: S, plan: AllocationPlan) -> Result<Self, TrackerError> {
        let ledger = store.load()?;
        debug!(deposits = ledger.len(), "Loaded ledger");
        Ok(Self {
            plan,
            ledger,
            store,
        })
    }

    /// Records a deposit, splitting it according to the active plan, and
    /// returns the created record.
    pub fn record(&mut self, amount: f64) -> Result<Deposit, TrackerError> {
        let deposit = Deposit::new(amount, &self.plan, Utc::now())?;
        self.ledger.append(deposit.clone());
        if let Err(e) = self.store.save(&self.ledger) {
            self.ledger.pop_last();
            return Err(TrackerError::Storage(e));
        }
        info!(amount, deposits = self.ledger.len(), "Recorded deposit");
        Ok(deposit)
    }

    /// Returns the full history as owned copies in insertion order.
    pub fn history(&self) -> Vec<Deposit> {
        self.ledger.deposits().cloned().collect()
    }

    /// Up to `limit` most recent deposits, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Deposit> {
        self.ledger.recent(limit).cloned().collect()
    }

    /// The most recently recorded deposit, for the confirm-before-delete
    /// flow.
    pub fn last(&self) -> Option<&Deposit> {
        self.ledger.last()
    }

    /// Removes and returns the most recent deposit. Exactly one record is
    /// removed per successful call.
    pub fn pop_last(&mut self) -> Result<Deposit, TrackerError> {
        let deposit = self.ledger.pop_last().ok_or(TrackerError::EmptyLedger)?;
        if let Err(e) = self.store.save(&self.ledger) {
            self.ledger.append(deposit);
            return Err(TrackerError::Storage(e));
        }
        info!(deposits = self.ledger.len(), "Deleted last deposit");
        Ok(deposit)
    }

    /// Removes every deposit. Clearing an already-empty ledger is a no-op,
    /// not an error.
    pub fn clear(&mut self) -> Result<(), TrackerError> {
        let previous = std::mem::take(&mut self.ledger);
        if let Err(e) = self.store.save(&self.ledger) {
            self.ledger = previous;
            return Err(TrackerError::Storage(e));
        }
        info!("Cleared ledger");
        Ok(())
    }

    /// Deposit statistics for every lookback window as of `now`.
    pub fn statistics(&self, now: DateTime<Utc>) -> Statistics {
        statistics(self.ledger.as_slice(), now)
    }

    /// Lifetime totals per target and overall.
    pub fn totals(&self) -> Totals {
        totals(self.ledger.as_slice())
    }

    /// The allocation plan deposits are split with.
    pub fn plan(&self) -> &AllocationPlan {
        &self.plan
    }
}
