//! Durable storage adapters for the deposit ledger.

pub mod file;

pub use file::JsonFileStore;

use crate::core::Ledger;

/// Errors that can occur when loading or saving the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The underlying medium could not be read or written.
    Io(String),
    /// Persisted data exists but could not be decoded.
    Corrupt(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "io error: {e}"),
            StorageError::Corrupt(e) => write!(f, "corrupt ledger data: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Abstraction over the durable document store holding the ledger.
///
/// The store holds one document: the full ledger. Writes replace the whole
/// document; a failed write must leave the previously persisted state
/// intact.
pub trait DocumentStore {
    /// Loads the persisted ledger, or an empty one if nothing was saved
    /// yet.
    fn load(&self) -> Result<Ledger, StorageError>;
    /// Durably replaces the persisted ledger.
    fn save(&mut self, ledger: &Ledger) -> Result<(), StorageError>;
}

/// In-memory store, used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Ledger,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `ledger`.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self { saved: ledger }
    }

    /// The ledger most recently saved.
    pub fn saved(&self) -> &Ledger {
        &self.saved
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Ledger, StorageError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StorageError> {
        self.saved = ledger.clone();
        Ok(())
    }
}
