use std::fs;
use std::path::{Path, PathBuf};

use crate::core::Ledger;

use super::{DocumentStore, StorageError};

const TMP_SUFFIX: &str = "tmp";

/// Store that keeps the ledger as a pretty-printed JSON document in a
/// single file.
///
/// The document is an object with a `deposits` array; each entry carries an
/// ISO-8601 timestamp, the amount, and the per-target allocation map.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        let ext = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
            None => TMP_SUFFIX.to_string(),
        };
        tmp.set_extension(ext);
        tmp
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Ledger, StorageError> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let data =
            fs::read_to_string(&self.path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(ledger)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }
        // Write the full document to a scratch file first so a failed
        // write never truncates the existing ledger.
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}
