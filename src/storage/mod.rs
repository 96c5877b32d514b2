//! Key-value persistence backends.

pub mod file;

use std::collections::HashMap;

pub use file::FileStore;

/// Key holding the JSON array of transactions.
pub const TRANSACTIONS_KEY: &str = "finance-tracker-data";
/// Key receiving an unreadable transaction list before it is replaced.
pub const TRANSACTIONS_BACKUP_KEY: &str = "finance-tracker-data-backup";
/// Key holding the JSON settings object.
pub const SETTINGS_KEY: &str = "finance-tracker-settings";

/// Represents errors that can occur when reading or writing a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or the underlying I/O failed.
    Unavailable(String),
    /// The backend refused the write because it is full.
    QuotaExceeded,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StorageError::QuotaExceeded => write!(f, "storage quota exceeded"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Abstraction over string key-value storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores `value` under `key`, replacing what was there.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Backend that keeps everything in a map. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    fn write_through<S: KeyValueStore>(mut store: S) {
        store.set("k", "v").unwrap();
    }

    #[test]
    fn mutable_reference_is_a_store() {
        let mut inner = MemoryStore::new();
        write_through(&mut inner);
        assert_eq!(inner.get("k").unwrap().as_deref(), Some("v"));
    }
}
