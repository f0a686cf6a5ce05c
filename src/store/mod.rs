pub mod backend;
pub mod keys;
pub mod migrate;
pub mod operations;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use backend::{KvBackend, MemoryBackend, SledBackend};

/// Persistent user data: progress, preferences, engagement, content
/// snapshots and notes. Each collection lives under a single key of the
/// backend and is rewritten whole on every update.
#[derive(Debug)]
pub struct Store {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
    // Serializes load-mutate-save cycles within this process. Writers in
    // other processes sharing the same backend still race (last write wins).
    update_lock: Mutex<()>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded: key={key}, size={size}, limit={limit}")]
    QuotaExceeded { key: String, size: usize, limit: usize },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let backend = SledBackend::open(sled_path)?;
        Ok(Self::with_backend(Arc::new(backend), Arc::new(SystemClock)))
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), Arc::new(SystemClock))
    }

    pub fn with_backend(backend: Arc<dyn KvBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            update_lock: Mutex::new(()),
        }
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.backend.flush()
    }

    pub fn backend(&self) -> &dyn KvBackend {
        self.backend.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn lock_updates(&self) -> MutexGuard<'_, ()> {
        self.update_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads the document stored under `key`. A missing or unreadable
    /// document reads as `T::default()`; only backend failures are errors.
    pub(crate) fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.backend.read(key)? {
            Some(raw) => match Self::deserialize::<T>(&raw) {
                Ok(value) => Ok(value),
                Err(error) => {
                    tracing::warn!(key, error = %error, "Discarding malformed stored document");
                    Ok(T::default())
                }
            },
            None => Ok(T::default()),
        }
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = Self::serialize(value)?;
        self.backend.write(key, &bytes)
    }
}

pub(crate) fn validate_item_id(item_id: &str) -> Result<(), StoreError> {
    if item_id.trim().is_empty() {
        return Err(StoreError::Validation("item id must not be empty".to_string()));
    }
    if item_id.len() > crate::constants::MAX_ITEM_ID_LEN {
        return Err(StoreError::Validation(format!(
            "item id exceeds {} bytes",
            crate::constants::MAX_ITEM_ID_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_document_reads_as_default() {
        let store = Store::in_memory();
        store
            .backend()
            .write(keys::USER_PROGRESS, b"{not json")
            .unwrap();

        let loaded: Vec<operations::progress::ProgressRecord> =
            store.load(keys::USER_PROGRESS).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn sled_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        {
            let store = Store::open(path.to_str().unwrap()).unwrap();
            store.save_progress("asteroid-basics", 40, 12).unwrap();
            store.flush().unwrap();
        }

        let store = Store::open(path.to_str().unwrap()).unwrap();
        let record = store.get_progress("asteroid-basics").unwrap().unwrap();
        assert_eq!(record.reading_progress, 40);
        assert_eq!(record.time_spent_seconds, 12);
    }

    #[test]
    fn empty_item_id_is_rejected() {
        let store = Store::in_memory();
        let err = store.save_progress("  ", 10, 0).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
