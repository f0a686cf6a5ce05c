//! Key-value persistence adapters.
//!
//! A backend maps string keys to whole JSON documents. `write` replaces the
//! previous value at a key outright; callers do their own read-modify-write.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::store::StoreError;

const USER_DATA_TREE: &str = "user_data";

pub trait KvBackend: Send + Sync + fmt::Debug {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn flush(&self) -> Result<(), StoreError>;
}

/// Durable backend on a sled tree.
#[derive(Debug)]
pub struct SledBackend {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledBackend {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(USER_DATA_TREE)?;
        Ok(Self { db, tree })
    }
}

impl KvBackend for SledBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tree.get(key.as_bytes())?.map(|raw| raw.to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.tree.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

/// Process-local backend. Optionally enforces a total size quota so that
/// storage-full failures can be exercised.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend lock poisoned".to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let size = others + key.len() + value.len();
            if size > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_previous_value() {
        let backend = MemoryBackend::new();
        backend.write("k", br#"{"a":1,"b":2}"#).unwrap();
        backend.write("k", br#"{"a":3}"#).unwrap();
        assert_eq!(backend.read("k").unwrap().unwrap(), br#"{"a":3}"#.to_vec());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let backend = MemoryBackend::with_quota(16);
        backend.write("k", b"[1]").unwrap();

        let err = backend.write("k", &[b'x'; 64]).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(backend.read("k").unwrap().unwrap(), b"[1]".to_vec());
    }

    #[test]
    fn sled_backend_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SledBackend::open(dir.path().join("kv").to_str().unwrap()).unwrap();

        assert!(backend.read("missing").unwrap().is_none());
        backend.write("k", b"[]").unwrap();
        assert_eq!(backend.read("k").unwrap().unwrap(), b"[]".to_vec());
        backend.remove("k").unwrap();
        assert!(backend.read("k").unwrap().is_none());
    }
}
