// SPDX-License-Identifier: GPL-3.0-only
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{BlobStore, RecordKey, StoreError};

/// In-process store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: DashMap<RecordKey, Vec<u8>>,
    writes: AtomicUsize,
    deny_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given records.
    #[must_use]
    pub fn with_records(state: Vec<u8>, settings: Vec<u8>) -> Self {
        let store = Self::new();
        store.blobs.insert(RecordKey::State, state);
        store.blobs.insert(RecordKey::Settings, settings);
        store
    }

    /// Put a blob without counting it as a write.
    pub fn insert(&self, key: RecordKey, bytes: Vec<u8>) {
        self.blobs.insert(key, bytes);
    }

    pub fn remove(&self, key: RecordKey) {
        self.blobs.remove(&key);
    }

    /// Current blob, if any.
    #[must_use]
    pub fn get(&self, key: RecordKey) -> Option<Vec<u8>> {
        self.blobs.get(&key).map(|entry| entry.value().clone())
    }

    /// Number of successful `write_blob` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail with [`StoreError::WriteDenied`].
    pub fn set_deny_writes(&self, deny: bool) {
        self.deny_writes.store(deny, Ordering::SeqCst);
    }
}

impl BlobStore for MemoryStore {
    fn exists(&self, key: RecordKey) -> bool {
        self.blobs.contains_key(&key)
    }

    fn read_blob(&self, key: RecordKey) -> Result<Vec<u8>, StoreError> {
        self.get(key).ok_or(StoreError::KeyNotFound { key })
    }

    fn write_blob(&self, key: RecordKey, bytes: &[u8]) -> Result<(), StoreError> {
        if self.deny_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteDenied {
                key,
                reason: "store is read-only".to_string(),
            });
        }
        self.blobs.insert(key, bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_only_successful_writes() {
        let store = MemoryStore::with_records(vec![1], vec![2]);
        store.write_blob(RecordKey::State, &[3]).unwrap();
        store.set_deny_writes(true);
        assert!(matches!(
            store.write_blob(RecordKey::State, &[4]),
            Err(StoreError::WriteDenied { .. })
        ));
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_blob(RecordKey::State).unwrap(), vec![3]);
    }

    #[test]
    fn test_missing_key_is_reported() {
        let store = MemoryStore::new();
        assert!(!store.exists(RecordKey::Settings));
        assert!(matches!(
            store.read_blob(RecordKey::Settings),
            Err(StoreError::KeyNotFound {
                key: RecordKey::Settings
            })
        ));
    }
}
