//! In-Memory Store Backend
//!
//! HashMap-backed implementation of [`EntryStore`]. Not durable; used by
//! tests and by deployments that accept losing entries on restart.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::store::{EntryStore, StoreError};

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Ok(records.remove(key).is_some())
    }

    fn iterate(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .map(|(key, bytes)| (key.clone(), bytes.clone()))
            .collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_round_trip() {
        let store = MemoryStore::new();

        store.put("k1", b"payload").unwrap();
        assert_eq!(store.get("k1").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_delete_reports_presence() {
        let store = MemoryStore::new();
        store.put("k1", b"payload").unwrap();

        assert!(store.delete("k1").unwrap());
        assert!(!store.delete("k1").unwrap());
    }

    #[test]
    fn test_iterate_snapshots_all_records() {
        let store = MemoryStore::new();
        store.put("a", b"1").unwrap();
        store.put("b", b"2").unwrap();

        let mut records = store.iterate().unwrap();
        records.sort();

        assert_eq!(
            records,
            vec![
                ("a".to_string(), b"1".to_vec()),
                ("b".to_string(), b"2".to_vec())
            ]
        );
    }
}
