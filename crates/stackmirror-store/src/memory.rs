//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use stackmirror_core::Record;

use crate::error::{Result, StoreError};
use crate::traits::{check_identity, CascadeStore, RecordStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    /// Records indexed by (namespace, name).
    records: RwLock<BTreeMap<(String, String), Record>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored records across all namespaces.
    pub fn len(&self) -> usize {
        self.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<(String, String), Record>>> {
        self.records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<(String, String), Record>>> {
        self.records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        let records = self.read()?;
        Ok(records.get(&key(namespace, name)).cloned())
    }

    async fn create(&self, record: &Record) -> Result<()> {
        check_identity(record)?;
        let mut records = self.write()?;

        let k = key(&record.namespace, &record.name);
        if records.contains_key(&k) {
            return Err(StoreError::already_exists(&record.namespace, &record.name));
        }
        records.insert(k, record.clone());
        Ok(())
    }

    async fn update(&self, record: &Record) -> Result<()> {
        check_identity(record)?;
        let mut records = self.write()?;

        match records.get_mut(&key(&record.namespace, &record.name)) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(&record.namespace, &record.name)),
        }
    }
}

#[async_trait]
impl CascadeStore for MemoryStore {
    async fn list(&self, namespace: &str) -> Result<Vec<Record>> {
        let records = self.read()?;
        Ok(records
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn delete_owned_by(&self, owner_uid: &str) -> Result<usize> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|_, r| !r.is_owned_by(owner_uid));
        let removed = before - records.len();

        tracing::debug!(owner_uid, removed, "cascade delete");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmirror_core::{OwnerReference, StackOwner};

    fn owned(namespace: &str, name: &str, uid: &str) -> Record {
        let mut record = Record::stub(namespace, name);
        record.owner_reference = Some(OwnerReference::controller_of(&StackOwner::stack(
            namespace, "stack", uid,
        )));
        record
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert!(store.get("ns1", "a").await.unwrap().is_none());

        let record = Record::stub("ns1", "a");
        store.create(&record).await.unwrap();

        let retrieved = store.get("ns1", "a").await.unwrap().unwrap();
        assert_eq!(retrieved, record);
        assert!(store.get("ns2", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_create_twice() {
        let store = MemoryStore::new();
        let record = Record::stub("ns1", "a");

        store.create(&record).await.unwrap();
        let err = store.create(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_memory_store_update_missing() {
        let store = MemoryStore::new();
        let err = store.update(&Record::stub("ns1", "a")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_memory_store_update_replaces() {
        let store = MemoryStore::new();
        let mut record = Record::stub("ns1", "a");
        record.data.insert("Old".into(), "1".into());
        store.create(&record).await.unwrap();

        let mut replacement = Record::stub("ns1", "a");
        replacement.data.insert("New".into(), "2".into());
        store.update(&replacement).await.unwrap();

        let stored = store.get("ns1", "a").await.unwrap().unwrap();
        assert_eq!(stored.get("New"), Some("2"));
        assert!(stored.get("Old").is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_empty_name() {
        let store = MemoryStore::new();
        let err = store.create(&Record::stub("ns1", "")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_cascade() {
        let store = MemoryStore::new();
        store.create(&owned("ns1", "a", "uid-1")).await.unwrap();
        store.create(&owned("ns1", "b", "uid-1")).await.unwrap();
        store.create(&owned("ns1", "c", "uid-2")).await.unwrap();
        store.create(&Record::stub("ns1", "d")).await.unwrap();

        assert_eq!(store.delete_owned_by("uid-1").await.unwrap(), 2);

        let names: Vec<_> = store
            .list("ns1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["c", "d"]);
        assert_eq!(store.delete_owned_by("uid-1").await.unwrap(), 0);
    }
}
