//! MemoryDatastore - BTreeMap-backed datastore for testing and development.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::query::{naive_query_apply, Entry, Query, Results};
use super::Datastore;
use crate::error::DatastoreError;
use crate::key::Key;

/// In-memory ordered datastore.
///
/// Keys are kept sorted, so queries scan in ascending key order.
/// Clone-friendly via Arc (clones share storage).
#[derive(Clone, Default)]
pub struct MemoryDatastore {
    storage: Arc<RwLock<BTreeMap<Key, Vec<u8>>>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, primary and index alike.
    pub fn len(&self) -> Result<usize, DatastoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| DatastoreError::LockPoisoned("len"))?;
        Ok(storage.len())
    }

    pub fn is_empty(&self) -> Result<bool, DatastoreError> {
        Ok(self.len()? == 0)
    }

    /// Every stored key strictly below `prefix`, ascending.
    pub fn keys_under(&self, prefix: &Key) -> Result<Vec<Key>, DatastoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| DatastoreError::LockPoisoned("keys"))?;
        Ok(storage
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.as_str().starts_with(prefix.as_str()))
            .filter(|(key, _)| key.is_descendant_of(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

impl Datastore for MemoryDatastore {
    fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| DatastoreError::LockPoisoned("put"))?;
        storage.insert(key.clone(), value);
        Ok(())
    }

    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| DatastoreError::LockPoisoned("get"))?;
        storage
            .get(key)
            .cloned()
            .ok_or_else(|| DatastoreError::NotFound(key.clone()))
    }

    fn has(&self, key: &Key) -> Result<bool, DatastoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| DatastoreError::LockPoisoned("has"))?;
        Ok(storage.contains_key(key))
    }

    fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| DatastoreError::LockPoisoned("delete"))?;
        storage.remove(key);
        Ok(())
    }

    fn query(&self, query: Query<'_>) -> Result<Results, DatastoreError> {
        // Snapshot the prefix range so filters and orders run without the lock.
        let candidates: Vec<Entry> = {
            let storage = self
                .storage
                .read()
                .map_err(|_| DatastoreError::LockPoisoned("query"))?;
            storage
                .range(query.prefix.clone()..)
                .take_while(|(key, _)| key.as_str().starts_with(query.prefix.as_str()))
                .map(|(key, value)| Entry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        };

        Ok(Results::from_entries(naive_query_apply(&query, candidates)))
    }
}
