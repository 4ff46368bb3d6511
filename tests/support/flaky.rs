//! Datastore wrapper that fails selected operations on demand.

use std::sync::atomic::{AtomicBool, Ordering};

use indexed_rust::datastore::{Query, Results};
use indexed_rust::key::PRIMARY_SEGMENT;
use indexed_rust::{Datastore, DatastoreError, Key, MemoryDatastore};

#[derive(Default)]
pub struct FlakyDatastore {
    pub inner: MemoryDatastore,
    fail_index_writes: AtomicBool,
    fail_primary_writes: AtomicBool,
    fail_reads: AtomicBool,
    closed: AtomicBool,
}

impl FlakyDatastore {
    pub fn new(inner: MemoryDatastore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_index_writes(&self, on: bool) {
        self.fail_index_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_primary_writes(&self, on: bool) {
        self.fail_primary_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn is_index(key: &Key) -> bool {
        key.as_str().split('/').nth(2) != Some(PRIMARY_SEGMENT)
    }

    fn check_write(&self, key: &Key) -> Result<(), DatastoreError> {
        let flag = if Self::is_index(key) {
            &self.fail_index_writes
        } else {
            &self.fail_primary_writes
        };
        if flag.load(Ordering::SeqCst) {
            return Err(DatastoreError::Io(format!("injected write failure at {}", key)));
        }
        Ok(())
    }
}

impl Datastore for FlakyDatastore {
    fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError> {
        self.check_write(key)?;
        self.inner.put(key, value)
    }

    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DatastoreError::Io("injected read failure".into()));
        }
        self.inner.get(key)
    }

    fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        self.check_write(key)?;
        self.inner.delete(key)
    }

    fn query(&self, query: Query<'_>) -> Result<Results, DatastoreError> {
        self.inner.query(query)
    }

    fn close(&self) -> Result<(), DatastoreError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DatastoreError::Io("closed twice".into()));
        }
        Ok(())
    }
}
