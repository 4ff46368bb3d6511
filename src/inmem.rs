//! Ready-made store over [`MemoryDatastore`].

use crate::datastore::MemoryDatastore;
use crate::store::{RecordStore, StoreConfig};

/// A record store backed by a fresh in-memory datastore.
pub fn new_inmem_store() -> RecordStore<MemoryDatastore> {
    RecordStore::new(StoreConfig::new(MemoryDatastore::new()))
}
