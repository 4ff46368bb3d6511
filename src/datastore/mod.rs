//! Datastore - the ordered key-value backend the record store sits on.
//!
//! A backend only has to provide single-key put/get/delete and an ascending
//! prefix query. Descending orders, secondary indexes and record filters are
//! layered on top by the store; backends that cannot evaluate [`Query`]
//! orders or filters natively can run them through [`naive_query_apply`].

mod memory;
mod query;

pub use memory::MemoryDatastore;
pub use query::{
    naive_filter, naive_order, naive_query_apply, Entry, Filter, Order, OrderByKey,
    OrderByKeyDescending, Query, Results,
};

use crate::error::DatastoreError;
use crate::key::Key;

/// Ordered key-value storage.
pub trait Datastore: Send + Sync {
    /// Store `value` at `key`, replacing any previous value.
    fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError>;

    /// Fetch the value at `key`. Fails with `DatastoreError::NotFound` when absent.
    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError>;

    fn has(&self, key: &Key) -> Result<bool, DatastoreError> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(DatastoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &Key) -> Result<(), DatastoreError>;

    /// Enumerate entries strictly below `query.prefix` in ascending key order,
    /// then apply filters, orders, offset and limit in that sequence.
    fn query(&self, query: Query<'_>) -> Result<Results, DatastoreError>;

    /// Release backend resources.
    fn close(&self) -> Result<(), DatastoreError> {
        Ok(())
    }
}
