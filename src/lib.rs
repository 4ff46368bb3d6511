//! Record store adapter for ordered key-value backends.
//!
//! Records live under namespaced primary keys. Records that track
//! created/updated timestamps also get secondary index entries, which make
//! time-ordered, paginated listings possible with plain prefix scans.

// Lets `#[derive(Record)]` expand to `::indexed_rust::...` inside this crate too.
extern crate self as indexed_rust;

pub mod conformance;
pub mod datastore;
mod error;
pub mod inmem;
pub mod key;
pub mod record;
pub mod store;

pub use datastore::{Datastore, MemoryDatastore};
pub use error::{DatastoreError, Result, StoreError};
pub use key::Key;
pub use record::{Capabilities, IdentityAssignable, Record, Serializable, TimestampTracked};
pub use store::{
    Clock, ListOptions, Listing, ManualClock, RecordFilter, RecordStore, SortOrder, Store,
    StoreConfig, SystemClock,
};

// Derive macro shares the trait's name, like serde's derives.
pub use indexed_rust_macros::Record;
