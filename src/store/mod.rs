//! Store - CRUD and listing over namespaced records.
//!
//! ## Example
//!
//! ```ignore
//! use indexed_rust::{inmem, ListOptions, SortOrder, Store};
//!
//! let store = inmem::new_inmem_store();
//! let mut file = File { name: "notes.txt".into(), ..Default::default() };
//! store.create(&mut file)?;
//!
//! let newest: Vec<File> = store
//!     .list(File::default, ListOptions::new().sort(SortOrder::CreatedDesc).limit(10))?
//!     .collect::<Result<_, _>>()?;
//! ```

mod clock;
mod index;
mod list;
mod record_store;

use std::sync::Arc;

use tracing::Span;

use crate::datastore::Datastore;
use crate::error::{DatastoreError, Result, StoreError};
use crate::key::Key;
use crate::record::Record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use index::IndexManager;
pub use list::{ListOptions, Listing, RecordFilter, SortOrder, DEFAULT_LIMIT};
pub use record_store::RecordStore;

/// Name reported by [`Store::handler`] for datastore-backed stores.
pub const HANDLER: &str = "dsdb";

/// Record CRUD plus paginated listing.
pub trait Store {
    /// Short name of the backing implementation.
    fn handler(&self) -> &'static str;

    /// Persist a new record, assigning an id and timestamps where supported.
    /// An existing record at the same key is overwritten.
    fn create<R: Record + ?Sized>(&self, record: &mut R) -> Result<()>;

    /// Load the record addressed by `record`'s namespace and id into `record`.
    fn read<R: Record + ?Sized>(&self, record: &mut R) -> Result<()>;

    /// Overwrite a record, refreshing its updated timestamp and index entry.
    ///
    /// The stale index entry is located from the updated timestamp `record`
    /// carries, so pass a record that was read from the store.
    fn update<R: Record + ?Sized>(&self, record: &mut R) -> Result<()>;

    /// Remove a record and its index entries. Deleting an absent record succeeds.
    fn delete<R: Record + ?Sized>(&self, record: &R) -> Result<()>;

    /// List records of the namespace `factory` produces.
    fn list<'s, M, F>(&'s self, factory: F, options: ListOptions<M>) -> Result<Listing<'s, M>>
    where
        M: Record + 's,
        F: Fn() -> M + 's;

    /// Release the backend. Idempotent.
    fn close(&self) -> Result<()>;
}

/// Construction parameters for a [`RecordStore`].
pub struct StoreConfig<D> {
    pub datastore: D,
    pub clock: Arc<dyn Clock>,
    pub span: Span,
}

impl<D> StoreConfig<D> {
    /// Wall clock and a default `indexed_rust::store` span.
    pub fn new(datastore: D) -> Self {
        Self {
            datastore,
            clock: Arc::new(SystemClock),
            span: tracing::info_span!("indexed_rust::store", handler = HANDLER),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Parent span for every event the store emits.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Decode `bytes` into `record` through its `Serializable` capability.
pub(crate) fn load_payload<R: Record + ?Sized>(record: &mut R, bytes: &[u8]) -> Result<()> {
    let namespace = record.namespace().to_string();
    record
        .as_serializable_mut()
        .ok_or(StoreError::NotSerializable { namespace })?
        .unmarshal(bytes)
}

/// Fetch the payload at `key` into `record`. The read path shared by
/// [`Store::read`] and index dereferencing in listings.
pub(crate) fn read_at<R: Record + ?Sized>(
    datastore: &dyn Datastore,
    key: &Key,
    record: &mut R,
) -> Result<()> {
    let payload = datastore.get(key).map_err(|err| match err {
        DatastoreError::NotFound(key) => StoreError::NotFound { key },
        other => StoreError::Datastore(other),
    })?;
    load_payload(record, &payload)
}
