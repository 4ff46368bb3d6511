//! Error types for record store and datastore operations.

use thiserror::Error;

use crate::key::Key;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`Datastore`](crate::datastore::Datastore) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatastoreError {
    /// The requested key is absent.
    #[error("datastore key not found: {0}")]
    NotFound(Key),

    /// A backend lock was poisoned by a panicking writer.
    #[error("datastore lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// Any other backend failure, carried verbatim.
    #[error("datastore I/O error: {0}")]
    Io(String),
}

/// Errors surfaced to callers of a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The record does not implement `Serializable`.
    #[error("record in namespace {namespace} is not serializable")]
    NotSerializable { namespace: String },

    /// No record lives at the primary key.
    #[error("record not found: {key}")]
    NotFound { key: Key },

    /// A namespace or id cannot stand as a single key segment.
    #[error("invalid key segment {segment:?}: {reason}")]
    InvalidKey {
        segment: String,
        reason: &'static str,
    },

    /// A sorted listing was requested for a type without timestamp tracking.
    #[error("indexing is not supported for namespace {namespace}")]
    IndexingUnsupported { namespace: String },

    /// The record's own marshal/unmarshal failed.
    #[error("record serialization error: {0}")]
    Serialization(String),

    /// The backend failed on a primary put/get/delete/query.
    #[error(transparent)]
    Datastore(#[from] DatastoreError),

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl StoreError {
    /// True for `NotFound`, whether raised by the store or passed through from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Datastore(DatastoreError::NotFound(_))
        )
    }
}
