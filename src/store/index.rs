//! IndexManager - best-effort maintenance of created/updated index entries.
//!
//! Index writes never fail the enclosing record operation. A failed put or
//! delete is logged and dropped, which can leave a record missing from
//! sorted listings or leave an orphaned entry behind. Orphans are skipped
//! when a listing dereferences them.

use tracing::{trace, warn, Span};

use crate::datastore::{Datastore, Entry, Query, Results};
use crate::key::{index_key, index_prefix, IndexKind, Key};
use crate::record::TimestampTracked;

/// Adds and removes index entries against a datastore.
pub struct IndexManager<'a, D: ?Sized> {
    datastore: &'a D,
    span: &'a Span,
}

impl<'a, D: Datastore + ?Sized> IndexManager<'a, D> {
    pub fn new(datastore: &'a D, span: &'a Span) -> Self {
        Self { datastore, span }
    }

    /// Point `index` at `primary`. Returns whether the write landed.
    pub fn add_index(&self, index: &Key, primary: &Key) -> bool {
        match self.datastore.put(index, primary.as_bytes().to_vec()) {
            Ok(()) => {
                trace!(parent: self.span, index = %index, primary = %primary, "index added");
                true
            }
            Err(err) => {
                warn!(parent: self.span, index = %index, error = %err, "failed to add index");
                false
            }
        }
    }

    /// Drop `index`. Absent entries count as removed.
    pub fn remove_index(&self, index: &Key) -> bool {
        match self.datastore.delete(index) {
            Ok(()) => {
                trace!(parent: self.span, index = %index, "index removed");
                true
            }
            Err(err) => {
                warn!(parent: self.span, index = %index, error = %err, "failed to remove index");
                false
            }
        }
    }

    /// Add both created and updated entries for a freshly created record.
    pub fn add_all(&self, namespace: &str, id: &str, times: &dyn TimestampTracked, primary: &Key) {
        self.add_index(
            &index_key(namespace, IndexKind::Created, times.created(), id),
            primary,
        );
        self.add_index(
            &index_key(namespace, IndexKind::Updated, times.updated(), id),
            primary,
        );
    }

    /// Index entries of `kind` currently stored for `id`, found by scanning
    /// the index prefix for keys ending in the id. A failed scan is logged
    /// and reads as empty.
    pub fn entries_for(&self, namespace: &str, kind: IndexKind, id: &str) -> Vec<Key> {
        let wanted = id.to_string();
        let query = Query::new(index_prefix(namespace, kind))
            .filter(move |entry: &Entry| entry.key.name() == wanted);
        match self.datastore.query(query).and_then(Results::rest) {
            Ok(entries) => entries.into_iter().map(|entry| entry.key).collect(),
            Err(err) => {
                warn!(parent: self.span, namespace, id, kind = %kind, error = %err, "failed to scan index");
                Vec::new()
            }
        }
    }

    /// Remove every created and updated entry stored for `id`.
    pub fn remove_all(&self, namespace: &str, id: &str) {
        for kind in [IndexKind::Created, IndexKind::Updated] {
            for index in self.entries_for(namespace, kind, id) {
                self.remove_index(&index);
            }
        }
    }

    /// Replace the `stale` updated entries with one at `current`.
    pub fn relocate_updated(
        &self,
        namespace: &str,
        id: &str,
        stale: &[Key],
        current: i64,
        primary: &Key,
    ) {
        for index in stale {
            self.remove_index(index);
        }
        self.add_index(&index_key(namespace, IndexKind::Updated, current, id), primary);
    }
}
