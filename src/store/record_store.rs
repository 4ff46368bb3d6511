//! RecordStore - the datastore-backed [`Store`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, Span};
use uuid::Uuid;

use super::list::{ListOptions, Listing};
use super::{read_at, Clock, IndexManager, Store, StoreConfig, HANDLER};
use crate::datastore::Datastore;
use crate::error::{Result, StoreError};
use crate::key::{index_key, index_timestamp, record_key, IndexKind};
use crate::record::Record;

/// Record store over any [`Datastore`].
pub struct RecordStore<D> {
    datastore: D,
    clock: Arc<dyn Clock>,
    span: Span,
    closed: AtomicBool,
}

impl<D: Datastore> RecordStore<D> {
    pub fn new(config: StoreConfig<D>) -> Self {
        Self {
            datastore: config.datastore,
            clock: config.clock,
            span: config.span,
            closed: AtomicBool::new(false),
        }
    }

    /// The backing datastore.
    pub fn datastore(&self) -> &D {
        &self.datastore
    }

    fn indexes(&self) -> IndexManager<'_, D> {
        IndexManager::new(&self.datastore, &self.span)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn marshal<R: Record + ?Sized>(record: &R) -> Result<Vec<u8>> {
        record
            .as_serializable()
            .ok_or_else(|| StoreError::NotSerializable {
                namespace: record.namespace().to_string(),
            })?
            .marshal()
    }

    fn require_serializable<R: Record + ?Sized>(record: &R) -> Result<()> {
        if record.as_serializable().is_none() {
            return Err(StoreError::NotSerializable {
                namespace: record.namespace().to_string(),
            });
        }
        Ok(())
    }
}

impl<D: Datastore> Store for RecordStore<D> {
    fn handler(&self) -> &'static str {
        HANDLER
    }

    fn create<R: Record + ?Sized>(&self, record: &mut R) -> Result<()> {
        self.ensure_open()?;
        Self::require_serializable(record)?;

        if record.id().is_empty() {
            if let Some(assignable) = record.as_identity_assignable() {
                assignable.set_id(Uuid::new_v4().to_string());
            }
        }

        let namespace = record.namespace().to_string();
        let id = record.id().to_string();
        let key = record_key(&namespace, &id)?;

        if let Some(times) = record.as_timestamped_mut() {
            let now = self.clock.now();
            times.set_created(now);
            times.set_updated(now);
        }

        let value = Self::marshal(record)?;
        if let Some(times) = record.as_timestamped() {
            // An overwritten record must not keep its old entries.
            let indexes = self.indexes();
            indexes.remove_all(&namespace, &id);
            indexes.add_all(&namespace, &id, times, &key);
        }
        self.datastore.put(&key, value)?;

        debug!(parent: &self.span, key = %key, "record created");
        Ok(())
    }

    fn read<R: Record + ?Sized>(&self, record: &mut R) -> Result<()> {
        self.ensure_open()?;
        Self::require_serializable(record)?;

        let key = record_key(record.namespace(), record.id())?;
        read_at(&self.datastore, &key, record)
    }

    fn update<R: Record + ?Sized>(&self, record: &mut R) -> Result<()> {
        self.ensure_open()?;
        Self::require_serializable(record)?;

        let namespace = record.namespace().to_string();
        let id = record.id().to_string();
        let key = record_key(&namespace, &id)?;

        // The stored index entries, not the caller's copy, say when the record
        // was created and which updated entry is stale.
        let indexes = self.indexes();
        let mut stale = Vec::new();
        let mut unindexed_created = None;
        if let Some(times) = record.as_timestamped_mut() {
            let created = indexes.entries_for(&namespace, IndexKind::Created, &id);
            match created.iter().filter_map(index_timestamp).min() {
                Some(stored) => times.set_created(stored),
                None if created.is_empty() => unindexed_created = Some(times.created()),
                None => {}
            }

            stale = indexes.entries_for(&namespace, IndexKind::Updated, &id);
            let previous = stale
                .iter()
                .filter_map(index_timestamp)
                .max()
                .unwrap_or_else(|| times.updated());
            // Same-second updates still move forward so the updated order stays strict.
            times.set_updated(self.clock.now().max(previous.saturating_add(1)));
        }

        let value = Self::marshal(record)?;
        if let Some(times) = record.as_timestamped() {
            if let Some(created) = unindexed_created {
                indexes.add_index(&index_key(&namespace, IndexKind::Created, created, &id), &key);
            }
            indexes.relocate_updated(&namespace, &id, &stale, times.updated(), &key);
        }
        self.datastore.put(&key, value)?;

        debug!(parent: &self.span, key = %key, "record updated");
        Ok(())
    }

    fn delete<R: Record + ?Sized>(&self, record: &R) -> Result<()> {
        self.ensure_open()?;

        let key = record_key(record.namespace(), record.id())?;
        if record.as_timestamped().is_some() {
            self.indexes().remove_all(record.namespace(), record.id());
        }
        self.datastore.delete(&key)?;

        debug!(parent: &self.span, key = %key, "record deleted");
        Ok(())
    }

    fn list<'s, M, F>(&'s self, factory: F, options: ListOptions<M>) -> Result<Listing<'s, M>>
    where
        M: Record + 's,
        F: Fn() -> M + 's,
    {
        self.ensure_open()?;
        Listing::open(&self.datastore, &self.span, factory, options)
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!(parent: &self.span, "closing ds");
        self.datastore.close()?;
        Ok(())
    }
}
