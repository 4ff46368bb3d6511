//! Paginated, sortable, filterable listings.
//!
//! `Natural` scans the primary keys of a namespace and lets the datastore
//! apply the record filter, offset and limit. The time orders scan an index
//! prefix instead; each index entry is dereferenced to its record, and the
//! filter, offset and limit are applied to the records that resolve.
//! Descending orders reverse the key comparator; the scan itself is always
//! ascending.

use std::fmt;

use tracing::{debug, warn, Span};

use crate::datastore::{Datastore, Entry, OrderByKey, OrderByKeyDescending, Query, Results};
use crate::error::{Result, StoreError};
use crate::key::{check_segment, index_prefix, namespace_prefix, IndexKind, Key};
use crate::record::{Capabilities, Record};

use super::{load_payload, read_at};

/// Page size used by [`ListOptions::new`].
pub const DEFAULT_LIMIT: usize = 100;

/// Requested ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Backend key order of the primary keys.
    #[default]
    Natural,
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl SortOrder {
    /// The index this order scans, `None` for `Natural`.
    pub fn index_kind(self) -> Option<IndexKind> {
        match self {
            SortOrder::Natural => None,
            SortOrder::CreatedAsc | SortOrder::CreatedDesc => Some(IndexKind::Created),
            SortOrder::UpdatedAsc | SortOrder::UpdatedDesc => Some(IndexKind::Updated),
        }
    }

    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::CreatedDesc | SortOrder::UpdatedDesc)
    }
}

impl TryFrom<u8> for SortOrder {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(SortOrder::Natural),
            1 => Ok(SortOrder::CreatedAsc),
            2 => Ok(SortOrder::CreatedDesc),
            3 => Ok(SortOrder::UpdatedAsc),
            4 => Ok(SortOrder::UpdatedDesc),
            other => Err(other),
        }
    }
}

/// Caller-supplied predicate over deserialized records.
pub trait RecordFilter<M> {
    fn matches(&self, record: &M) -> bool;
}

impl<M, F> RecordFilter<M> for F
where
    F: Fn(&M) -> bool,
{
    fn matches(&self, record: &M) -> bool {
        self(record)
    }
}

/// Page, page size, order and optional filter of a listing.
pub struct ListOptions<M> {
    pub page: usize,
    pub limit: usize,
    pub sort: SortOrder,
    pub filter: Option<Box<dyn RecordFilter<M>>>,
}

impl<M> Default for ListOptions<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ListOptions<M> {
    /// First page of [`DEFAULT_LIMIT`] records in natural order.
    pub fn new() -> Self {
        Self {
            page: 0,
            limit: DEFAULT_LIMIT,
            sort: SortOrder::Natural,
            filter: None,
        }
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn filter(mut self, filter: impl RecordFilter<M> + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Records to skip before the page starts.
    pub fn offset(&self) -> usize {
        self.limit.saturating_mul(self.page)
    }
}

impl<M> fmt::Debug for ListOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOptions")
            .field("page", &self.page)
            .field("limit", &self.limit)
            .field("sort", &self.sort)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Lazy, single-pass sequence of listed records.
///
/// Records are read as the iterator advances, so writes made meanwhile may or
/// may not show up, and records deleted meanwhile are skipped.
pub struct Listing<'s, M> {
    results: Results,
    factory: Box<dyn Fn() -> M + 's>,
    mode: Mode<'s, M>,
    span: &'s Span,
}

enum Mode<'s, M> {
    /// Entries are primary records, already filtered and paged by the datastore.
    Natural,
    /// Entries are index pointers; paging happens here.
    Indexed {
        datastore: &'s dyn Datastore,
        namespace: Key,
        filter: Option<Box<dyn RecordFilter<M>>>,
        skip: usize,
        remaining: usize,
    },
}

impl<'s, M: Record> Listing<'s, M> {
    pub(crate) fn open<F>(
        datastore: &'s dyn Datastore,
        span: &'s Span,
        factory: F,
        options: ListOptions<M>,
    ) -> Result<Self>
    where
        F: Fn() -> M + 's,
    {
        let mut sample = factory();
        let namespace = sample.namespace().to_string();
        check_segment(&namespace)?;

        let Some(kind) = options.sort.index_kind() else {
            return Self::open_natural(datastore, span, factory, options, &namespace);
        };

        if !Capabilities::of(&mut sample).timestamp_tracked {
            return Err(StoreError::IndexingUnsupported { namespace });
        }
        debug!(parent: span, namespace = %namespace, sort = ?options.sort, "sorted listing");

        let query = if options.sort.is_descending() {
            Query::new(index_prefix(&namespace, kind)).order(OrderByKeyDescending)
        } else {
            Query::new(index_prefix(&namespace, kind)).order(OrderByKey)
        };
        let results = datastore.query(query)?;

        Ok(Self {
            results,
            factory: Box::new(factory),
            mode: Mode::Indexed {
                datastore,
                namespace: namespace_prefix(&namespace),
                skip: options.offset(),
                remaining: options.limit,
                filter: options.filter,
            },
            span,
        })
    }

    fn open_natural<F>(
        datastore: &'s dyn Datastore,
        span: &'s Span,
        factory: F,
        options: ListOptions<M>,
        namespace: &str,
    ) -> Result<Self>
    where
        F: Fn() -> M + 's,
    {
        let results = {
            let decodes = |entry: &Entry| {
                let mut candidate = factory();
                match load_payload(&mut candidate, &entry.value) {
                    Ok(()) => options
                        .filter
                        .as_ref()
                        .map_or(true, |filter| filter.matches(&candidate)),
                    Err(_) => false,
                }
            };
            let query = Query::new(namespace_prefix(namespace))
                .filter(decodes)
                .offset(options.offset())
                .limit(options.limit);
            datastore.query(query)?
        };

        Ok(Self {
            results,
            factory: Box::new(factory),
            mode: Mode::Natural,
            span,
        })
    }

    fn next_natural(&mut self) -> Option<Result<M>> {
        loop {
            let entry = match self.results.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };
            let mut record = (self.factory)();
            match load_payload(&mut record, &entry.value) {
                Ok(()) => return Some(Ok(record)),
                Err(err) => {
                    warn!(parent: self.span, key = %entry.key, error = %err, "skipping undecodable record");
                }
            }
        }
    }

    fn next_indexed(&mut self) -> Option<Result<M>> {
        let span = self.span;
        let Mode::Indexed {
            datastore,
            namespace,
            filter,
            skip,
            remaining,
        } = &mut self.mode
        else {
            return None;
        };

        while *remaining > 0 {
            let entry = match self.results.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };

            let primary = match Key::from_bytes(&entry.value) {
                Some(key) if key.is_descendant_of(namespace) => key,
                _ => {
                    warn!(parent: span, index = %entry.key, "index entry does not point into namespace");
                    continue;
                }
            };

            let mut record = (self.factory)();
            match read_at(*datastore, &primary, &mut record) {
                Ok(()) => {}
                Err(StoreError::NotFound { .. }) => {
                    debug!(parent: span, index = %entry.key, primary = %primary, "skipping orphaned index entry");
                    continue;
                }
                Err(StoreError::Datastore(err)) => return Some(Err(err.into())),
                Err(err) => {
                    warn!(parent: span, primary = %primary, error = %err, "skipping undecodable record");
                    continue;
                }
            }

            if let Some(filter) = filter {
                if !filter.matches(&record) {
                    continue;
                }
            }

            if *skip > 0 {
                *skip -= 1;
                continue;
            }

            *remaining -= 1;
            return Some(Ok(record));
        }
        None
    }
}

impl<M: Record> Iterator for Listing<'_, M> {
    type Item = Result<M>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.mode {
            Mode::Natural => self.next_natural(),
            Mode::Indexed { .. } => self.next_indexed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_wire_numbers() {
        assert_eq!(SortOrder::try_from(0), Ok(SortOrder::Natural));
        assert_eq!(SortOrder::try_from(4), Ok(SortOrder::UpdatedDesc));
        assert_eq!(SortOrder::try_from(9), Err(9));
    }

    #[test]
    fn sort_order_maps_to_index() {
        assert_eq!(SortOrder::Natural.index_kind(), None);
        assert_eq!(SortOrder::CreatedDesc.index_kind(), Some(IndexKind::Created));
        assert_eq!(SortOrder::UpdatedAsc.index_kind(), Some(IndexKind::Updated));
        assert!(SortOrder::UpdatedDesc.is_descending());
        assert!(!SortOrder::CreatedAsc.is_descending());
    }

    #[test]
    fn offset_is_page_times_limit() {
        let opts = ListOptions::<()>::new().page(3).limit(7);
        assert_eq!(opts.offset(), 21);
        let huge = ListOptions::<()>::new().page(usize::MAX).limit(2);
        assert_eq!(huge.offset(), usize::MAX);
    }

    #[test]
    fn closures_are_record_filters() {
        let opts = ListOptions::<u32>::new().filter(|n: &u32| *n > 3);
        let filter = opts.filter.as_ref().unwrap();
        assert!(filter.matches(&4));
        assert!(!filter.matches(&3));
    }
}
