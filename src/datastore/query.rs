//! Query description and the naive in-memory evaluation of it.

use std::cmp::Ordering;
use std::fmt;

use crate::error::DatastoreError;
use crate::key::Key;

/// One key/value pair returned by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Vec<u8>,
}

/// Predicate over query entries.
pub trait Filter {
    fn filter(&self, entry: &Entry) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Entry) -> bool,
{
    fn filter(&self, entry: &Entry) -> bool {
        self(entry)
    }
}

/// Comparator over query entries.
pub trait Order {
    fn compare(&self, a: &Entry, b: &Entry) -> Ordering;
}

/// Ascending lexicographic key order.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderByKey;

impl Order for OrderByKey {
    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        a.key.cmp(&b.key)
    }
}

/// Descending lexicographic key order, computed by comparing the keys the
/// other way round. The underlying scan stays ascending.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderByKeyDescending;

impl Order for OrderByKeyDescending {
    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        b.key.cmp(&a.key)
    }
}

/// A prefix scan with optional post-processing.
pub struct Query<'a> {
    pub prefix: Key,
    pub filters: Vec<Box<dyn Filter + 'a>>,
    pub orders: Vec<Box<dyn Order + 'a>>,
    pub offset: usize,
    /// `None` means unbounded.
    pub limit: Option<usize>,
}

impl<'a> Query<'a> {
    pub fn new(prefix: Key) -> Self {
        Self {
            prefix,
            filters: Vec::new(),
            orders: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: impl Filter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn order(mut self, order: impl Order + 'a) -> Self {
        self.orders.push(Box::new(order));
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("prefix", &self.prefix)
            .field("filters", &self.filters.len())
            .field("orders", &self.orders.len())
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Single-pass stream of query results.
pub struct Results {
    inner: Box<dyn Iterator<Item = Result<Entry, DatastoreError>> + Send>,
}

impl Results {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Entry, DatastoreError>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self::new(entries.into_iter().map(Ok))
    }

    /// Drain every entry, stopping at the first error.
    pub fn rest(self) -> Result<Vec<Entry>, DatastoreError> {
        self.collect()
    }
}

impl Iterator for Results {
    type Item = Result<Entry, DatastoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Keep entries every filter accepts.
pub fn naive_filter<I>(filters: &[Box<dyn Filter + '_>], entries: I) -> Vec<Entry>
where
    I: IntoIterator<Item = Entry>,
{
    entries
        .into_iter()
        .filter(|entry| filters.iter().all(|f| f.filter(entry)))
        .collect()
}

/// Stable sort by the orders in sequence; later orders only break ties.
pub fn naive_order(orders: &[Box<dyn Order + '_>], entries: &mut [Entry]) {
    if orders.is_empty() {
        return;
    }
    entries.sort_by(|a, b| {
        orders
            .iter()
            .map(|o| o.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Evaluate `query` over an ascending stream of candidate entries.
pub fn naive_query_apply<I>(query: &Query<'_>, entries: I) -> Vec<Entry>
where
    I: IntoIterator<Item = Entry>,
{
    let below_prefix = entries
        .into_iter()
        .filter(|entry| entry.key.is_descendant_of(&query.prefix));
    let mut selected = naive_filter(&query.filters, below_prefix);
    naive_order(&query.orders, &mut selected);

    let limit = query.limit.unwrap_or(usize::MAX);
    selected
        .into_iter()
        .skip(query.offset)
        .take(limit)
        .collect()
}
