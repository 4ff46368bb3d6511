//! Key scheme - deterministic primary and index keys.
//!
//! Layout under a namespace `ns`:
//!
//! ```text
//! /ns/k/<id>                 primary key, value = record payload
//! /ns/c/<ts20>/<id>          created index, value = primary key
//! /ns/u/<ts20>/<id>          updated index, value = primary key
//! ```
//!
//! `<ts20>` is a fixed-width decimal whose lexicographic order matches the
//! numeric order of the timestamp, so an ascending key scan over an index
//! prefix is an ascending timestamp scan. The trailing id breaks ties between
//! records stamped in the same second.

use std::fmt;

mod path;

pub use path::Key;

use crate::error::{Result, StoreError};

/// Segment that holds primary keys under a namespace.
pub const PRIMARY_SEGMENT: &str = "k";

/// Which timestamp a secondary index orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Created,
    Updated,
}

impl IndexKind {
    /// Key segment for this index kind.
    pub fn segment(self) -> &'static str {
        match self {
            IndexKind::Created => "c",
            IndexKind::Updated => "u",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Created => write!(f, "created"),
            IndexKind::Updated => write!(f, "updated"),
        }
    }
}

/// Prefix every primary key of `namespace` lives under.
pub fn namespace_prefix(namespace: &str) -> Key {
    Key::new(namespace).child(PRIMARY_SEGMENT)
}

/// Primary key addressing one record's payload.
pub fn primary_key(namespace: &str, id: &str) -> Key {
    namespace_prefix(namespace).child(id)
}

/// Reject namespaces and ids that would not survive as one key segment.
///
/// [`Key`] drops empty segments and splits on `/`, so either would move the
/// record to a different place in the key space.
pub fn check_segment(segment: &str) -> Result<()> {
    let reason = if segment.is_empty() {
        "segment is empty"
    } else if segment.contains('/') {
        "segment contains '/'"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidKey {
        segment: segment.to_string(),
        reason,
    })
}

/// [`primary_key`] after validating both segments.
pub fn record_key(namespace: &str, id: &str) -> Result<Key> {
    check_segment(namespace)?;
    check_segment(id)?;
    Ok(primary_key(namespace, id))
}

/// Prefix every index entry of `kind` under `namespace` lives under.
pub fn index_prefix(namespace: &str, kind: IndexKind) -> Key {
    Key::new(namespace).child(kind.segment())
}

/// Index key for a record with the given timestamp.
pub fn index_key(namespace: &str, kind: IndexKind, timestamp: i64, id: &str) -> Key {
    index_prefix(namespace, kind)
        .child(&encode_timestamp(timestamp))
        .child(id)
}

/// Render a timestamp so that string order equals numeric order.
///
/// Flipping the sign bit maps `i64::MIN..=i64::MAX` monotonically onto
/// `0..=u64::MAX`, which always fits in 20 decimal digits.
pub fn encode_timestamp(timestamp: i64) -> String {
    format!("{:020}", (timestamp as u64) ^ (1 << 63))
}

/// Inverse of [`encode_timestamp`].
pub fn decode_timestamp(encoded: &str) -> Option<i64> {
    if encoded.len() != 20 {
        return None;
    }
    let raw: u64 = encoded.parse().ok()?;
    Some((raw ^ (1 << 63)) as i64)
}

/// Timestamp carried by an index key built with [`index_key`].
pub fn index_timestamp(index: &Key) -> Option<i64> {
    let mut segments = index.as_str().rsplit('/');
    segments.next()?;
    decode_timestamp(segments.next()?)
}
