//! Records and their optional capabilities.
//!
//! A record is any caller type that names its namespace and id. Everything
//! else is opt-in: a type advertises a capability by overriding the matching
//! `as_*` accessor on [`Record`], and the store discovers it at runtime
//! through those accessors rather than through a shared base type.
//!
//! ## Example
//!
//! ```ignore
//! use indexed_rust::Record;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize, Record)]
//! #[record(namespace = "files")]
//! struct File {
//!     #[record(id, generated)]
//!     id: String,
//!     name: String,
//!     #[record(created)]
//!     created_at: i64,
//!     #[record(updated)]
//!     updated_at: i64,
//! }
//! ```

mod capabilities;

pub use capabilities::Capabilities;

use crate::error::Result;

/// A namespaced entity the store can address.
pub trait Record {
    /// Partition of the key space this record lives in.
    fn namespace(&self) -> &str;

    /// Identifier, unique within the namespace. May be empty before create
    /// when the record is [`IdentityAssignable`].
    fn id(&self) -> &str;

    /// Override to let the store persist this record. Every operation but
    /// delete requires it.
    fn as_serializable(&self) -> Option<&dyn Serializable> {
        None
    }

    /// Mutable view of [`Record::as_serializable`], used to decode payloads in place.
    fn as_serializable_mut(&mut self) -> Option<&mut dyn Serializable> {
        None
    }

    /// Override to have create assign a generated id when `id()` is empty.
    fn as_identity_assignable(&mut self) -> Option<&mut dyn IdentityAssignable> {
        None
    }

    /// Override to get created/updated indexes and time-sorted listings.
    fn as_timestamped(&self) -> Option<&dyn TimestampTracked> {
        None
    }

    /// Mutable view of [`Record::as_timestamped`], used to stamp times on write.
    fn as_timestamped_mut(&mut self) -> Option<&mut dyn TimestampTracked> {
        None
    }
}

/// Conversion to and from the opaque payload stored at the primary key.
pub trait Serializable {
    fn marshal(&self) -> Result<Vec<u8>>;

    /// Overwrite `self` with the decoded payload.
    fn unmarshal(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Accepts a store-generated id when the record has none.
pub trait IdentityAssignable {
    fn set_id(&mut self, id: String);
}

/// Created/updated Unix timestamps (seconds). Records with this capability
/// get secondary indexes and can be listed in time order.
pub trait TimestampTracked {
    fn created(&self) -> i64;
    fn set_created(&mut self, unix_time: i64);
    fn updated(&self) -> i64;
    fn set_updated(&mut self, unix_time: i64);
}

/// Encode a serde record as JSON. Used by `#[derive(Record)]`.
pub fn marshal_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode JSON into an existing value. Used by `#[derive(Record)]`.
pub fn unmarshal_json<T: serde::de::DeserializeOwned>(target: &mut T, bytes: &[u8]) -> Result<()> {
    *target = serde_json::from_slice(bytes)?;
    Ok(())
}
