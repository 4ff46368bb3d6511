//! Record types used across the integration suites.

use indexed_rust::Record;
use serde::{Deserialize, Serialize};

/// Fixed namespace, store-assigned ids, timestamp tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
#[record(namespace = "files")]
pub struct File {
    #[record(id, generated)]
    pub id: String,
    pub name: String,
    #[record(created)]
    pub created_at: i64,
    #[record(updated)]
    pub updated_at: i64,
}

impl File {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// Namespace chosen per instance, caller-managed ids, timestamp tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
pub struct Item {
    #[record(namespace)]
    pub namespace: String,
    #[record(id)]
    pub id: String,
    pub tag: String,
    #[record(created)]
    pub created: i64,
    #[record(updated)]
    pub updated: i64,
}

impl Item {
    pub fn new(namespace: &str, id: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn tagged(namespace: &str, id: &str, tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::new(namespace, id)
        }
    }
}

/// No timestamps: stored and listed naturally, never indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
#[record(namespace = "notes")]
pub struct Note {
    pub id: String,
    pub body: String,
}

/// Addressable but not serializable.
#[derive(Debug, Clone, Default, PartialEq, Record)]
#[record(namespace = "blobs", opaque)]
pub struct Blob {
    pub id: String,
}
