//! Listing entries returned by [`ObjectStoreClient::list`](super::ObjectStoreClient::list).

use object_store::ObjectMeta;
use serde::{Deserialize, Serialize};

/// An object found while enumerating a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key, exactly as stored in the bucket.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

impl ObjectEntry {
    /// Creates an entry for `key` with the given size.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

impl From<ObjectMeta> for ObjectEntry {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: meta.location.as_ref().to_owned(),
            size: meta.size,
        }
    }
}
