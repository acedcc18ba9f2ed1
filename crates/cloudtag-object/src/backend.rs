//! The storage interface the tagging pipeline runs against.

use std::fmt;

use bytes::Bytes;
use cloudtag_core::Result;
use cloudtag_core::content::ContentKind;
use cloudtag_core::schema::StorageKind;
use cloudtag_core::tags::Tags;
use serde::{Deserialize, Serialize};

use crate::client::ObjectEntry;
use crate::location::StorageLocation;

/// A bucket the tagger can enumerate, read and tag.
///
/// Each backend realizes tags its own way: native object tags, custom object
/// metadata, or not at all. Callers only see the [`Tags`] mapping.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short provider identifier, such as `"aws"` or `"memory"`.
    fn provider_name(&self) -> &'static str;

    /// The bucket and prefix this backend is bound to.
    fn location(&self) -> &StorageLocation;

    /// Backend family, which selects the tag limits.
    fn kind(&self) -> StorageKind {
        self.location().kind()
    }

    /// Describes the provider and bucket.
    fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            provider: self.provider_name().to_owned(),
            bucket: self.location().bucket().to_owned(),
            prefix: self.location().prefix().to_owned(),
        }
    }

    /// Lists every object under the location prefix.
    async fn list_objects(&self) -> Result<Vec<ObjectEntry>>;

    /// Reads as much of `object` as decoding `kind` within `max_bytes` needs.
    async fn get_content(
        &self,
        object: &ObjectEntry,
        kind: ContentKind,
        max_bytes: usize,
    ) -> Result<Bytes>;

    /// Returns the tags currently on `key`.
    async fn get_tags(&self, key: &str) -> Result<Tags>;

    /// Replaces the tags on `key` with `tags`.
    async fn set_tags(&self, key: &str, tags: &Tags) -> Result<()>;
}

/// Provider and bucket a backend is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Provider identifier.
    pub provider: String,
    /// Bucket or container name.
    pub bucket: String,
    /// Directory prefix, possibly empty.
    pub prefix: String,
}

impl fmt::Display for StorageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bucket '{}'", self.provider, self.bucket)?;
        if !self.prefix.is_empty() {
            write!(f, " (prefix '{}')", self.prefix)?;
        }
        Ok(())
    }
}
