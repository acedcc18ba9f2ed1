//! In-memory backend for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use cloudtag_core::content::ContentKind;
use cloudtag_core::tags::Tags;
use cloudtag_core::{Error, Result};
use object_store::PutMode;
use object_store::memory::InMemory;
use tokio::sync::RwLock;

use crate::backend::StorageBackend;
use crate::client::{ObjectEntry, ObjectStoreClient};
use crate::location::StorageLocation;

/// Storage held in process memory, with native per-object tags.
///
/// The location's kind decides which tag limits apply, so the same backend
/// can stand in for any provider.
pub struct MemoryBackend {
    client: ObjectStoreClient,
    tags: RwLock<HashMap<String, Tags>>,
    location: StorageLocation,
    reject_tag_writes: AtomicBool,
}

impl MemoryBackend {
    /// Provider identifier.
    pub const ID: &str = "memory";

    /// Creates an empty backend bound to `location`.
    pub fn new(location: StorageLocation) -> Self {
        Self {
            client: ObjectStoreClient::new(InMemory::new()),
            tags: RwLock::new(HashMap::new()),
            location,
            reject_tag_writes: AtomicBool::new(false),
        }
    }

    /// Stores an object.
    pub async fn put_object(&self, key: &str, data: impl Into<Bytes>) -> Result<()> {
        let content_type = ContentKind::from_key(key).map(|kind| kind.mime_type());
        self.client
            .put_opts(key, data.into(), PutMode::Overwrite, content_type, &Tags::new())
            .await
    }

    /// Stores an object together with its tags.
    pub async fn put_object_with_tags(
        &self,
        key: &str,
        data: impl Into<Bytes>,
        tags: Tags,
    ) -> Result<()> {
        self.put_object(key, data).await?;
        self.tags.write().await.insert(key.to_owned(), tags);
        Ok(())
    }

    /// Returns the tags stored for `key`, if any were ever written.
    pub async fn tags_of(&self, key: &str) -> Option<Tags> {
        self.tags.read().await.get(key).cloned()
    }

    /// Makes every later tag write fail with a storage error.
    pub fn reject_tag_writes(&self, reject: bool) {
        self.reject_tag_writes.store(reject, Ordering::Relaxed);
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    fn provider_name(&self) -> &'static str {
        Self::ID
    }

    fn location(&self) -> &StorageLocation {
        &self.location
    }

    async fn list_objects(&self) -> Result<Vec<ObjectEntry>> {
        self.client.list(self.location.prefix()).await
    }

    async fn get_content(
        &self,
        object: &ObjectEntry,
        kind: ContentKind,
        max_bytes: usize,
    ) -> Result<Bytes> {
        self.client.read_content(object, kind, max_bytes).await
    }

    async fn get_tags(&self, key: &str) -> Result<Tags> {
        Ok(self.tags_of(key).await.unwrap_or_default())
    }

    async fn set_tags(&self, key: &str, tags: &Tags) -> Result<()> {
        if self.reject_tag_writes.load(Ordering::Relaxed) {
            return Err(Error::storage().with_message(format!("Tag write rejected for '{key}'")));
        }
        // Fails for keys that were never stored.
        self.client.metadata(key).await?;
        self.tags.write().await.insert(key.to_owned(), tags.clone());
        Ok(())
    }
}
