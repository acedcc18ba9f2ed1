//! Google Cloud Storage backend using [`object_store::gcp::GoogleCloudStorageBuilder`].
//!
//! GCS has no object tags; they are kept as custom object metadata instead.
//! Metadata can only change by rewriting the object, which is done in place
//! and guarded by the object generation that was read.

use bytes::Bytes;
use cloudtag_core::Result;
use cloudtag_core::content::ContentKind;
use cloudtag_core::tags::Tags;
use object_store::gcp::GoogleCloudStorageBuilder;

use super::{build_error, required, verified};
use crate::backend::StorageBackend;
use crate::client::{ObjectEntry, ObjectStoreClient};
use crate::location::StorageLocation;

/// Service-account credentials for GCS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsCredentials {
    /// Path to a JSON service account key file.
    pub service_account_path: String,
}

impl GcsCredentials {
    /// Reads `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            service_account_path: required(&lookup, "GOOGLE_APPLICATION_CREDENTIALS")?,
        })
    }
}

/// Google Cloud Storage-backed storage with tags stored as metadata.
pub struct GcsBackend {
    client: ObjectStoreClient,
    location: StorageLocation,
}

impl GcsBackend {
    /// Provider identifier.
    pub const ID: &str = "gcp";

    /// Builds the client and probes the bucket.
    pub async fn connect(location: StorageLocation, creds: &GcsCredentials) -> Result<Self> {
        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(location.bucket())
            .with_service_account_path(&creds.service_account_path)
            .build()
            .map_err(|e| build_error(Self::ID, e))?;
        let client = verified(ObjectStoreClient::new(store), Self::ID).await?;
        Ok(Self { client, location })
    }
}

#[async_trait::async_trait]
impl StorageBackend for GcsBackend {
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
        self.client.metadata(key).await
    }

    async fn set_tags(&self, key: &str, tags: &Tags) -> Result<()> {
        self.client.replace_metadata(key, tags).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_from_environment() {
        let creds = GcsCredentials::from_lookup(|name| {
            (name == "GOOGLE_APPLICATION_CREDENTIALS").then(|| "/etc/sa.json".to_string())
        })
        .unwrap();
        assert_eq!(creds.service_account_path, "/etc/sa.json");
        assert!(GcsCredentials::from_lookup(|_| Some("  ".to_string())).is_err());
    }
}
