//! S3 backend: content through [`object_store::aws::AmazonS3Builder`], tags
//! through the S3 object tagging API.
//!
//! Works with AWS S3 and S3-compatible services such as MinIO.

use std::collections::HashMap;

use bytes::Bytes;
use cloudtag_core::content::ContentKind;
use cloudtag_core::tags::Tags;
use cloudtag_core::{Error, Result};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use minio::s3::types::S3Api;
use object_store::aws::AmazonS3Builder;

use super::{build_error, optional, required, verified};
use crate::TRACING_TARGET_BACKEND;
use crate::backend::StorageBackend;
use crate::client::{ObjectEntry, ObjectStoreClient};
use crate::location::StorageLocation;

/// Static credentials for S3.
#[derive(Clone)]
pub struct S3Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region of the bucket.
    pub region: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// Endpoint URL for S3-compatible services.
    pub endpoint: Option<String>,
}

impl S3Credentials {
    /// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_REGION`,
    /// plus the optional `AWS_SESSION_TOKEN` and `AWS_ENDPOINT_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_key_id: required(&lookup, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: required(&lookup, "AWS_SECRET_ACCESS_KEY")?,
            region: required(&lookup, "AWS_REGION")?,
            session_token: optional(&lookup, "AWS_SESSION_TOKEN"),
            endpoint: optional(&lookup, "AWS_ENDPOINT_URL"),
        })
    }

    fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://s3.{}.amazonaws.com", self.region),
        }
    }
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// S3-backed storage with native object tags.
pub struct S3Backend {
    client: ObjectStoreClient,
    tagging: minio::s3::Client,
    location: StorageLocation,
}

impl S3Backend {
    /// Provider identifier.
    pub const ID: &str = "aws";

    /// Builds both clients and probes the bucket.
    pub async fn connect(location: StorageLocation, creds: &S3Credentials) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(location.bucket())
            .with_region(&creds.region)
            .with_access_key_id(&creds.access_key_id)
            .with_secret_access_key(&creds.secret_access_key);

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }

        let store = builder.build().map_err(|e| build_error(Self::ID, e))?;
        let client = verified(ObjectStoreClient::new(store), Self::ID).await?;

        let tagging = tagging_client(creds)?;

        Ok(Self {
            client,
            tagging,
            location,
        })
    }
}

/// Builds the client used for the object tagging API.
fn tagging_client(creds: &S3Credentials) -> Result<minio::s3::Client> {
    let base_url: BaseUrl = creds.base_url().parse().map_err(|e| {
        Error::configuration()
            .with_message(format!("Invalid S3 endpoint '{}': {e}", creds.base_url()))
    })?;
    let provider = StaticProvider::new(
        &creds.access_key_id,
        &creds.secret_access_key,
        creds.session_token.as_deref(),
    );
    minio::s3::Client::new(base_url, Some(Box::new(provider)), None, None).map_err(|e| {
        Error::configuration()
            .with_message(format!("Failed to build S3 tagging client: {e}"))
            .with_source(e)
    })
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
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

    #[tracing::instrument(name = "s3.get_tags", skip(self), target = TRACING_TARGET_BACKEND)]
    async fn get_tags(&self, key: &str) -> Result<Tags> {
        let response = self
            .tagging
            .get_object_tagging(self.location.bucket(), key)
            .send()
            .await
            .map_err(|e| {
                Error::storage()
                    .with_message(format!("Failed to read tags of '{key}': {e}"))
                    .with_source(e)
            })?;
        Ok(response.tags.into_iter().collect())
    }

    #[tracing::instrument(name = "s3.set_tags", skip(self, tags), fields(count = tags.len()), target = TRACING_TARGET_BACKEND)]
    async fn set_tags(&self, key: &str, tags: &Tags) -> Result<()> {
        let tags: HashMap<String, String> = tags.clone().into_iter().collect();
        self.tagging
            .put_object_tagging(self.location.bucket(), key)
            .tags(tags)
            .send()
            .await
            .map_err(|e| {
                Error::storage()
                    .with_message(format!("Failed to write tags of '{key}': {e}"))
                    .with_source(e)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cloudtag_core::schema::StorageKind;
    use object_store::memory::InMemory;

    use super::*;

    fn env(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn credentials_from_environment() {
        let creds = S3Credentials::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_REGION", "eu-west-1"),
        ]))
        .unwrap();
        assert_eq!(creds.region, "eu-west-1");
        assert!(creds.session_token.is_none());
        assert_eq!(creds.base_url(), "https://s3.eu-west-1.amazonaws.com");
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn endpoint_override() {
        let creds = S3Credentials::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
            ("AWS_REGION", "us-east-1"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
        ]))
        .unwrap();
        assert_eq!(creds.base_url(), "http://localhost:9000");
    }

    #[test]
    fn missing_variable_is_configuration_error() {
        let err = S3Credentials::from_lookup(env(&[("AWS_ACCESS_KEY_ID", "AKIA")])).unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Configuration);
        assert!(err.detail().contains("AWS_SECRET_ACCESS_KEY"));
    }

    /// Backend whose tagging endpoint refuses connections.
    fn unreachable_backend() -> S3Backend {
        let creds = S3Credentials::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
            ("AWS_REGION", "us-east-1"),
            ("AWS_ENDPOINT_URL", "http://127.0.0.1:1"),
        ]))
        .unwrap();
        S3Backend {
            client: ObjectStoreClient::new(InMemory::new()),
            tagging: tagging_client(&creds).unwrap(),
            location: StorageLocation::new(StorageKind::Aws, "bucket", "docs"),
        }
    }

    #[test]
    fn invalid_endpoint_is_configuration_error() {
        let creds = S3Credentials::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
            ("AWS_REGION", "us-east-1"),
            ("AWS_ENDPOINT_URL", "not a url"),
        ]))
        .unwrap();
        let err = tagging_client(&creds).unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Configuration);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tag_requests_surface_storage_errors() {
        let backend = unreachable_backend();

        let err = backend.get_tags("docs/a.txt").await.unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Storage);
        assert!(err.detail().starts_with("Failed to read tags of 'docs/a.txt'"));

        let tags: Tags = [("team".to_string(), "ops".to_string())].into();
        let err = backend.set_tags("docs/a.txt", &tags).await.unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Storage);
        assert!(err.detail().starts_with("Failed to write tags of 'docs/a.txt'"));
    }
}
