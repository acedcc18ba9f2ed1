//! Azure Blob Storage backend using [`object_store::azure::MicrosoftAzureBuilder`].
//!
//! Blob index tags are not exposed through this client, so reading tags
//! always yields an empty mapping and writing them is accepted without
//! effect.

use bytes::Bytes;
use cloudtag_core::content::ContentKind;
use cloudtag_core::tags::Tags;
use cloudtag_core::{Error, Result};
use object_store::azure::MicrosoftAzureBuilder;

use super::{build_error, required, verified};
use crate::TRACING_TARGET_BACKEND;
use crate::backend::StorageBackend;
use crate::client::{ObjectEntry, ObjectStoreClient};
use crate::location::StorageLocation;

/// Credentials parsed from an Azure storage connection string.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AzureCredentials {
    /// Storage account name.
    pub account_name: Option<String>,
    /// Storage account access key.
    pub access_key: Option<String>,
    /// Shared Access Signature token, without the leading `?`.
    pub sas_token: Option<String>,
    /// Blob service endpoint.
    pub endpoint: Option<String>,
    /// Whether the connection string targets the local storage emulator.
    pub use_emulator: bool,
}

impl AzureCredentials {
    /// Reads `AZURE_STORAGE_CONNECTION_STRING`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection_string = required(&lookup, "AZURE_STORAGE_CONNECTION_STRING")?;
        Self::from_connection_string(&connection_string)
    }

    /// Parses a `Key=Value;Key=Value` connection string in account-key,
    /// SAS or emulator form.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut creds = Self::default();
        let mut protocol = None;
        let mut suffix = None;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = part.split_once('=') else {
                return Err(Error::configuration()
                    .with_message(format!("Malformed connection string segment '{part}'")));
            };
            let value = value.to_owned();
            match name {
                "AccountName" => creds.account_name = Some(value),
                "AccountKey" => creds.access_key = Some(value),
                "SharedAccessSignature" => {
                    creds.sas_token = Some(value.trim_start_matches('?').to_owned())
                }
                "BlobEndpoint" => creds.endpoint = Some(value),
                "DefaultEndpointsProtocol" => protocol = Some(value),
                "EndpointSuffix" => suffix = Some(value),
                "UseDevelopmentStorage" => creds.use_emulator = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if creds.endpoint.is_none() {
            if let (Some(account), Some(suffix)) = (&creds.account_name, &suffix) {
                let protocol = protocol.as_deref().unwrap_or("https");
                creds.endpoint = Some(format!("{protocol}://{account}.blob.{suffix}"));
            }
        }

        if !creds.use_emulator && creds.account_name.is_none() {
            return Err(Error::configuration()
                .with_message("Azure connection string has no AccountName"));
        }
        if !creds.use_emulator && creds.access_key.is_none() && creds.sas_token.is_none() {
            return Err(Error::configuration()
                .with_message("Azure connection string has neither AccountKey nor SharedAccessSignature"));
        }
        Ok(creds)
    }

    fn sas_pairs(&self) -> Option<Vec<(String, String)>> {
        let sas = self.sas_token.as_deref()?;
        Some(url::form_urlencoded::parse(sas.as_bytes()).into_owned().collect())
    }
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("account_name", &self.account_name)
            .field("endpoint", &self.endpoint)
            .field("use_emulator", &self.use_emulator)
            .finish_non_exhaustive()
    }
}

/// Azure Blob Storage-backed storage without tag support.
pub struct AzureBackend {
    client: ObjectStoreClient,
    location: StorageLocation,
}

impl AzureBackend {
    /// Provider identifier.
    pub const ID: &str = "azure";

    /// Builds the client and probes the container.
    pub async fn connect(location: StorageLocation, creds: &AzureCredentials) -> Result<Self> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_container_name(location.bucket())
            .with_use_emulator(creds.use_emulator);

        if let Some(account) = &creds.account_name {
            builder = builder.with_account(account);
        }

        if let Some(key) = &creds.access_key {
            builder = builder.with_access_key(key);
        }

        if let Some(pairs) = creds.sas_pairs() {
            builder = builder.with_sas_authorization(pairs);
        }

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let store = builder.build().map_err(|e| build_error(Self::ID, e))?;
        let client = verified(ObjectStoreClient::new(store), Self::ID).await?;
        Ok(Self { client, location })
    }
}

#[async_trait::async_trait]
impl StorageBackend for AzureBackend {
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

    async fn get_tags(&self, _key: &str) -> Result<Tags> {
        Ok(Tags::new())
    }

    async fn set_tags(&self, key: &str, tags: &Tags) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET_BACKEND,
            key,
            count = tags.len(),
            "Azure backend does not store object tags, skipping write",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_connection_string() {
        let creds = AzureCredentials::from_connection_string(
            "DefaultEndpointsProtocol=https;AccountName=acme;AccountKey=a2V5==;EndpointSuffix=core.windows.net",
        )
        .unwrap();
        assert_eq!(creds.account_name.as_deref(), Some("acme"));
        assert_eq!(creds.access_key.as_deref(), Some("a2V5=="));
        assert_eq!(
            creds.endpoint.as_deref(),
            Some("https://acme.blob.core.windows.net")
        );
        assert!(!format!("{creds:?}").contains("a2V5"));
    }

    #[test]
    fn sas_connection_string() {
        let creds = AzureCredentials::from_connection_string(
            "BlobEndpoint=https://acme.blob.core.windows.net/;AccountName=acme;SharedAccessSignature=?sv=2022-11-02&sig=abc%3D",
        )
        .unwrap();
        assert_eq!(
            creds.sas_pairs().unwrap(),
            vec![
                ("sv".to_string(), "2022-11-02".to_string()),
                ("sig".to_string(), "abc=".to_string()),
            ]
        );
        assert_eq!(
            creds.endpoint.as_deref(),
            Some("https://acme.blob.core.windows.net/")
        );
    }

    #[test]
    fn emulator_connection_string() {
        let creds = AzureCredentials::from_connection_string("UseDevelopmentStorage=true").unwrap();
        assert!(creds.use_emulator);
    }

    #[test]
    fn rejects_incomplete_connection_strings() {
        assert!(AzureCredentials::from_connection_string("AccountName=acme").is_err());
        assert!(AzureCredentials::from_connection_string("AccountKey=abc").is_err());
        assert!(AzureCredentials::from_connection_string("garbage").is_err());
        assert!(AzureCredentials::from_lookup(|_| None).is_err());
    }
}
