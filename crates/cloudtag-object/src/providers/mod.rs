//! Storage backends for each supported provider.

use std::sync::Arc;

use cloudtag_core::schema::StorageKind;
use cloudtag_core::{Error, Result};

use crate::TRACING_TARGET_BACKEND;
use crate::backend::StorageBackend;
use crate::client::ObjectStoreClient;
use crate::location::StorageLocation;

mod azure;
mod gcs;
mod memory;
mod s3;

pub use azure::{AzureBackend, AzureCredentials};
pub use gcs::{GcsBackend, GcsCredentials};
pub use memory::MemoryBackend;
pub use s3::{S3Backend, S3Credentials};

/// Connects to the backend `location` belongs to, reading credentials from
/// the process environment.
///
/// Missing credentials and a failed reachability probe are both
/// configuration errors.
pub async fn connect(location: &StorageLocation) -> Result<Arc<dyn StorageBackend>> {
    let lookup = |name: &str| std::env::var(name).ok();
    let backend: Arc<dyn StorageBackend> = match location.kind() {
        StorageKind::Aws => {
            let creds = S3Credentials::from_lookup(lookup)?;
            Arc::new(S3Backend::connect(location.clone(), &creds).await?)
        }
        StorageKind::Azure => {
            let creds = AzureCredentials::from_lookup(lookup)?;
            Arc::new(AzureBackend::connect(location.clone(), &creds).await?)
        }
        StorageKind::Gcp => {
            let creds = GcsCredentials::from_lookup(lookup)?;
            Arc::new(GcsBackend::connect(location.clone(), &creds).await?)
        }
    };
    tracing::info!(
        target: TRACING_TARGET_BACKEND,
        info = %backend.storage_info(),
        "Connected to storage backend",
    );
    Ok(backend)
}

/// Reads a required variable through `lookup`.
fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            Error::configuration()
                .with_message(format!("Missing required environment variable: {name}"))
        })
}

/// Reads an optional variable through `lookup`, treating blank as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Probes the bucket, turning any failure into a configuration error.
async fn verified(client: ObjectStoreClient, provider: &str) -> Result<ObjectStoreClient> {
    client.verify_reachable().await.map_err(|e| {
        tracing::error!(target: TRACING_TARGET_BACKEND, provider, error = %e, "Storage backend unreachable");
        Error::configuration()
            .with_message(format!("Storage backend '{provider}' is unavailable: {}", e.detail()))
            .with_source(e)
    })?;
    Ok(client)
}

fn build_error(provider: &str, err: object_store::Error) -> Error {
    Error::configuration()
        .with_message(format!("Failed to configure {provider} client: {err}"))
        .with_source(err)
}
