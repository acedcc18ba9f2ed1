//! Convenience re-exports.

pub use crate::backend::{StorageBackend, StorageInfo};
pub use crate::client::{GetOutput, ObjectEntry, ObjectStoreClient};
pub use crate::location::StorageLocation;
pub use crate::providers::{
    AzureBackend, AzureCredentials, GcsBackend, GcsCredentials, MemoryBackend, S3Backend,
    S3Credentials, connect,
};
