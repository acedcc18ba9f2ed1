//! Unified object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` that provides the operations the tagging pipeline
//! needs: listing, prefix reads, metadata reads and conditional rewrites.
//! Every public method is instrumented with [`tracing`].

use std::sync::Arc;

use bytes::Bytes;
use cloudtag_core::content::ContentKind;
use cloudtag_core::tags::Tags;
use cloudtag_core::{Error, Result};
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, GetOptions, GetResult, ObjectMeta, ObjectStore, PutMode, PutOptions,
    PutPayload, UpdateVersion,
};

use crate::TRACING_TARGET_CLIENT;

mod get_output;
mod object_entry;

pub use get_output::GetOutput;
pub use object_entry::ObjectEntry;

/// Key probed by [`ObjectStoreClient::verify_reachable`].
const PROBE_KEY: &str = "_cloudtag_verify_probe";

/// Cloneable handle to any [`ObjectStore`] backend (S3, Azure, GCS, ...).
///
/// All methods accept object keys as stored in the bucket and parse them
/// into [`object_store::path::Path`] without re-encoding, so a key returned
/// by [`list`](Self::list) addresses the same object on every later call.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Verify that the backing store is reachable.
    ///
    /// Issues a HEAD for a probe key. A not-found response means the bucket
    /// answered, any other error is propagated.
    #[tracing::instrument(name = "object.verify", skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn verify_reachable(&self) -> Result<()> {
        match self.0.head(&Path::from(PROBE_KEY)).await {
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(from_object_store("verify", PROBE_KEY, e)),
        }
    }

    /// List every object under `prefix`, skipping folder placeholders.
    #[tracing::instrument(name = "object.list", skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>> {
        let path = if prefix.is_empty() {
            None
        } else {
            Some(object_path(prefix)?)
        };
        let metas: Vec<ObjectMeta> = self
            .0
            .list(path.as_ref())
            .try_collect()
            .await
            .map_err(|e| from_object_store("list", prefix, e))?;

        let entries: Vec<ObjectEntry> = metas
            .iter()
            .filter(|meta| !is_folder_marker(meta, path.as_ref(), &metas))
            .cloned()
            .map(ObjectEntry::from)
            .collect();
        tracing::debug!(target: TRACING_TARGET_CLIENT, count = entries.len(), "Listed objects");
        Ok(entries)
    }

    /// Read the content of `object` that decoding needs.
    ///
    /// Kinds that can be decoded from a prefix are read up to `max_bytes`
    /// with a range request. JSON, and any object no larger than the budget,
    /// is read whole.
    #[tracing::instrument(
        name = "object.read_content",
        skip(self, object),
        fields(key = %object.key, size = object.size),
        target = TRACING_TARGET_CLIENT,
    )]
    pub async fn read_content(
        &self,
        object: &ObjectEntry,
        kind: ContentKind,
        max_bytes: usize,
    ) -> Result<Bytes> {
        let budget = u64::try_from(max_bytes).unwrap_or(u64::MAX);
        if !kind.supports_partial_read() || object.size <= budget {
            return Ok(self.get(&object.key).await?.data);
        }

        let path = object_path(&object.key)?;
        self.0
            .get_range(&path, 0..budget)
            .await
            .map_err(|e| from_object_store("read", &object.key, e))
    }

    /// Retrieve the bytes, content-type and metadata stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn get(&self, key: &str) -> Result<GetOutput> {
        let path = object_path(key)?;
        let result = self
            .0
            .get(&path)
            .await
            .map_err(|e| from_object_store("get", key, e))?;
        let (content_type, metadata) = split_attributes(&result);
        let meta = result.meta.clone();
        let data = result
            .bytes()
            .await
            .map_err(|e| from_object_store("get", key, e))?;
        Ok(GetOutput {
            data,
            content_type,
            metadata,
            meta,
        })
    }

    /// Read the user-defined metadata of `key` without downloading the body.
    #[tracing::instrument(name = "object.metadata", skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn metadata(&self, key: &str) -> Result<Tags> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let path = object_path(key)?;
        let result = self
            .0
            .get_opts(&path, options)
            .await
            .map_err(|e| from_object_store("head", key, e))?;
        Ok(split_attributes(&result).1)
    }

    /// Upload `data` to `key` with the specified [`PutMode`], content-type
    /// and user-defined metadata.
    #[tracing::instrument(
        name = "object.put_opts",
        skip(self, data, metadata),
        fields(size = data.len()),
        target = TRACING_TARGET_CLIENT,
    )]
    pub async fn put_opts(
        &self,
        key: &str,
        data: Bytes,
        mode: PutMode,
        content_type: Option<&str>,
        metadata: &Tags,
    ) -> Result<()> {
        let mut attributes = Attributes::new();
        if let Some(ct) = content_type {
            attributes.insert(Attribute::ContentType, ct.to_owned().into());
        }
        for (name, value) in metadata {
            attributes.insert(Attribute::Metadata(name.clone().into()), value.clone().into());
        }
        let opts = PutOptions {
            mode,
            attributes,
            ..Default::default()
        };
        let path = object_path(key)?;
        self.0
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(|e| from_object_store("put", key, e))?;
        Ok(())
    }

    /// Rewrite `key` in place with the same content and new metadata.
    ///
    /// The write is conditional on the object version that was read, so a
    /// concurrent change makes it fail instead of being overwritten.
    #[tracing::instrument(name = "object.replace_metadata", skip(self, metadata), target = TRACING_TARGET_CLIENT)]
    pub async fn replace_metadata(&self, key: &str, metadata: &Tags) -> Result<()> {
        let current = self.get(key).await?;
        let content_type = current.content_type.or_else(|| {
            ContentKind::from_key(key).map(|kind| kind.mime_type().to_owned())
        });
        let mode = PutMode::Update(UpdateVersion {
            e_tag: current.meta.e_tag,
            version: current.meta.version,
        });
        self.put_opts(key, current.data, mode, content_type.as_deref(), metadata)
            .await
    }
}

/// Parses `key` as stored, leaving `%` and non-ASCII characters untouched.
///
/// Keys with an empty segment (`a//b.txt`) cannot be represented and are
/// rejected.
fn object_path(key: &str) -> Result<Path> {
    Path::parse(key).map_err(|e| {
        Error::storage()
            .with_message(format!("Invalid object key '{key}': {e}"))
            .with_source(e)
    })
}

/// A zero-byte object is a folder placeholder when it names the listed
/// prefix itself or an ancestor of another listed object.
fn is_folder_marker(meta: &ObjectMeta, prefix: Option<&Path>, listing: &[ObjectMeta]) -> bool {
    if meta.size != 0 {
        return false;
    }
    prefix == Some(&meta.location)
        || listing.iter().any(|other| {
            other.location != meta.location && other.location.prefix_matches(&meta.location)
        })
}

fn split_attributes(result: &GetResult) -> (Option<String>, Tags) {
    let mut content_type = None;
    let mut metadata = Tags::new();
    for (attribute, value) in result.attributes.iter() {
        match attribute {
            Attribute::ContentType => content_type = Some(value.to_string()),
            Attribute::Metadata(name) => {
                metadata.insert(name.to_string(), value.to_string());
            }
            _ => {}
        }
    }
    (content_type, metadata)
}

/// Convert an [`object_store::Error`] into a storage [`Error`].
fn from_object_store(op: &str, key: &str, err: object_store::Error) -> Error {
    Error::storage()
        .with_message(format!("{op} failed for '{key}': {err}"))
        .with_source(err)
}
