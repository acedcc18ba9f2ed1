//! Result type for [`ObjectStoreClient::get`](super::ObjectStoreClient::get).

use bytes::Bytes;
use cloudtag_core::tags::Tags;
use object_store::ObjectMeta;

/// Result of a successful [`ObjectStoreClient::get`](super::ObjectStoreClient::get) call.
#[derive(Debug)]
pub struct GetOutput {
    /// Raw bytes of the retrieved object.
    pub data: Bytes,
    /// MIME content-type, if the backend provides one.
    pub content_type: Option<String>,
    /// User-defined metadata stored with the object.
    pub metadata: Tags,
    /// Object metadata (size, etag, version, location).
    pub meta: ObjectMeta,
}
