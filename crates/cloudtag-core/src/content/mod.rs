//! Object content: kind detection, decoding and truncation.

mod decode;
mod kind;

pub use decode::{decode_content, truncate_utf8};
pub use kind::ContentKind;

/// Default byte budget for decoded content sent to the model.
pub const DEFAULT_MAX_BYTES: usize = 5000;

/// Decodes `bytes` as `kind` and truncates the result to `max_bytes`.
pub fn prepare_content(bytes: &[u8], kind: ContentKind, max_bytes: usize) -> crate::Result<String> {
    let decoded = decode_content(bytes, kind)?;
    Ok(truncate_utf8(&decoded, max_bytes).to_owned())
}
