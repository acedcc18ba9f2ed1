//! Convenient re-exports for common use.

pub use crate::content::{ContentKind, DEFAULT_MAX_BYTES, prepare_content};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::prompt::PromptTemplate;
pub use crate::response::parse_completion;
pub use crate::schema::{StorageKind, TagField, TagLimits, TagSchema, validate_schema};
pub use crate::tags::{Tags, create_tag_mapping, merge_tags};
