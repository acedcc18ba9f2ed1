//! Per-backend tag limits.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

/// Storage backend family, which selects the tag limits and the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Object store with native per-object tags.
    Aws,
    /// Object store with container-level tags only.
    Azure,
    /// Object store whose tags are realized as blob metadata.
    Gcp,
}

impl StorageKind {
    /// Returns the tag limits of this backend.
    #[must_use]
    pub const fn limits(self) -> TagLimits {
        match self {
            Self::Aws | Self::Azure => TagLimits {
                max_tags: 10,
                max_key_len: 128,
                max_value_len: 256,
            },
            Self::Gcp => TagLimits {
                max_tags: 64,
                max_key_len: 128,
                max_value_len: 1024,
            },
        }
    }

    /// Looks up the backend whose location scheme is `scheme`.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.scheme().eq_ignore_ascii_case(scheme))
    }

    /// Returns the location scheme expected for this backend.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Aws => "s3",
            Self::Azure => "az",
            Self::Gcp => "gs",
        }
    }
}

/// Tag-count and tag-length limits of a storage backend.
///
/// Lengths are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLimits {
    /// Maximum number of tags on a single object.
    pub max_tags: usize,
    /// Maximum length of a tag key.
    pub max_key_len: usize,
    /// Maximum length of a tag value.
    pub max_value_len: usize,
}

impl TagLimits {
    /// Looks up the limits for a backend identifier such as `"aws"`.
    pub fn for_backend(backend: &str) -> Result<Self> {
        StorageKind::from_str(backend)
            .map(StorageKind::limits)
            .map_err(|_| {
                Error::schema_validation()
                    .with_message(format!("Unsupported storage provider: {backend}"))
            })
    }
}
