//! Storage location strings such as `s3://bucket/prefix`.

use std::fmt;
use std::str::FromStr;

use cloudtag_core::schema::StorageKind;
use cloudtag_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// A bucket or container, plus an optional directory prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    kind: StorageKind,
    bucket: String,
    prefix: String,
}

impl StorageLocation {
    /// Creates a location without going through string parsing.
    pub fn new(kind: StorageKind, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            bucket: bucket.into(),
            prefix: prefix.into().trim_matches('/').to_owned(),
        }
    }

    /// Parses a location string, inferring the backend from its scheme.
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location).map_err(|e| {
            Error::configuration()
                .with_message(format!("Invalid storage location '{location}': {e}"))
                .with_source(e)
        })?;

        let kind = StorageKind::from_scheme(url.scheme()).ok_or_else(|| {
            Error::configuration().with_message(format!(
                "Unsupported storage scheme '{}' in '{location}', expected s3://, az:// or gs://",
                url.scheme()
            ))
        })?;

        let bucket = url.host_str().unwrap_or_default();
        if bucket.is_empty() {
            return Err(Error::configuration()
                .with_message(format!("Invalid storage location '{location}': missing bucket name")));
        }

        Ok(Self::new(kind, bucket, url.path()))
    }

    /// Parses a location string and checks that it belongs to `kind`.
    pub fn parse_for(kind: StorageKind, location: &str) -> Result<Self> {
        let parsed = Self::parse(location)?;
        if parsed.kind != kind {
            return Err(Error::configuration().with_message(format!(
                "Storage location '{location}' does not match the {kind} backend, expected a {}:// location",
                kind.scheme()
            )));
        }
        Ok(parsed)
    }

    /// Backend family of this location.
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Bucket or container name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Directory prefix without leading or trailing `/`, possibly empty.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl FromStr for StorageLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.kind.scheme(), self.bucket)?;
        if !self.prefix.is_empty() {
            write!(f, "/{}", self.prefix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudtag_core::ErrorKind;

    #[test]
    fn parses_bucket_and_prefix() {
        let loc = StorageLocation::parse("s3://my-bucket/reports/2024/").unwrap();
        assert_eq!(loc.kind(), StorageKind::Aws);
        assert_eq!(loc.bucket(), "my-bucket");
        assert_eq!(loc.prefix(), "reports/2024");
        assert_eq!(loc.to_string(), "s3://my-bucket/reports/2024");
    }

    #[test]
    fn bucket_only() {
        let loc: StorageLocation = "gs://archive".parse().unwrap();
        assert_eq!(loc.kind(), StorageKind::Gcp);
        assert_eq!(loc.prefix(), "");
        assert_eq!(loc.to_string(), "gs://archive");

        let loc = StorageLocation::parse("az://container/").unwrap();
        assert_eq!(loc.kind(), StorageKind::Azure);
        assert_eq!(loc.bucket(), "container");
    }

    #[test]
    fn rejects_bad_locations() {
        for location in ["bucket", "http://bucket", "s3://", "s3:///prefix"] {
            let err = StorageLocation::parse(location).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{location}");
        }
    }

    #[test]
    fn scheme_must_match_kind() {
        assert!(StorageLocation::parse_for(StorageKind::Aws, "s3://b").is_ok());
        let err = StorageLocation::parse_for(StorageKind::Gcp, "s3://b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
