//! Recognized object content kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Content kind of an object, derived from its file extension.
///
/// Objects whose extension maps to none of these are skipped before any
/// content is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain text, `.txt`.
    #[strum(serialize = "txt")]
    #[serde(rename = "txt")]
    Text,
    /// Markdown, `.md`.
    #[strum(serialize = "md")]
    #[serde(rename = "md")]
    Markdown,
    /// JSON document, `.json`.
    Json,
    /// Comma-separated values, `.csv`.
    Csv,
}

impl ContentKind {
    /// Detects the kind from an object key or file name.
    ///
    /// Only the text after the last `.` counts, compared case-insensitively.
    /// Keys without a `.` are unsupported.
    pub fn from_key(key: &str) -> Option<Self> {
        let (_, extension) = key.rsplit_once('.')?;
        Self::from_str(&extension.to_ascii_lowercase()).ok()
    }

    /// Returns the file extension of this kind, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Returns the MIME type used when rewriting objects of this kind.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Returns `true` if a byte prefix of the object can still be decoded.
    ///
    /// A cut JSON document does not parse, so JSON is always read whole.
    #[must_use]
    pub fn supports_partial_read(&self) -> bool {
        !matches!(self, Self::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_extensions() {
        assert_eq!(ContentKind::from_key("notes.txt"), Some(ContentKind::Text));
        assert_eq!(
            ContentKind::from_key("docs/README.MD"),
            Some(ContentKind::Markdown)
        );
        assert_eq!(
            ContentKind::from_key("a/b/data.v2.json"),
            Some(ContentKind::Json)
        );
        assert_eq!(ContentKind::from_key("table.Csv"), Some(ContentKind::Csv));
    }

    #[test]
    fn rejects_unsupported() {
        assert_eq!(ContentKind::from_key("image.png"), None);
        assert_eq!(ContentKind::from_key("Makefile"), None);
        assert_eq!(ContentKind::from_key("archive.tar.gz"), None);
        assert_eq!(ContentKind::from_key("trailing."), None);
    }

    #[test]
    fn display_uses_extension() {
        assert_eq!(ContentKind::Text.to_string(), "txt");
        assert_eq!(ContentKind::Markdown.as_ref(), "md");
        assert_eq!(ContentKind::Json.extension(), "json");
        assert!(!ContentKind::Json.supports_partial_read());
        assert!(ContentKind::Csv.supports_partial_read());
    }
}
