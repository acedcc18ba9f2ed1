//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur while tagging objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bad configuration, missing credentials or an unavailable backend.
    Configuration,
    /// A tag schema or a merged tag set violates backend limits.
    SchemaValidation,
    /// Object content could not be decoded for its declared kind.
    FileProcessing,
    /// The language model call failed or returned nothing usable.
    Llm,
    /// A storage enumeration, fetch or tag write failed.
    Storage,
    /// Anything else that went wrong during a run.
    Unexpected,
}

/// A structured error type for cloudtag operations.
#[derive(Debug, Error)]
#[error("{}{}", kind.as_ref(), message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new schema validation error.
    pub fn schema_validation() -> Self {
        Self::new(ErrorKind::SchemaValidation)
    }

    /// Creates a new file processing error.
    pub fn file_processing() -> Self {
        Self::new(ErrorKind::FileProcessing)
    }

    /// Creates a new language model error.
    pub fn llm() -> Self {
        Self::new(ErrorKind::Llm)
    }

    /// Creates a new storage error.
    pub fn storage() -> Self {
        Self::new(ErrorKind::Storage)
    }

    /// Creates a new unexpected error.
    pub fn unexpected() -> Self {
        Self::new(ErrorKind::Unexpected)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the message, or the kind name when no message was attached.
    pub fn detail(&self) -> &str {
        self.message.as_deref().unwrap_or_else(|| self.kind.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::schema_validation().with_message("Maximum 10 tags per object");
        assert_eq!(
            err.to_string(),
            "schema_validation: Maximum 10 tags per object"
        );
    }

    #[test]
    fn display_without_message() {
        assert_eq!(Error::llm().to_string(), "llm");
        assert_eq!(Error::llm().detail(), "llm");
    }

    #[test]
    fn source_is_preserved() {
        let io = std::io::Error::other("boom");
        let err = Error::storage().with_source(io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind_str(), "storage");
    }
}
