//! Convenience re-exports.

#[cfg(any(test, feature = "test-utils"))]
pub use crate::mock::MockLanguageModel;
pub use crate::model::{LanguageModel, LlmInfo};
pub use crate::provider::{API_KEY_ENV, CompletionProvider, LlmKind};
