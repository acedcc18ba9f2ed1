//! The language model interface used by the tagger.

use std::fmt;

use cloudtag_core::Result;
use serde::{Deserialize, Serialize};

/// A model that turns one prompt into one text completion.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider identifier, such as `"openai"`.
    fn provider_name(&self) -> &str;

    /// Model identifier sent to the provider.
    fn model_name(&self) -> &str;

    /// Describes the provider and model.
    fn llm_info(&self) -> LlmInfo {
        LlmInfo {
            provider: self.provider_name().to_owned(),
            model: self.model_name().to_owned(),
        }
    }

    /// Sends `prompt` and returns the completion text.
    ///
    /// A blank completion is an error.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Provider and model a [`LanguageModel`] talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmInfo {
    /// Provider identifier.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

impl fmt::Display for LlmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.provider, self.model)
    }
}
