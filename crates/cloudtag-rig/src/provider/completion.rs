//! Rig-backed completion provider.

use std::sync::Arc;

use cloudtag_core::{Error, Result};
use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::{anthropic, gemini, openai};

use super::LlmKind;
use crate::TRACING_TARGET_COMPLETION;
use crate::model::LanguageModel;

/// Environment variable holding the API key for every provider.
pub const API_KEY_ENV: &str = "API_KEY";

/// System preamble sent with OpenAI requests.
const OPENAI_PREAMBLE: &str =
    "You are a helpful assistant that generates semantic tags for documents.";

/// Sampling temperature for tag generation.
const TEMPERATURE: f64 = 0.1;

/// Upper bound on completion length. A comma-separated value list is short.
const MAX_TOKENS: u64 = 1024;

/// Completion provider that wraps the rig model of the configured provider.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

enum CompletionService {
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    Anthropic {
        model: anthropic::completion::CompletionModel,
        model_name: String,
    },
    Gemini {
        model: gemini::completion::CompletionModel,
        model_name: String,
    },
}

impl CompletionProvider {
    /// Creates a provider for `kind`, using the kind's default model when
    /// `model` is `None`.
    pub fn new(kind: LlmKind, model: Option<&str>, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::configuration().with_message("API key must not be empty"));
        }
        let model_name = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(kind.default_model())
            .to_owned();
        let inner = match kind {
            LlmKind::OpenAi => {
                let client = openai::Client::new(api_key)
                    .map_err(|e| client_error(kind, e))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
            LlmKind::Anthropic => {
                let client = anthropic::Client::new(api_key).map_err(|e| client_error(kind, e))?;
                CompletionService::Anthropic {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
            LlmKind::Gemini => {
                let client = gemini::Client::new(api_key).map_err(|e| client_error(kind, e))?;
                CompletionService::Gemini {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_COMPLETION,
            provider = %kind,
            model = inner.model_name(),
            "Created completion provider",
        );
        Ok(Self(Arc::new(inner)))
    }

    /// Creates a provider reading the key from the `API_KEY` variable.
    pub fn from_env(kind: LlmKind, model: Option<&str>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration()
                    .with_message(format!("Missing required environment variable: {API_KEY_ENV}"))
            })?;
        Self::new(kind, model, &api_key)
    }

    /// Returns the provider family.
    pub fn kind(&self) -> LlmKind {
        match self.0.as_ref() {
            CompletionService::OpenAi { .. } => LlmKind::OpenAi,
            CompletionService::Anthropic { .. } => LlmKind::Anthropic,
            CompletionService::Gemini { .. } => LlmKind::Gemini,
        }
    }
}

impl CompletionService {
    fn model_name(&self) -> &str {
        match self {
            Self::OpenAi { model_name, .. }
            | Self::Anthropic { model_name, .. }
            | Self::Gemini { model_name, .. } => model_name,
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for CompletionProvider {
    fn provider_name(&self) -> &str {
        <&'static str>::from(self.kind())
    }

    fn model_name(&self) -> &str {
        self.0.model_name()
    }

    #[tracing::instrument(
        name = "llm.complete",
        skip(self, prompt),
        fields(prompt_len = prompt.len()),
        target = TRACING_TARGET_COMPLETION,
    )]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let kind = self.kind();
        let map_err = |e: CompletionError| {
            Error::llm()
                .with_message(format!("Failed to generate tags with {kind}: {e}"))
                .with_source(e)
        };

        let text = match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => model
                .completion_request(prompt)
                .preamble(OPENAI_PREAMBLE.to_owned())
                .temperature(TEMPERATURE)
                .max_tokens(MAX_TOKENS)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err)?,
            CompletionService::Anthropic { model, .. } => model
                .completion_request(prompt)
                .temperature(TEMPERATURE)
                .max_tokens(MAX_TOKENS)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err)?,
            CompletionService::Gemini { model, .. } => model
                .completion_request(prompt)
                .temperature(TEMPERATURE)
                .max_tokens(MAX_TOKENS)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err)?,
        };

        if text.trim().is_empty() {
            return Err(Error::llm().with_message(format!("Empty response from {kind}")));
        }
        tracing::debug!(target: TRACING_TARGET_COMPLETION, len = text.len(), "Received completion");
        Ok(text)
    }
}

fn client_error(kind: LlmKind, err: impl std::fmt::Display) -> Error {
    Error::configuration().with_message(format!("Failed to initialize {kind} client: {err}"))
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.kind())
            .field("model", &self.0.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_used_when_unset() {
        let provider = CompletionProvider::new(LlmKind::Anthropic, None, "sk-test").unwrap();
        assert_eq!(provider.model_name(), "claude-3-5-sonnet-20241022");
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn model_override() {
        let provider = CompletionProvider::new(LlmKind::OpenAi, Some("gpt-4o-mini"), "sk-test").unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
        assert_eq!(provider.llm_info().to_string(), "openai (gpt-4o-mini)");
    }

    #[test]
    fn empty_key_is_configuration_error() {
        let err = CompletionProvider::new(LlmKind::Gemini, None, " ").unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Configuration);
    }
}
