//! The tagging facade.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use cloudtag_core::prompt::PromptTemplate;
use cloudtag_core::{Error, Result};
use cloudtag_object::{StorageBackend, StorageInfo, providers};
use cloudtag_rig::{CompletionProvider, LanguageModel, LlmInfo};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_RUN;
use crate::config::TaggerConfig;
use crate::pipeline::Pipeline;
use crate::result::{RunMode, RunResult};

/// Tags the objects of one bucket with values chosen by a language model.
///
/// Construction either succeeds with both backends ready or fails with a
/// configuration error.
pub struct SmartTagger {
    config: TaggerConfig,
    template: PromptTemplate,
    storage: Arc<dyn StorageBackend>,
    model: Arc<dyn LanguageModel>,
}

impl SmartTagger {
    /// Connects to the configured storage and language model.
    ///
    /// Credentials come from the environment: the variables of the storage
    /// backend and `API_KEY` for the model.
    pub async fn connect(config: TaggerConfig) -> Result<Self> {
        let location = config.storage_location()?;
        let storage = providers::connect(&location).await?;
        let model = CompletionProvider::from_env(config.llm(), config.model())?;
        Self::from_parts(config, storage, Arc::new(model))
    }

    /// Creates a tagger over already constructed backends.
    pub fn from_parts(
        config: TaggerConfig,
        storage: Arc<dyn StorageBackend>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        if storage.kind() != config.storage() {
            return Err(Error::configuration().with_message(format!(
                "Storage backend is bound to a {} location but the tagger is configured for {}",
                storage.kind(),
                config.storage()
            )));
        }
        let template = config.prompt_template()?;

        tracing::debug!(
            target: TRACING_TARGET_RUN,
            storage = %storage.storage_info(),
            llm = %model.llm_info(),
            custom_prompt = template.is_custom(),
            "Created tagger"
        );
        Ok(Self {
            config,
            template,
            storage,
            model,
        })
    }

    /// Proposes tags for every object without writing anything.
    ///
    /// `max_bytes` overrides the configured content budget for this run.
    pub async fn preview(&self, max_bytes: Option<NonZeroUsize>) -> Result<RunResult> {
        self.run(RunMode::Preview, max_bytes).await
    }

    /// Proposes tags for every object and writes them merged over the
    /// existing tags.
    pub async fn apply(&self, max_bytes: Option<NonZeroUsize>) -> Result<RunResult> {
        self.run(RunMode::Apply, max_bytes).await
    }

    async fn run(&self, mode: RunMode, max_bytes: Option<NonZeroUsize>) -> Result<RunResult> {
        let pipeline = Pipeline {
            storage: self.storage.as_ref(),
            model: self.model.as_ref(),
            schema: self.config.schema(),
            template: &self.template,
            tag_keys: self.config.schema().key_list(),
            limits: self.config.limits(),
            max_bytes: max_bytes.unwrap_or(self.config.max_bytes()).get(),
        };
        pipeline.run(mode).await
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.storage.storage_info()
    }

    pub fn llm_info(&self) -> LlmInfo {
        self.model.llm_info()
    }

    /// Describes each schema key in order.
    pub fn tags_info(&self) -> Vec<TagInfo> {
        self.config
            .schema()
            .fields()
            .iter()
            .map(|field| TagInfo {
                key: field.key.clone(),
                description: match &field.allowed {
                    None => "LLM will deduce value".to_owned(),
                    Some(values) => format!("Allowed values: [{}]", values.join(", ")),
                },
            })
            .collect()
    }
}

impl fmt::Debug for SmartTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartTagger")
            .field("config", &self.config)
            .field("storage", &self.storage.storage_info())
            .field("llm", &self.model.llm_info())
            .finish()
    }
}

/// How the tagger fills one schema key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub key: String,
    pub description: String,
}

impl fmt::Display for TagInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.description)
    }
}
