//! Tagger options.

use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use cloudtag_core::schema::{StorageKind, TagSchema};
use cloudtag_rig::LlmKind;
use cloudtag_runtime::TaggerConfig;

/// Options that build a [`TaggerConfig`].
///
/// # Environment Variables
///
/// - `CLOUDTAG_LOCATION` - storage location, such as `s3://bucket/prefix`
/// - `CLOUDTAG_SCHEMA` - path to the JSON tag schema
/// - `CLOUDTAG_STORAGE` - `aws`, `azure` or `gcp` (default: from the location scheme)
/// - `CLOUDTAG_LLM` - `openai`, `anthropic` or `gemini` (default: openai)
/// - `CLOUDTAG_MODEL` - model override
/// - `CLOUDTAG_MAX_BYTES` - content budget per object (default: 5000)
/// - `CLOUDTAG_PROMPT_TEMPLATE` - path to a custom prompt template
#[derive(Debug, Clone, Args)]
pub struct TaggerArgs {
    /// Storage location: `s3://`, `az://` or `gs://` followed by the bucket
    /// and an optional prefix.
    #[arg(long, env = "CLOUDTAG_LOCATION")]
    pub location: String,

    /// JSON file mapping each tag key to its allowed values, or to `null`.
    #[arg(long, env = "CLOUDTAG_SCHEMA")]
    pub schema: PathBuf,

    /// Storage backend. Inferred from the location scheme when omitted.
    #[arg(long, env = "CLOUDTAG_STORAGE")]
    pub storage: Option<StorageKind>,

    /// Language model provider.
    #[arg(long, env = "CLOUDTAG_LLM", default_value_t = LlmKind::OpenAi)]
    pub llm: LlmKind,

    /// Model name; each provider has its own default.
    #[arg(long, env = "CLOUDTAG_MODEL")]
    pub model: Option<String>,

    /// Maximum bytes of decoded content sent to the model per object.
    #[arg(long, env = "CLOUDTAG_MAX_BYTES", default_value = "5000")]
    pub max_bytes: NonZeroUsize,

    /// File holding a custom prompt with `{tags}`, `{content}` and
    /// `{filename}` placeholders.
    #[arg(long, env = "CLOUDTAG_PROMPT_TEMPLATE")]
    pub prompt_template: Option<PathBuf>,
}

impl TaggerArgs {
    /// Reads the schema and template files and builds the configuration.
    pub fn to_config(&self) -> anyhow::Result<TaggerConfig> {
        let storage = self.storage_kind()?;
        let schema = fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read tag schema {}", self.schema.display()))?;
        let schema = TagSchema::from_json(&schema)?;

        let mut builder = TaggerConfig::builder()
            .with_location(self.location.as_str())
            .with_schema(schema)
            .with_storage(storage)
            .with_llm(self.llm)
            .with_max_bytes(self.max_bytes);
        if let Some(model) = &self.model {
            builder = builder.with_model(model.as_str());
        }
        if let Some(path) = &self.prompt_template {
            let template = fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt template {}", path.display()))?;
            builder = builder.with_prompt_template(template);
        }
        Ok(builder.build()?)
    }

    fn storage_kind(&self) -> anyhow::Result<StorageKind> {
        if let Some(kind) = self.storage {
            return Ok(kind);
        }
        self.location
            .split_once("://")
            .and_then(|(scheme, _)| StorageKind::from_scheme(scheme))
            .with_context(|| {
                format!(
                    "cannot infer the storage backend from '{}', pass --storage",
                    self.location
                )
            })
    }
}
