//! Tagger configuration.

use std::num::NonZeroUsize;

use cloudtag_core::content::DEFAULT_MAX_BYTES;
use cloudtag_core::prompt::PromptTemplate;
use cloudtag_core::schema::{StorageKind, TagLimits, TagSchema, validate_schema};
use cloudtag_core::{Error, Result};
use cloudtag_object::StorageLocation;
use cloudtag_rig::LlmKind;
use derive_builder::Builder;

/// Content budget used when none is configured.
const DEFAULT_MAX_CONTENT_BYTES: NonZeroUsize = match NonZeroUsize::new(DEFAULT_MAX_BYTES) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Configuration of a [`SmartTagger`](crate::SmartTagger).
///
/// Built with [`TaggerConfig::builder`]; building checks that the location
/// matches the storage kind, that the schema fits the backend limits and
/// that a custom prompt template has every placeholder.
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "TaggerConfigBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "fallible_build")
)]
pub struct TaggerConfig {
    /// Storage location, such as `s3://bucket/prefix`.
    location: String,
    /// Tag keys and their allowed values.
    schema: TagSchema,
    /// Storage backend family.
    storage: StorageKind,
    /// Language model provider family.
    llm: LlmKind,
    /// Model override; the provider default is used when unset.
    #[builder(default)]
    model: Option<String>,
    /// Byte budget for decoded content sent to the model.
    #[builder(default = "DEFAULT_MAX_CONTENT_BYTES")]
    max_bytes: NonZeroUsize,
    /// Custom prompt template with `{tags}`, `{content}` and `{filename}`.
    #[builder(default)]
    prompt_template: Option<String>,
}

impl TaggerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TaggerConfigBuilder {
        TaggerConfigBuilder::default()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn schema(&self) -> &TagSchema {
        &self.schema
    }

    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    pub fn llm(&self) -> LlmKind {
        self.llm
    }

    /// Configured model, or `None` for the provider default.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn max_bytes(&self) -> NonZeroUsize {
        self.max_bytes
    }

    /// Tag limits of the configured storage backend.
    pub fn limits(&self) -> TagLimits {
        self.storage.limits()
    }

    /// Parses the configured location.
    pub fn storage_location(&self) -> Result<StorageLocation> {
        StorageLocation::parse_for(self.storage, &self.location)
    }

    /// Returns the prompt template, the built-in one unless a custom
    /// template was configured.
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match &self.prompt_template {
            Some(template) => PromptTemplate::custom(template.as_str()),
            None => Ok(PromptTemplate::Default),
        }
    }

    fn validate(&self) -> Result<()> {
        self.storage_location()?;
        validate_schema(&self.schema, self.limits()).map_err(|e| {
            Error::configuration()
                .with_message(format!("Invalid tag schema: {}", e.detail()))
                .with_source(e)
        })?;
        self.prompt_template()?;
        Ok(())
    }
}

impl TaggerConfigBuilder {
    /// Builds and validates the configuration.
    ///
    /// Every failure, including a missing required field, is a
    /// configuration error.
    pub fn build(self) -> Result<TaggerConfig> {
        let config = self.fallible_build().map_err(|e| {
            Error::configuration()
                .with_message(e.to_string())
                .with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use cloudtag_core::ErrorKind;

    use super::*;

    fn schema() -> TagSchema {
        TagSchema::new([
            ("department", Some(vec!["labs", "billing"])),
            ("summary", None),
        ])
    }

    fn builder() -> TaggerConfigBuilder {
        TaggerConfig::builder()
            .with_location("s3://records/2024")
            .with_schema(schema())
            .with_storage(StorageKind::Aws)
            .with_llm(LlmKind::OpenAi)
    }

    #[test]
    fn defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.max_bytes().get(), 5000);
        assert_eq!(config.model(), None);
        assert_eq!(config.prompt_template().unwrap(), PromptTemplate::Default);
        assert_eq!(config.storage_location().unwrap().prefix(), "2024");
    }

    #[test]
    fn overrides() {
        let config = builder()
            .with_model("gpt-4o-mini")
            .with_max_bytes(NonZeroUsize::new(200).unwrap())
            .with_prompt_template("{tags} | {content} | {filename}")
            .build()
            .unwrap();
        assert_eq!(config.model(), Some("gpt-4o-mini"));
        assert_eq!(config.max_bytes().get(), 200);
        assert!(config.prompt_template().unwrap().is_custom());
    }

    #[test]
    fn scheme_must_match_storage() {
        let err = builder()
            .with_location("gs://records")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn schema_must_fit_backend() {
        let keys: Vec<String> = (0..10).map(|i| format!("key{i}")).collect();
        let wide = TagSchema::new(keys.iter().map(|k| (k.as_str(), None::<Vec<&str>>)));

        let err = builder().with_schema(wide.clone()).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let config = builder()
            .with_location("gs://records")
            .with_storage(StorageKind::Gcp)
            .with_schema(wide)
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn template_must_have_placeholders() {
        let err = builder()
            .with_prompt_template("{content} only")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.detail().contains("{tags}"));
    }

    #[test]
    fn missing_field_is_configuration_error() {
        let err = TaggerConfig::builder()
            .with_location("s3://records")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
