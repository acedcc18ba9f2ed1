//! The per-object tagging pipeline.

use cloudtag_core::content::{ContentKind, prepare_content};
use cloudtag_core::prompt::PromptTemplate;
use cloudtag_core::response::parse_completion;
use cloudtag_core::schema::{TagLimits, TagSchema};
use cloudtag_core::tags::{Tags, create_tag_mapping, merge_tags};
use cloudtag_core::{Error, Result};
use cloudtag_object::StorageBackend;
use cloudtag_object::client::ObjectEntry;
use cloudtag_rig::LanguageModel;
use jiff::Timestamp;

use crate::TRACING_TARGET_RUN;
use crate::outcome::{ObjectOutcome, ObjectRecord};
use crate::result::{RunMode, RunResult};

/// One pass over a bucket.
///
/// Objects are processed one at a time, in enumeration order. A failure on
/// one object is recorded in its outcome and never stops the pass; only a
/// failure to enumerate the bucket does.
pub(crate) struct Pipeline<'a> {
    pub storage: &'a dyn StorageBackend,
    pub model: &'a dyn LanguageModel,
    pub schema: &'a TagSchema,
    pub template: &'a PromptTemplate,
    pub tag_keys: Vec<String>,
    pub limits: TagLimits,
    pub max_bytes: usize,
}

impl Pipeline<'_> {
    pub async fn run(&self, mode: RunMode) -> Result<RunResult> {
        let started_at = Timestamp::now();
        tracing::info!(
            target: TRACING_TARGET_RUN,
            %mode,
            provider = self.storage.provider_name(),
            bucket = self.storage.location().bucket(),
            prefix = self.storage.location().prefix(),
            max_bytes = self.max_bytes,
            "Starting tagging run"
        );

        let objects = self.storage.list_objects().await.map_err(|e| {
            Error::unexpected()
                .with_message(format!("Failed to process objects: {}", e.detail()))
                .with_source(e)
        })?;
        if objects.is_empty() {
            tracing::info!(target: TRACING_TARGET_RUN, "No objects found in bucket");
        }

        let mut records = Vec::with_capacity(objects.len());
        for object in &objects {
            let outcome = self.process(object, mode).await;
            match outcome.skip_reason() {
                Some(reason) => tracing::warn!(
                    target: TRACING_TARGET_RUN,
                    key = %object.key,
                    reason,
                    "Skipped object"
                ),
                None => tracing::debug!(
                    target: TRACING_TARGET_RUN,
                    key = %object.key,
                    applied = outcome.applied().is_some(),
                    "Processed object"
                ),
            }
            records.push(ObjectRecord::new(object.key.clone(), outcome));
        }

        let result = RunResult::new(mode, self.schema.clone(), started_at, records);
        tracing::info!(
            target: TRACING_TARGET_RUN,
            %mode,
            total = result.summary.total,
            processed = result.summary.processed,
            skipped = result.summary.skipped,
            applied = result.summary.applied,
            "Finished tagging run"
        );
        Ok(result)
    }

    async fn process(&self, object: &ObjectEntry, mode: RunMode) -> ObjectOutcome {
        let Some(kind) = ContentKind::from_key(&object.key) else {
            return ObjectOutcome::Unsupported;
        };

        let (existing, proposed) = match self.propose(object, kind).await {
            Ok(tags) => tags,
            Err(e) => return ObjectOutcome::failed(format!("Processing error: {}", e.detail())),
        };

        match mode {
            RunMode::Preview => ObjectOutcome::Previewed { existing, proposed },
            RunMode::Apply => match self.apply(&object.key, &existing, &proposed).await {
                Ok(applied) => ObjectOutcome::Applied {
                    existing,
                    proposed,
                    applied,
                },
                Err(e) => ObjectOutcome::ApplyFailed {
                    existing,
                    proposed,
                    reason: format!("Failed to apply tags: {}", e.detail()),
                },
            },
        }
    }

    /// Reads the object and asks the model for one value per schema key.
    async fn propose(&self, object: &ObjectEntry, kind: ContentKind) -> Result<(Tags, Tags)> {
        let existing = self.storage.get_tags(&object.key).await?;
        let bytes = self
            .storage
            .get_content(object, kind, self.max_bytes)
            .await?;
        let content = prepare_content(&bytes, kind, self.max_bytes)?;
        let prompt = self.template.render(self.schema, &content, &object.key)?;

        let completion = self.model.complete(&prompt).await?;
        let values = parse_completion(&completion, &self.tag_keys)?;
        let proposed = create_tag_mapping(&self.tag_keys, &values, self.limits)?;
        Ok((existing, proposed))
    }

    async fn apply(&self, key: &str, existing: &Tags, proposed: &Tags) -> Result<Tags> {
        let merged = merge_tags(existing, proposed, &self.tag_keys, self.limits)?;
        self.storage.set_tags(key, &merged).await?;
        Ok(merged)
    }
}
