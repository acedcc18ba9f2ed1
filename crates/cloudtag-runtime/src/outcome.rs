//! Per-object results.

use cloudtag_core::tags::Tags;
use serde::{Deserialize, Serialize};

/// Skip reason recorded for objects whose extension is not recognized.
pub const UNSUPPORTED_REASON: &str = "Unsupported file type";

static NO_TAGS: Tags = Tags::new();

/// Terminal state of one object in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// The file kind is not recognized; nothing was read or written.
    Unsupported,
    /// Fetching, decoding, prompting or parsing failed.
    Failed {
        /// What went wrong.
        reason: String,
    },
    /// Tags were proposed and nothing was written.
    Previewed {
        /// Tags the object carried before the run.
        existing: Tags,
        /// Tags produced by the model.
        proposed: Tags,
    },
    /// Tags were proposed but merging or writing them failed.
    ApplyFailed {
        /// Tags the object carried before the run.
        existing: Tags,
        /// Tags produced by the model.
        proposed: Tags,
        /// What went wrong.
        reason: String,
    },
    /// The merged tags were written.
    Applied {
        /// Tags the object carried before the run.
        existing: Tags,
        /// Tags produced by the model.
        proposed: Tags,
        /// Tags now stored on the object.
        applied: Tags,
    },
}

impl ObjectOutcome {
    /// Records a failure before tags were proposed.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Existing tags, empty when they were never read.
    pub fn existing(&self) -> &Tags {
        match self {
            Self::Unsupported | Self::Failed { .. } => &NO_TAGS,
            Self::Previewed { existing, .. }
            | Self::ApplyFailed { existing, .. }
            | Self::Applied { existing, .. } => existing,
        }
    }

    /// Proposed tags, if the model answered.
    pub fn proposed(&self) -> Option<&Tags> {
        match self {
            Self::Unsupported | Self::Failed { .. } => None,
            Self::Previewed { proposed, .. }
            | Self::ApplyFailed { proposed, .. }
            | Self::Applied { proposed, .. } => Some(proposed),
        }
    }

    /// Written tags, if the write succeeded.
    pub fn applied(&self) -> Option<&Tags> {
        match self {
            Self::Applied { applied, .. } => Some(applied),
            _ => None,
        }
    }

    /// Why the object was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            Self::Unsupported => Some(UNSUPPORTED_REASON),
            Self::Failed { reason } | Self::ApplyFailed { reason, .. } => Some(reason),
            Self::Previewed { .. } | Self::Applied { .. } => None,
        }
    }

    /// Returns `true` when a skip reason is recorded.
    pub fn is_skipped(&self) -> bool {
        self.skip_reason().is_some()
    }
}

/// Outcome of one enumerated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object key.
    pub key: String,
    /// What happened to the object.
    #[serde(flatten)]
    pub outcome: ObjectOutcome,
}

impl ObjectRecord {
    pub fn new(key: impl Into<String>, outcome: ObjectOutcome) -> Self {
        Self {
            key: key.into(),
            outcome,
        }
    }

    pub fn existing(&self) -> &Tags {
        self.outcome.existing()
    }

    pub fn proposed(&self) -> Option<&Tags> {
        self.outcome.proposed()
    }

    pub fn applied(&self) -> Option<&Tags> {
        self.outcome.applied()
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.outcome.skip_reason()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn skip_reason_and_tags_are_exclusive() {
        let unsupported = ObjectOutcome::Unsupported;
        assert_eq!(unsupported.skip_reason(), Some("Unsupported file type"));
        assert!(unsupported.existing().is_empty());
        assert!(unsupported.proposed().is_none());

        let applied = ObjectOutcome::Applied {
            existing: Tags::new(),
            proposed: tags(&[("topic", "labs")]),
            applied: tags(&[("topic", "labs")]),
        };
        assert!(!applied.is_skipped());
        assert_eq!(applied.applied(), Some(&tags(&[("topic", "labs")])));
    }

    #[test]
    fn apply_failure_keeps_proposal() {
        let outcome = ObjectOutcome::ApplyFailed {
            existing: tags(&[("owner", "ops")]),
            proposed: tags(&[("topic", "labs")]),
            reason: "Failed to apply tags: denied".into(),
        };
        assert!(outcome.is_skipped());
        assert!(outcome.proposed().is_some());
        assert!(outcome.applied().is_none());
        assert_eq!(outcome.existing().len(), 1);
    }

    #[test]
    fn serializes_with_status_tag() {
        let record = ObjectRecord::new("docs/a.txt", ObjectOutcome::failed("Processing error: boom"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "docs/a.txt",
                "status": "failed",
                "reason": "Processing error: boom",
            })
        );
        let back: ObjectRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
