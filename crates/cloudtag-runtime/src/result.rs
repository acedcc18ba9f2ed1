//! Run results and summary statistics.

use std::fmt;

use cloudtag_core::schema::TagSchema;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::outcome::ObjectRecord;

/// Whether a run writes tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Propose tags without writing them.
    Preview,
    /// Merge proposed tags over existing ones and write them.
    Apply,
}

/// Counts derived from the records of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Enumerated objects.
    pub total: usize,
    /// Objects that received proposed tags.
    pub processed: usize,
    /// Objects with a skip reason.
    pub skipped: usize,
    /// Objects whose tags were written.
    pub applied: usize,
    /// `processed / total`, or 0 for an empty run.
    pub success_rate: f64,
}

impl RunSummary {
    /// Derives the summary from per-object records.
    ///
    /// An object whose write failed counts as both processed and skipped.
    pub fn from_records(records: &[ObjectRecord]) -> Self {
        let total = records.len();
        let processed = records.iter().filter(|r| r.proposed().is_some()).count();
        let skipped = records.iter().filter(|r| r.skip_reason().is_some()).count();
        let applied = records.iter().filter(|r| r.applied().is_some()).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            processed as f64 / total as f64
        };

        Self {
            total,
            processed,
            skipped,
            applied,
            success_rate,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {}, processed: {}, skipped: {}, applied: {}, success rate: {:.1}%",
            self.total,
            self.processed,
            self.skipped,
            self.applied,
            self.success_rate * 100.0
        )
    }
}

/// Result of one preview or apply run.
///
/// Records keep the order in which objects were enumerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub mode: RunMode,
    pub schema: TagSchema,
    pub started_at: Timestamp,
    pub records: Vec<ObjectRecord>,
    pub summary: RunSummary,
}

impl RunResult {
    pub(crate) fn new(
        mode: RunMode,
        schema: TagSchema,
        started_at: Timestamp,
        records: Vec<ObjectRecord>,
    ) -> Self {
        let summary = RunSummary::from_records(&records);
        Self {
            mode,
            schema,
            started_at,
            records,
            summary,
        }
    }

    /// Looks up the record of `key`.
    pub fn get(&self, key: &str) -> Option<&ObjectRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Records of objects that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.iter().filter(|r| r.skip_reason().is_some())
    }
}
