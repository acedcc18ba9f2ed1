//! Convenience re-exports.

pub use crate::config::{TaggerConfig, TaggerConfigBuilder};
pub use crate::outcome::{ObjectOutcome, ObjectRecord};
pub use crate::result::{RunMode, RunResult, RunSummary};
pub use crate::tagger::{SmartTagger, TagInfo};
