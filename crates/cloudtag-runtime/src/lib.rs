#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for run progress and per-object outcomes.
pub const TRACING_TARGET_RUN: &str = "cloudtag_runtime::run";

mod config;
mod outcome;
mod pipeline;
mod result;
mod tagger;

#[doc(hidden)]
pub mod prelude;

pub use config::{TaggerConfig, TaggerConfigBuilder};
pub use outcome::{ObjectOutcome, ObjectRecord, UNSUPPORTED_REASON};
pub use result::{RunMode, RunResult, RunSummary};
pub use tagger::{SmartTagger, TagInfo};
