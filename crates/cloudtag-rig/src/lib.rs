#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for completion requests.
pub const TRACING_TARGET_COMPLETION: &str = "cloudtag_rig::completion";

mod model;
pub mod provider;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use model::{LanguageModel, LlmInfo};
pub use provider::{CompletionProvider, LlmKind};

#[doc(hidden)]
pub mod prelude;
