#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for model response parsing.
pub const TRACING_TARGET_RESPONSE: &str = "cloudtag_core::response";

mod error;

pub mod content;
pub mod prompt;
pub mod response;
pub mod schema;
pub mod tags;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
