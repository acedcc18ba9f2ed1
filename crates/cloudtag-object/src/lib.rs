#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for object-store client operations.
pub const TRACING_TARGET_CLIENT: &str = "cloudtag_object::client";

/// Tracing target for backend connection and tag operations.
pub const TRACING_TARGET_BACKEND: &str = "cloudtag_object::backend";

mod backend;
mod location;

pub mod client;
/// Storage backends and the environment-driven connector.
pub mod providers;

#[doc(hidden)]
pub mod prelude;

pub use backend::{StorageBackend, StorageInfo};
pub use location::StorageLocation;
