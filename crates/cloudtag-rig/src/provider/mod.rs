//! Language model providers.

mod completion;
mod kind;

pub use completion::{API_KEY_ENV, CompletionProvider};
pub use kind::LlmKind;
