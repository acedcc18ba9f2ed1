//! Scripted language model for tests.
//!
//! Only available with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! cloudtag-rig = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use cloudtag_core::{Error, Result};

use crate::model::LanguageModel;

/// A [`LanguageModel`] that answers from a queue of scripted replies.
///
/// Once the queue is empty every call returns the fallback reply. Prompts
/// are recorded in call order.
#[derive(Debug)]
pub struct MockLanguageModel {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl MockLanguageModel {
    /// Creates a model that always answers `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queues a failed call.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(Error::llm().with_message(message)));
        self
    }

    /// Returns every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Result<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());
        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let reply = next.unwrap_or_else(|| Ok(self.fallback.clone()))?;
        if reply.trim().is_empty() {
            return Err(Error::llm().with_message("Empty response from mock"));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_fallback() {
        let model = MockLanguageModel::new("x, y")
            .with_reply("a, b")
            .with_failure("rate limited");

        assert_eq!(model.complete("p1").await.unwrap(), "a, b");
        let err = model.complete("p2").await.unwrap_err();
        assert_eq!(err.kind(), cloudtag_core::ErrorKind::Llm);
        assert_eq!(model.complete("p3").await.unwrap(), "x, y");
        assert_eq!(model.prompts(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn blank_reply_is_an_error() {
        let model = MockLanguageModel::new("  ");
        assert!(model.complete("p").await.is_err());
        assert_eq!(model.llm_info().provider, "mock");
    }
}
