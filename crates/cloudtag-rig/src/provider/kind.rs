//! Supported language model providers.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Language model provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LlmKind {
    /// OpenAI chat completions.
    OpenAi,
    /// Anthropic messages.
    Anthropic,
    /// Google Gemini.
    Gemini,
}

impl LlmKind {
    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4.1",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::Gemini => "gemini-1.5-pro",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn identifiers() {
        assert_eq!(LlmKind::OpenAi.to_string(), "openai");
        assert_eq!(LlmKind::from_str("Anthropic").unwrap(), LlmKind::Anthropic);
        assert!(LlmKind::from_str("cohere").is_err());
    }

    #[test]
    fn default_models() {
        assert_eq!(LlmKind::OpenAi.default_model(), "gpt-4.1");
        assert_eq!(
            LlmKind::Anthropic.default_model(),
            "claude-3-5-sonnet-20241022"
        );
        assert_eq!(LlmKind::Gemini.default_model(), "gemini-1.5-pro");
    }
}
