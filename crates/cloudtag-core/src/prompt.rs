//! Prompt rendering.
//!
//! A [`PromptTemplate`] is either the built-in instruction text or a
//! caller-supplied template with `{tags}`, `{content}` and `{filename}`
//! placeholders.

use std::fmt::Write as _;

use crate::schema::TagSchema;
use crate::{Error, Result};

/// Placeholder replaced by the tag schema rendered as a JSON object.
pub const TAGS_PLACEHOLDER: &str = "{tags}";
/// Placeholder replaced by the decoded, truncated object content.
pub const CONTENT_PLACEHOLDER: &str = "{content}";
/// Placeholder replaced by the object key.
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

const REQUIRED_PLACEHOLDERS: [&str; 3] =
    [TAGS_PLACEHOLDER, CONTENT_PLACEHOLDER, FILENAME_PLACEHOLDER];

/// Template used to build the model instruction for one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Built-in instructions.
    #[default]
    Default,
    /// Caller-supplied template text.
    Custom(String),
}

impl PromptTemplate {
    /// Creates a custom template, checking that every placeholder is present.
    pub fn custom(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        check_placeholders(&template)?;
        Ok(Self::Custom(template))
    }

    /// Returns `true` for a caller-supplied template.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Renders the prompt for one object.
    ///
    /// The default template requires a non-blank `filename`.
    pub fn render(&self, schema: &TagSchema, content: &str, filename: &str) -> Result<String> {
        match self {
            Self::Default => default_prompt(schema, content, filename),
            Self::Custom(template) => custom_prompt(template, schema, content, filename),
        }
    }
}

fn check_placeholders(template: &str) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
        .into_iter()
        .filter(|p| !template.contains(p))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::configuration().with_message(format!(
        "Custom prompt template is missing required placeholders: {}. Required placeholders: {}",
        missing.join(", "),
        REQUIRED_PLACEHOLDERS.join(", ")
    )))
}

fn custom_prompt(template: &str, schema: &TagSchema, content: &str, filename: &str) -> Result<String> {
    check_placeholders(template)?;
    // Placeholders are replaced in a single pass so substituted text is
    // never scanned for further placeholders.
    let tags = schema.to_json_string();
    let mut out = String::with_capacity(template.len() + content.len() + tags.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let replacement = [
            (TAGS_PLACEHOLDER, tags.as_str()),
            (CONTENT_PLACEHOLDER, content),
            (FILENAME_PLACEHOLDER, filename),
        ]
        .into_iter()
        .find(|(token, _)| tail.starts_with(token));
        match replacement {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn default_prompt(schema: &TagSchema, content: &str, filename: &str) -> Result<String> {
    if filename.trim().is_empty() {
        return Err(Error::configuration().with_message("filename is required and cannot be empty"));
    }

    let n = schema.len();
    let mut constraints = String::new();
    for field in schema.fields() {
        match &field.allowed {
            Some(values) => {
                let list = serde_json::to_string(values).unwrap_or_default();
                let _ = writeln!(constraints, "- {}: must be one of {}", field.key, list);
            }
            None => {
                let _ = writeln!(
                    constraints,
                    "- {}: deduce appropriate value based on content and key name",
                    field.key
                );
            }
        }
    }

    Ok(format!(
        "Analyze the following content and generate exactly {n} tag values.

Tag keys and constraints:
{constraints}File being analyzed: {filename}

Content preview:
{content}

Instructions:
1. Generate exactly {n} values, one for each tag key
2. Return only the values in order, separated by commas
3. Keep values concise (1-3 words when possible)
4. Make values relevant and descriptive for the content
5. For tags with allowed values, use only those values
6. For tags without allowed values, deduce appropriate values based on content and key name
7. If you see any abbreviations, interpret them according to context, following these examples:
    Example: \"BOL#: 7782-CA-TOR-2025\" → \"bill_of_lading\" (a shipping document)
    Example: \"PO# 5567-AB\" → \"purchase_order\" (a procurement document)

File Context Guidelines:
- Consider the filename as additional context for tagging decisions
- Use filename context to inform your understanding of the document type and content
- However, if the filename is not relevant to the content, ignore it

Example output format:
value1, value2, value3

Generated tags:"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn schema() -> TagSchema {
        TagSchema::new([
            ("department", Some(vec!["labs", "billing"])),
            ("summary", None),
        ])
    }

    #[test]
    fn default_prompt_lists_constraints() {
        let prompt = PromptTemplate::Default
            .render(&schema(), "lab results", "reports/q1.txt")
            .unwrap();
        assert!(prompt.starts_with("Analyze the following content and generate exactly 2 tag values."));
        assert!(prompt.contains("- department: must be one of [\"labs\",\"billing\"]\n"));
        assert!(prompt.contains("- summary: deduce appropriate value based on content and key name\n"));
        assert!(prompt.contains("File being analyzed: reports/q1.txt\n"));
        assert!(prompt.contains("Content preview:\nlab results\n"));
        assert!(prompt.contains("1. Generate exactly 2 values, one for each tag key"));
        assert!(prompt.ends_with("Generated tags:"));
    }

    #[test]
    fn default_prompt_requires_filename() {
        let err = PromptTemplate::Default.render(&schema(), "x", "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.detail().contains("filename"));
    }

    #[test]
    fn custom_template_substitutes_placeholders() {
        let template = PromptTemplate::custom("Tags {tags} for {filename}: {content} {other}").unwrap();
        let prompt = template.render(&schema(), "body {filename}", "a.md").unwrap();
        assert_eq!(
            prompt,
            r#"Tags {"department":["labs","billing"],"summary":null} for a.md: body {filename} {other}"#
        );
    }

    #[test]
    fn custom_template_names_every_missing_placeholder() {
        let err = PromptTemplate::custom("only {content}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let detail = err.detail();
        assert!(detail.contains("placeholders: {tags}, {filename}."));
    }
}
