//! Parsing model completions into schema-ordered tag values.

use crate::{Error, Result, TRACING_TARGET_RESPONSE};

/// Value used to fill keys the model left unanswered.
pub const PLACEHOLDER_VALUE: &str = "general";

/// Boilerplate lead-ins that models commonly put before the answer.
const BOILERPLATE_PREFIXES: [&str; 6] = [
    "Generated tags:",
    "Tags:",
    "Values:",
    "Here are the tags:",
    "The tags are:",
    "Based on the content:",
];

/// Parses a raw completion into exactly `tag_keys.len()` values.
///
/// The answer is read as a comma-separated list. Missing trailing values are
/// filled with [`PLACEHOLDER_VALUE`] and surplus values are dropped, keeping
/// the first ones in order.
pub fn parse_completion<S: AsRef<str>>(completion: &str, tag_keys: &[S]) -> Result<Vec<String>> {
    let expected = tag_keys.len();
    let mut cleaned = completion.trim();
    for prefix in BOILERPLATE_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim();
        }
    }

    let mut values: Vec<String> = cleaned
        .split(',')
        .map(|v| v.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect();

    if values.len() != expected {
        tracing::debug!(
            target: TRACING_TARGET_RESPONSE,
            expected,
            received = values.len(),
            "Completion value count differs from schema key count",
        );
    }
    values.resize_with(expected, || PLACEHOLDER_VALUE.to_owned());

    if values.len() != expected {
        return Err(Error::llm().with_message(format!(
            "Expected {expected} values, got {}",
            values.len()
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 3] = ["department", "phi", "summary"];

    #[test]
    fn pads_short_answers() {
        assert_eq!(
            parse_completion("a, b", &KEYS).unwrap(),
            vec!["a", "b", "general"]
        );
    }

    #[test]
    fn truncates_long_answers() {
        assert_eq!(
            parse_completion("a, b, c, d", &KEYS).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn strips_boilerplate_and_quotes() {
        let completion = "  Generated tags: \"labs\", 'true' , ,\"lab panel\"\n";
        assert_eq!(
            parse_completion(completion, &KEYS).unwrap(),
            vec!["labs", "true", "lab panel"]
        );
        assert_eq!(
            parse_completion("Here are the tags: x, y, z", &KEYS).unwrap(),
            vec!["x", "y", "z"]
        );
    }

    #[test]
    fn empty_answer_is_all_placeholders() {
        assert_eq!(
            parse_completion("   ", &KEYS).unwrap(),
            vec!["general"; 3]
        );
    }

    #[test]
    fn count_always_matches_key_count() {
        let completions = ["", "one", "1,2,3,4,5,6", ",,,", "Tags: a,,b", "\"\",''"];
        for n in 0..5 {
            let keys: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
            for completion in completions {
                assert_eq!(parse_completion(completion, &keys).unwrap().len(), n);
            }
        }
    }
}
