use std::collections::HashSet;

use super::{TagLimits, TagSchema};
use crate::{Error, Result};

/// Checks a schema against a backend's tag limits.
///
/// The schema must name at least one key and strictly fewer keys than the
/// backend allows, so every object keeps room for at least one tag it
/// already carries. Keys must be unique, non-blank, within the key length
/// limit and made only of ASCII letters, digits, `_` and `-`, with at least
/// one letter or digit.
pub fn validate_schema(schema: &TagSchema, limits: TagLimits) -> Result<()> {
    if schema.is_empty() {
        return Err(Error::schema_validation().with_message("Tag schema has no keys"));
    }

    if schema.len() >= limits.max_tags {
        return Err(Error::schema_validation().with_message(format!(
            "Tag schema has {} keys; the backend allows at most {} tags, so the schema must have fewer than {}",
            schema.len(),
            limits.max_tags,
            limits.max_tags
        )));
    }

    let mut seen = HashSet::with_capacity(schema.len());
    for key in schema.keys() {
        if !seen.insert(key) {
            return Err(
                Error::schema_validation().with_message(format!("Duplicate tag key: {key}"))
            );
        }
        validate_key(key, limits)?;
    }

    Ok(())
}

fn validate_key(key: &str, limits: TagLimits) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::schema_validation().with_message("Tag key cannot be empty"));
    }

    let len = key.chars().count();
    if len > limits.max_key_len {
        return Err(Error::schema_validation().with_message(format!(
            "Tag key '{key}' is {len} characters; the limit is {}",
            limits.max_key_len
        )));
    }

    let allowed = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let has_alphanumeric = key.chars().any(|c| c.is_ascii_alphanumeric());
    if !allowed || !has_alphanumeric {
        return Err(Error::schema_validation().with_message(format!(
            "Tag key '{key}' may only contain letters, digits, '_' and '-'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::schema::StorageKind;

    fn schema_of(keys: &[&str]) -> TagSchema {
        TagSchema::new(keys.iter().map(|k| (*k, None::<Vec<String>>)))
    }

    #[test]
    fn accepts_ordinary_keys() {
        let schema = schema_of(&["department", "is-phi", "doc_type2"]);
        validate_schema(&schema, StorageKind::Aws.limits()).unwrap();
    }

    #[test]
    fn rejects_empty_schema() {
        let err = validate_schema(&TagSchema::default(), StorageKind::Aws.limits()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    }

    #[test]
    fn key_count_must_stay_below_limit() {
        let nine: Vec<String> = (0..9).map(|i| format!("k{i}")).collect();
        let nine: Vec<&str> = nine.iter().map(String::as_str).collect();
        validate_schema(&schema_of(&nine), StorageKind::Aws.limits()).unwrap();

        let ten: Vec<String> = (0..10).map(|i| format!("k{i}")).collect();
        let ten: Vec<&str> = ten.iter().map(String::as_str).collect();
        let err = validate_schema(&schema_of(&ten), StorageKind::Aws.limits()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);

        validate_schema(&schema_of(&ten), StorageKind::Gcp.limits()).unwrap();
    }

    #[test]
    fn rejects_bad_keys() {
        let limits = StorageKind::Aws.limits();
        for key in ["", "   ", "has space", "dot.key", "__", "ключ"] {
            let err = validate_schema(&schema_of(&[key]), limits).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SchemaValidation, "key {key:?}");
        }
    }

    #[test]
    fn key_length_boundary() {
        let limits = StorageKind::Aws.limits();
        let ok = "k".repeat(128);
        validate_schema(&schema_of(&[&ok]), limits).unwrap();
        let long = "k".repeat(129);
        assert!(validate_schema(&schema_of(&[&long]), limits).is_err());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let schema = schema_of(&["topic", "topic"]);
        let err = validate_schema(&schema, StorageKind::Aws.limits()).unwrap_err();
        assert!(err.detail().contains("Duplicate"));
    }
}
