//! Tag mappings and the merge/limit rules applied before writing them.

use std::collections::BTreeMap;

use crate::schema::TagLimits;
use crate::{Error, Result};

/// Key/value tags of one object.
pub type Tags = BTreeMap<String, String>;

/// Zips schema keys with model values into a tag mapping.
///
/// Values are trimmed. Each must be non-blank and within the backend's value
/// length limit, and there must be exactly one value per key.
pub fn create_tag_mapping<K, V>(tag_keys: &[K], values: &[V], limits: TagLimits) -> Result<Tags>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    validate_tag_values(tag_keys, values, limits)?;
    Ok(tag_keys
        .iter()
        .zip(values)
        .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().trim().to_owned()))
        .collect())
}

/// Checks proposed values against the key count and the value limits.
pub fn validate_tag_values<K, V>(tag_keys: &[K], values: &[V], limits: TagLimits) -> Result<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if values.len() != tag_keys.len() {
        return Err(Error::schema_validation().with_message(format!(
            "Expected {} values, got {}",
            tag_keys.len(),
            values.len()
        )));
    }
    for (key, value) in tag_keys.iter().zip(values) {
        check_value(key.as_ref(), value.as_ref().trim(), limits)?;
    }
    Ok(())
}

/// Checks the tags an object already carries against the backend limits.
pub fn validate_existing_tags(tags: &Tags, limits: TagLimits) -> Result<()> {
    if tags.len() > limits.max_tags {
        return Err(Error::schema_validation().with_message(format!(
            "Object has {} tags, exceeding the limit of {}",
            tags.len(),
            limits.max_tags
        )));
    }
    for (key, value) in tags {
        if key.trim().is_empty() {
            return Err(Error::schema_validation().with_message("Tag key cannot be empty"));
        }
        if key.chars().count() > limits.max_key_len {
            return Err(Error::schema_validation().with_message(format!(
                "Tag key '{key}' exceeds {} character limit",
                limits.max_key_len
            )));
        }
        check_value(key, value, limits)?;
    }
    Ok(())
}

/// Merges proposed tags over existing ones.
///
/// Every schema key is dropped from `existing` before `proposed` is laid
/// over it, so a schema key never keeps its old value. Fails without
/// producing a mapping when the result would carry more tags than the
/// backend allows.
pub fn merge_tags<K: AsRef<str>>(
    existing: &Tags,
    proposed: &Tags,
    tag_keys: &[K],
    limits: TagLimits,
) -> Result<Tags> {
    validate_existing_tags(existing, limits)?;
    if proposed.len() != tag_keys.len() {
        return Err(Error::schema_validation().with_message(format!(
            "Expected {} values, got {}",
            tag_keys.len(),
            proposed.len()
        )));
    }
    for (key, value) in proposed {
        check_value(key, value, limits)?;
    }

    let is_schema_key = |key: &str| tag_keys.iter().any(|k| k.as_ref() == key);
    let mut merged: Tags = existing
        .iter()
        .filter(|(k, _)| !is_schema_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(proposed.iter().map(|(k, v)| (k.clone(), v.clone())));

    if merged.len() > limits.max_tags {
        return Err(Error::schema_validation().with_message(format!(
            "Total tags ({}) would exceed the limit of {}",
            merged.len(),
            limits.max_tags
        )));
    }
    Ok(merged)
}

fn check_value(key: &str, value: &str, limits: TagLimits) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::schema_validation()
            .with_message(format!("Tag value for '{key}' cannot be empty")));
    }
    if value.chars().count() > limits.max_value_len {
        return Err(Error::schema_validation().with_message(format!(
            "Tag value for '{key}' exceeds {} character limit",
            limits.max_value_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::schema::StorageKind;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mapping_trims_values() {
        let mapping = create_tag_mapping(
            &["department", "summary"],
            &[" labs ", "lab panel"],
            StorageKind::Aws.limits(),
        )
        .unwrap();
        assert_eq!(mapping, tags(&[("department", "labs"), ("summary", "lab panel")]));
    }

    #[test]
    fn mapping_rejects_blank_and_long_values() {
        let limits = StorageKind::Aws.limits();
        let err = create_tag_mapping(&["a"], &["  "], limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);

        let long = "v".repeat(257);
        assert!(create_tag_mapping(&["a"], &[long.as_str()], limits).is_err());
        let gcp_ok = "v".repeat(1024);
        assert!(create_tag_mapping(&["a"], &[gcp_ok.as_str()], StorageKind::Gcp.limits()).is_ok());
    }

    #[test]
    fn mapping_rejects_count_mismatch() {
        assert!(create_tag_mapping(&["a", "b"], &["x"], StorageKind::Aws.limits()).is_err());
    }

    #[test]
    fn new_value_replaces_old_value() {
        let merged = merge_tags(
            &tags(&[("department", "labs")]),
            &tags(&[("department", "billing")]),
            &["department"],
            StorageKind::Aws.limits(),
        )
        .unwrap();
        assert_eq!(merged, tags(&[("department", "billing")]));
    }

    #[test]
    fn merged_count_is_existing_minus_shared_plus_proposed() {
        let existing = tags(&[("owner", "ops"), ("team", "a"), ("department", "labs")]);
        let proposed = tags(&[("department", "billing"), ("summary", "invoice")]);
        let merged = merge_tags(
            &existing,
            &proposed,
            &["department", "summary"],
            StorageKind::Aws.limits(),
        )
        .unwrap();
        assert_eq!(merged.len(), 3 - 1 + 2);
        assert_eq!(merged["owner"], "ops");
        assert_eq!(merged["summary"], "invoice");
    }

    #[test]
    fn merge_over_limit_fails() {
        let existing: Tags = (0..9).map(|i| (format!("e{i}"), "x".to_string())).collect();
        let proposed = tags(&[("a", "1"), ("b", "2")]);
        let err = merge_tags(&existing, &proposed, &["a", "b"], StorageKind::Aws.limits())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
        assert_eq!(err.detail(), "Total tags (11) would exceed the limit of 10");
    }

    #[test]
    fn invalid_existing_tags_fail_merge() {
        let existing = tags(&[("owner", " ")]);
        let proposed = tags(&[("a", "1")]);
        assert!(merge_tags(&existing, &proposed, &["a"], StorageKind::Aws.limits()).is_err());

        let too_many: Tags = (0..11).map(|i| (format!("e{i}"), "x".to_string())).collect();
        let err = validate_existing_tags(&too_many, StorageKind::Aws.limits()).unwrap_err();
        assert!(err.detail().starts_with("Object has 11 tags"));
    }
}
