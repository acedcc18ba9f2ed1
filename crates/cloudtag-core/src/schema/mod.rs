//! Tag schemas: which keys the model must fill, and with what values.
//!
//! A [`TagSchema`] is an ordered list of tag keys, each either constrained to
//! a fixed list of allowed values or left open for the model to infer. The
//! key order is significant: the model answers with one value per key, in
//! schema order.

mod limits;
mod validate;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use limits::{StorageKind, TagLimits};
pub use validate::validate_schema;

use crate::{Error, Result};

/// A single schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagField {
    /// Tag key written onto the object.
    pub key: String,
    /// Allowed values, or `None` when the model infers the value.
    pub allowed: Option<Vec<String>>,
}

impl TagField {
    /// Returns `true` when the model may pick any value for this key.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.allowed.is_none()
    }
}

/// Ordered mapping from tag key to allowed values.
///
/// Constructed once at configuration time and immutable afterwards. Use
/// [`validate_schema`] to check it against a backend's [`TagLimits`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSchema {
    fields: Vec<TagField>,
}

impl TagSchema {
    /// Creates a schema from `(key, allowed values)` pairs, keeping their order.
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, Option<Vec<V>>)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = entries
            .into_iter()
            .map(|(key, allowed)| TagField {
                key: key.into(),
                allowed: allowed.map(|values| values.into_iter().map(Into::into).collect()),
            })
            .collect();
        Self { fields }
    }

    /// Parses a schema from a JSON object such as
    /// `{"department": ["labs", "billing"], "topic": null}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid tag schema: {e}"))
                .with_source(e)
        })
    }

    /// Returns the schema entries in order.
    pub fn fields(&self) -> &[TagField] {
        &self.fields
    }

    /// Returns the tag keys in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// Returns the tag keys in schema order as owned strings.
    pub fn key_list(&self) -> Vec<String> {
        self.keys().map(str::to_owned).collect()
    }

    /// Returns the entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&TagField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Returns `true` if the schema contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys in the schema.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the schema as a JSON object, the form substituted into
    /// custom prompt templates.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for TagSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, &field.allowed)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TagSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = TagSchema;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from tag key to a list of allowed values or null")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, allowed)) =
                    access.next_entry::<String, Option<Vec<String>>>()?
                {
                    fields.push(TagField { key, allowed });
                }
                Ok(TagSchema { fields })
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
