//! Keyed records.
//!
//! A [`Record`] is one catalog entry: a [`LookupKey`] plus a map of named
//! attributes. Stores own records; everything else holds clones.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Not an object | JSON entry is an array/scalar | `RecordError::NotAnObject` |
//! | No `id` | Entry lacks an `id` attribute | `RecordError::MissingId` |
//! | Partial `id` | `id` object lacks a key field | `RecordError::Key` |
//! | Bad JSON | Catalog text does not parse | `RecordError::Json` |

use std::collections::BTreeMap;

use serde_json::Value;

use crate::key::{KeyResolver, LookupKey, MissingContextError};
use crate::route::RouteParams;

/// Attribute map of a record, ordered by field name.
pub type Attributes = BTreeMap<String, Value>;

/// Name of the attribute carrying a record's identity.
pub const ID_FIELD: &str = "id";

/// Errors from building records out of JSON.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A catalog entry was not a JSON object.
    #[error("record entry is not a JSON object")]
    NotAnObject,
    /// A catalog entry had no `id` attribute.
    #[error("record entry has no `id` attribute")]
    MissingId,
    /// The `id` attribute did not carry every key field.
    #[error("record id is incomplete: {0}")]
    Key(#[from] MissingContextError),
    /// The catalog text was not valid JSON.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single catalog entry with named attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    key: LookupKey,
    attributes: Attributes,
}

impl Record {
    /// Create a record with the given key and attributes.
    #[must_use]
    pub fn new(key: impl Into<LookupKey>, attributes: Attributes) -> Self {
        Self {
            key: key.into(),
            attributes,
        }
    }

    /// Builder-style attribute insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Build a record from a JSON object, deriving its key from the `id`
    /// attribute.
    ///
    /// A string `id` is used verbatim. An object `id` is read as route
    /// parameters (string members only) and passed through `resolver`, so a
    /// record's key always matches the key its route resolves to.
    pub fn from_json(value: Value, resolver: &dyn KeyResolver) -> Result<Self, RecordError> {
        let Value::Object(map) = value else {
            return Err(RecordError::NotAnObject);
        };
        let key = match map.get(ID_FIELD) {
            Some(Value::String(raw)) => LookupKey::new(raw.as_str()),
            Some(Value::Object(id)) => {
                let params: RouteParams = id
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
                    .collect();
                resolver.resolve(&params)?
            }
            _ => return Err(RecordError::MissingId),
        };
        Ok(Self {
            key,
            attributes: map.into_iter().collect(),
        })
    }

    /// Parse a JSON array of records.
    pub fn list_from_json_str(
        text: &str,
        resolver: &dyn KeyResolver,
    ) -> Result<Vec<Self>, RecordError> {
        let entries: Vec<Value> = serde_json::from_str(text)?;
        entries
            .into_iter()
            .map(|entry| Self::from_json(entry, resolver))
            .collect()
    }

    /// The record's lookup key.
    #[must_use]
    pub fn key(&self) -> &LookupKey {
        &self.key
    }

    /// All attributes in field-name order.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// A single attribute.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// A single attribute, if it is a string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Insert or replace an attribute.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.attributes.remove(field)
    }
}

/// Plain-text form of an attribute value.
///
/// Strings render without quotes, `null` renders empty, everything else as
/// compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
