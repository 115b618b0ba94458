//! Firestore's typed value encoding.
//!
//! Firestore wraps every document field in a single-key object naming
//! its type: `{"stringValue": "x"}`, `{"booleanValue": true}`. Two
//! quirks matter here: 64-bit integers travel as JSON strings
//! (`{"integerValue": "42"}`) and timestamps as RFC 3339 strings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Firestore document: the full resource name plus typed fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Full resource name, e.g.
    /// `projects/{project}/databases/(default)/documents/blog/{id}`.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    /// The document ID (last path segment of the resource name).
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Get a string field.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get an integer field.
    #[must_use]
    pub fn get_int(&self, field: &str) -> Option<i64> {
        match self.fields.get(field)? {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a timestamp field.
    #[must_use]
    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(field)? {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

/// A single typed Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "integerValue", with = "int_as_string")]
    Integer(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "timestampValue")]
    Timestamp(DateTime<Utc>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

/// Firestore sends `integerValue` as a JSON string.
mod int_as_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
