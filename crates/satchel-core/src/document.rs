//! The seam between the mapper and the host's document builder.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A typed sub-field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Long(u64),
    Date(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<u64> {
        match self {
            FieldValue::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Long(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(date: DateTime<Utc>) -> Self {
        FieldValue::Date(date)
    }
}

/// Receives the sub-field values of a mapped attachment.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentBuilder {
    /// Set `name` to `value` on the document under construction.
    fn set_field(&mut self, name: &str, value: FieldValue);
}

/// A plain map-backed document, handy for hosts that post-process values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InMemoryDocument {
    fields: BTreeMap<String, FieldValue>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl DocumentBuilder for InMemoryDocument {
    fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }
}
