//! Payload normalization: turn the raw JSON value of an attachment field
//! into an [`AttachmentInput`].
//!
//! Two shapes are accepted. A bare base64 string, or an object carrying the
//! base64 `content` plus per-document overrides:
//!
//! ```json
//! {
//!   "content": "QmVnaW4gQmVmb3JlTGltaXQ=",
//!   "_content_type": "text/plain",
//!   "_content_length": 1024,
//!   "_indexed_chars": 20,
//!   "_language": "en",
//!   "_detect_language": false,
//!   "_name": "notes.txt"
//! }
//! ```

use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ErrorCode, SatchelError, SatchelResult};

/// Per-document overrides carried by the object form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentOverrides {
    pub content_type: Option<String>,
    /// Maximum number of decoded bytes handed to the extractor.
    pub content_length: Option<i64>,
    pub indexed_chars: Option<i64>,
    pub language: Option<String>,
    pub detect_language: Option<bool>,
    pub name: Option<String>,
}

/// The two accepted field value shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAttachment {
    /// Bare base64 string.
    Scalar(String),
    /// `content` plus overrides.
    Object {
        content: String,
        overrides: AttachmentOverrides,
    },
}

/// A validated attachment ready for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentInput {
    /// Decoded payload bytes.
    pub content: Arc<[u8]>,
    pub content_type: Option<String>,
    pub indexed_chars: Option<i64>,
    pub language: Option<String>,
    pub detect_language: Option<bool>,
    pub name: Option<String>,
}

impl AttachmentInput {
    /// Input with no overrides.
    pub fn new(content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content: content.into(),
            content_type: None,
            indexed_chars: None,
            language: None,
            detect_language: None,
            name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_indexed_chars(mut self, limit: i64) -> Self {
        self.indexed_chars = Some(limit);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_detect_language(mut self, detect: bool) -> Self {
        self.detect_language = Some(detect);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn wrong_shape(field: &str, message: String) -> SatchelError {
    SatchelError::invalid_payload(field, message, ErrorCode::PayWrongShape)
}

impl RawAttachment {
    /// Classify a field value. `null` means the field is absent.
    pub fn from_value(field: &str, value: &Value) -> SatchelResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(blob) => Ok(Some(Self::Scalar(blob.clone()))),
            Value::Object(object) => Self::from_object(field, object).map(Some),
            other => Err(wrong_shape(
                field,
                format!(
                    "expected a base64 string or an object, got {}",
                    json_type(other)
                ),
            )),
        }
    }

    fn from_object(field: &str, object: &Map<String, Value>) -> SatchelResult<Self> {
        let mut content = None;
        let mut overrides = AttachmentOverrides::default();

        for (key, value) in object {
            match key.as_str() {
                "content" => content = Some(expect_string(field, key, value)?),
                "_content_type" => overrides.content_type = optional_string(field, key, value)?,
                "_content_length" => overrides.content_length = optional_i64(field, key, value)?,
                "_indexed_chars" => overrides.indexed_chars = optional_i64(field, key, value)?,
                "_language" => overrides.language = optional_string(field, key, value)?,
                "_detect_language" => overrides.detect_language = optional_bool(field, key, value)?,
                "_name" => overrides.name = optional_string(field, key, value)?,
                other => debug!(field, key = other, "Ignoring unknown attachment key"),
            }
        }

        let content = content.ok_or_else(|| {
            SatchelError::invalid_payload(
                field,
                "no content is provided",
                ErrorCode::PayMissingContent,
            )
        })?;

        Ok(Self::Object { content, overrides })
    }

    /// Decode the blob and apply the overrides.
    pub fn normalize(self, field: &str) -> SatchelResult<AttachmentInput> {
        let (blob, overrides) = match self {
            Self::Scalar(blob) => (blob, AttachmentOverrides::default()),
            Self::Object { content, overrides } => (content, overrides),
        };

        let mut bytes = decode_base64(&blob).ok_or_else(|| {
            SatchelError::invalid_payload(
                field,
                "content is not valid base64",
                ErrorCode::PayBadEncoding,
            )
        })?;

        if let Some(max_bytes) = overrides.content_length.and_then(|l| usize::try_from(l).ok()) {
            bytes.truncate(max_bytes);
        }

        if bytes.is_empty() {
            return Err(SatchelError::invalid_payload(
                field,
                "content is empty",
                ErrorCode::PayEmpty,
            ));
        }

        Ok(AttachmentInput {
            content: bytes.into(),
            content_type: overrides.content_type,
            indexed_chars: overrides.indexed_chars,
            language: overrides.language,
            detect_language: overrides.detect_language,
            name: overrides.name,
        })
    }
}

/// Normalize a field value in one step. `Ok(None)` for `null`.
pub fn normalize(field: &str, value: &Value) -> SatchelResult<Option<AttachmentInput>> {
    RawAttachment::from_value(field, value)?
        .map(|raw| raw.normalize(field))
        .transpose()
}

/// Decode standard base64, tolerating line breaks and missing padding.
fn decode_base64(blob: &str) -> Option<Vec<u8>> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn expect_string(field: &str, key: &str, value: &Value) -> SatchelResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_shape(field, format!("[{}] must be a string, got {}", key, json_type(value))))
}

fn optional_string(field: &str, key: &str, value: &Value) -> SatchelResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        other => Err(wrong_shape(
            field,
            format!("[{}] must be a string, got {}", key, json_type(other)),
        )),
    }
}

fn optional_i64(field: &str, key: &str, value: &Value) -> SatchelResult<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| {
            wrong_shape(field, format!("[{}] must be an integer, got {}", key, n))
        }),
        other => Err(wrong_shape(
            field,
            format!("[{}] must be an integer, got {}", key, json_type(other)),
        )),
    }
}

fn optional_bool(field: &str, key: &str, value: &Value) -> SatchelResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(wrong_shape(
            field,
            format!("[{}] must be a boolean, got {}", key, json_type(other)),
        )),
    }
}
