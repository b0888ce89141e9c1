//! Core types for content extraction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::truncate::truncate_in_place;

/// Format family the content was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Plain text content.
    #[default]
    Text,
    /// HTML or XHTML markup.
    Html,
    /// PDF document.
    Pdf,
    /// Microsoft Word document.
    Docx,
    /// Audio container with specified format.
    Audio {
        /// Container format (e.g., "mp3", "wav").
        format: String,
    },
}

/// Input handed to a [`ContentExtractor`](crate::ContentExtractor).
///
/// The payload is shared so the same request can be replayed without
/// copying the bytes.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Raw payload bytes.
    pub content: Arc<[u8]>,
    /// Content-type hint supplied by the caller.
    pub content_type: Option<String>,
    /// Resource (file) name, used for type guessing.
    pub resource_name: Option<String>,
    /// Maximum number of characters of text to keep. `None` is unlimited.
    pub max_chars: Option<usize>,
}

impl ExtractionRequest {
    /// Create a request for the given payload with no hints and no limit.
    pub fn new(content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content: content.into(),
            content_type: None,
            resource_name: None,
            max_chars: None,
        }
    }

    /// Set the content-type hint.
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set the resource name.
    pub fn with_resource_name(mut self, name: Option<String>) -> Self {
        self.resource_name = name;
        self
    }

    /// Set the character limit.
    pub fn with_max_chars(mut self, max_chars: Option<usize>) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// Extracted text with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedContent {
    /// Extracted plain text (possibly empty).
    pub text: String,

    /// Format family of the original content.
    pub modality: Modality,

    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Keywords as found in the document (usually comma separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    /// Detected or declared MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Creation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Declared or detected language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ExtractedContent {
    /// Create new extracted content.
    pub fn new(text: String, modality: Modality) -> Self {
        Self {
            text,
            modality,
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    /// Set the keywords.
    pub fn with_keywords(mut self, keywords: Option<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the creation date.
    pub fn with_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.date = date;
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Cut the text down to `max_chars` characters. Returns true if anything
    /// was removed.
    pub fn truncate(&mut self, max_chars: usize) -> bool {
        truncate_in_place(&mut self.text, max_chars)
    }

    /// Whether any of the descriptive metadata fields is set.
    pub fn has_metadata(&self) -> bool {
        self.title.is_some()
            || self.author.is_some()
            || self.keywords.is_some()
            || self.date.is_some()
    }

    /// Check if extraction produced meaningful text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Text length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Trim a metadata value and drop it when nothing is left.
pub(crate) fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
