//! Extraction orchestration: run the content extractor for one attachment
//! and decide whether the document is indexed with full content, indexed
//! with empty content, or rejected.

use std::sync::Arc;

use satchel_extractors::language::detect_language;
use satchel_extractors::{ContentExtractor, ExtractedContent, ExtractionRequest};
use tracing::{debug, warn};

use crate::error::{ErrorCode, SatchelError};
use crate::payload::AttachmentInput;
use crate::schema::AttachmentFieldSchema;

/// Outcome of extracting one attachment.
#[derive(Debug)]
pub enum Extraction {
    /// Text and metadata were extracted.
    Success(ExtractedContent),
    /// The payload could not be parsed; index it with empty content.
    SuccessEmpty,
    /// The document must not be indexed.
    Fatal(SatchelError),
}

impl Extraction {
    /// The extracted content, if any.
    pub fn content(&self) -> Option<&ExtractedContent> {
        match self {
            Extraction::Success(content) => Some(content),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Extraction::Fatal(_))
    }
}

/// Resolve the indexed-character limit: the document override wins over
/// the schema default. Negative or absent is unlimited.
pub fn effective_limit(document: Option<i64>, schema: Option<i64>) -> Option<usize> {
    document
        .or(schema)
        .and_then(|limit| usize::try_from(limit).ok())
}

/// Drives a [`ContentExtractor`] for attachment inputs.
#[derive(Clone)]
pub struct ExtractionOrchestrator {
    extractor: Arc<dyn ContentExtractor>,
}

impl ExtractionOrchestrator {
    pub fn new(extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { extractor }
    }

    /// Extract `input` under `schema`.
    pub fn extract(&self, schema: &AttachmentFieldSchema, input: &AttachmentInput) -> Extraction {
        let field = schema.field();

        if input.is_empty() {
            return Extraction::Fatal(SatchelError::invalid_payload(
                field,
                "content is empty",
                ErrorCode::PayEmpty,
            ));
        }

        let limit = effective_limit(input.indexed_chars, schema.indexed_chars());
        let request = ExtractionRequest::new(Arc::clone(&input.content))
            .with_content_type(input.content_type.clone())
            .with_resource_name(input.name.clone())
            .with_max_chars(limit);

        debug!(
            field,
            bytes = input.len(),
            content_type = ?input.content_type,
            limit = ?limit,
            "Extracting attachment"
        );

        let mut content = match self.extractor.extract(&request) {
            Ok(content) => content,
            Err(e) if e.is_empty_content() => {
                return Extraction::Fatal(SatchelError::invalid_payload(
                    field,
                    "no extractable content found",
                    ErrorCode::PayNoExtractableContent,
                ));
            }
            Err(e) if !schema.ignore_errors() => {
                return Extraction::Fatal(SatchelError::invalid_payload(
                    field,
                    format!("failed to extract content: {}", e),
                    ErrorCode::PayExtractionFailed,
                ));
            }
            Err(e) => {
                warn!(field, error = %e, "Failed to extract attachment content, indexing it empty");
                return Extraction::SuccessEmpty;
            }
        };

        if let Some(limit) = limit {
            content.truncate(limit);
        }

        if input.detect_language.unwrap_or(schema.detect_language()) && input.language.is_none() {
            if let Some(detected) = detect_language(&content.text) {
                debug!(field, language = %detected, "Detected attachment language");
                content.language = Some(detected);
            }
        }

        Extraction::Success(content)
    }
}
