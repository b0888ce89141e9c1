//! Extraction pipeline for processing content through appropriate extractors.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::detect::detect_content_type;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{ExtractedContent, ExtractionRequest};
use crate::{ContentExtractor, Extractor};

/// Pipeline for extracting content using registered extractors.
///
/// Detects the payload's MIME type and routes it to the first registered
/// extractor that supports it.
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Create new empty pipeline.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create pipeline with all available extractors.
    pub fn with_defaults() -> Self {
        Self {
            extractors: crate::ExtractorFactory::all(),
        }
    }

    /// Add an extractor to the pipeline.
    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    fn extractor_for(&self, mime_type: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.iter().find(|e| e.supports(mime_type))
    }

    /// Extract content with the extractor registered for `mime_type`,
    /// skipping detection.
    pub fn extract_as(&self, content: &[u8], mime_type: &str) -> ExtractResult<ExtractedContent> {
        let extractor = self
            .extractor_for(mime_type)
            .ok_or_else(|| ExtractError::UnsupportedType(mime_type.to_string()))?;

        // Third-party parsers occasionally panic on malformed input.
        panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(content))).map_err(|_| {
            ExtractError::ExtractionFailed(format!("{} extractor panicked", extractor.name()))
        })?
    }

    /// Check if pipeline can handle a given MIME type.
    pub fn supports(&self, mime_type: &str) -> bool {
        self.extractors.iter().any(|e| e.supports(mime_type))
    }

    /// List all supported MIME types.
    pub fn supported_types(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.supported_types().iter().copied())
            .collect()
    }

    /// Get the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the pipeline has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ContentExtractor for ExtractionPipeline {
    fn extract(&self, request: &ExtractionRequest) -> ExtractResult<ExtractedContent> {
        if request.content.is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let mime_type = detect_content_type(
            &request.content,
            request.content_type.as_deref(),
            request.resource_name.as_deref(),
        );
        debug!(
            mime_type = %mime_type,
            bytes = request.content.len(),
            "Extracting attachment content"
        );

        let mut extracted = self.extract_as(&request.content, &mime_type)?;

        if extracted.content_type.is_none() {
            extracted.content_type = Some(mime_type);
        }

        if let Some(max_chars) = request.max_chars {
            if extracted.truncate(max_chars) {
                debug!(max_chars, "Extracted text truncated");
            }
        }

        Ok(extracted)
    }
}
