//! Extraction error types.

use thiserror::Error;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Content type is not supported by any extractor.
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    /// Extraction process failed.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The payload carries no extractable content.
    #[error("Empty content extracted")]
    EmptyContent,

    /// PDF-specific extraction error.
    #[cfg(feature = "pdf")]
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// DOCX-specific extraction error.
    #[cfg(feature = "docx")]
    #[error("DOCX extraction error: {0}")]
    Docx(String),

    /// Audio container error.
    #[cfg(feature = "audio")]
    #[error("Audio extraction error: {0}")]
    Audio(String),
}

impl ExtractError {
    /// Whether the extractor found nothing to extract, as opposed to failing
    /// to parse a payload that has content.
    pub fn is_empty_content(&self) -> bool {
        matches!(self, Self::EmptyContent)
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_classification() {
        assert!(ExtractError::EmptyContent.is_empty_content());
        assert!(!ExtractError::UnsupportedType("video/mp4".to_string()).is_empty_content());
        assert!(!ExtractError::ExtractionFailed("truncated".to_string()).is_empty_content());
    }
}
