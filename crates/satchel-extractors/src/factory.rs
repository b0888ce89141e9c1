//! Factory for creating extractors.

use std::sync::Arc;

use crate::detect::essence;
use crate::error::{ExtractError, ExtractResult};
use crate::{Extractor, HtmlExtractor, TextExtractor};

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "docx")]
use crate::DocxExtractor;

#[cfg(feature = "audio")]
use crate::AudioExtractor;

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create a plain text extractor.
    pub fn text() -> Arc<dyn Extractor> {
        Arc::new(TextExtractor::new())
    }

    /// Create an HTML/XHTML extractor.
    pub fn html() -> Arc<dyn Extractor> {
        Arc::new(HtmlExtractor::new())
    }

    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::new())
    }

    /// Create a DOCX extractor.
    #[cfg(feature = "docx")]
    pub fn docx() -> Arc<dyn Extractor> {
        Arc::new(DocxExtractor::new())
    }

    /// Create a DOCX extractor with custom configuration.
    #[cfg(feature = "docx")]
    pub fn docx_configured(preserve_tables: bool) -> Arc<dyn Extractor> {
        Arc::new(DocxExtractor::new().with_tables(preserve_tables))
    }

    /// Create an audio tag extractor.
    #[cfg(feature = "audio")]
    pub fn audio() -> Arc<dyn Extractor> {
        Arc::new(AudioExtractor::new())
    }

    /// Create extractor for a given MIME type.
    pub fn for_mime_type(mime_type: &str) -> ExtractResult<Arc<dyn Extractor>> {
        match essence(mime_type).as_str() {
            "text/plain" | "text/csv" | "text/markdown" | "text/x-markdown" => Ok(Self::text()),

            "text/html" | "application/xhtml+xml" => Ok(Self::html()),

            #[cfg(feature = "pdf")]
            "application/pdf" | "application/x-pdf" => Ok(Self::pdf()),

            #[cfg(feature = "docx")]
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/docx" => Ok(Self::docx()),

            #[cfg(feature = "audio")]
            "audio/mpeg" | "audio/mp3" | "audio/wav" | "audio/x-wav" | "audio/flac"
            | "audio/ogg" => Ok(Self::audio()),

            _ => Err(ExtractError::UnsupportedType(mime_type.to_string())),
        }
    }

    /// Get all available extractors.
    #[allow(unused_mut)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = vec![Self::text(), Self::html()];

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "docx")]
        extractors.push(Self::docx());

        #[cfg(feature = "audio")]
        extractors.push(Self::audio());

        extractors
    }
}
