//! satchel-extractors - Content extraction for attachment fields.
//!
//! Turns raw document bytes into plain text plus metadata (title, author,
//! keywords, content type, date, language). The mapper in `satchel-core`
//! only sees the [`ContentExtractor`] capability; format handling stays
//! behind it.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text via pdf-extract, metadata via lopdf
//! - `docx` (default) - DOCX text extraction via docx-rs
//! - `audio` (default) - Audio container tags via symphonia
//! - `full` - All extraction features
//!
//! Plain text and HTML extraction are always available.
//!
//! # Example
//!
//! ```ignore
//! use satchel_extractors::{ContentExtractor, ExtractionPipeline, ExtractionRequest};
//!
//! let pipeline = ExtractionPipeline::with_defaults();
//! let request = ExtractionRequest::new(pdf_bytes).with_max_chars(Some(100_000));
//! let extracted = pipeline.extract(&request)?;
//! println!("{:?}: {}", extracted.title, extracted.text);
//! ```

mod date;
pub mod detect;
mod error;
mod factory;
mod html;
pub mod language;
mod pipeline;
mod text;
pub mod truncate;
mod types;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

#[cfg(feature = "audio")]
mod audio;

pub use date::parse_date;
pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use html::HtmlExtractor;
pub use pipeline::ExtractionPipeline;
pub use text::TextExtractor;
pub use types::{ExtractedContent, ExtractionRequest, Modality};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

#[cfg(feature = "audio")]
pub use audio::AudioExtractor;

/// Per-format extractor - one implementation per document format.
///
/// Implementations are synchronous; callers that need to keep an async
/// runtime responsive move the call onto a blocking thread themselves.
pub trait Extractor: Send + Sync {
    /// Extract text content and metadata from bytes.
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent>;

    /// Supported MIME types for this extractor.
    fn supported_types(&self) -> &[&str];

    /// Check if this extractor handles the given MIME type.
    fn supports(&self, mime_type: &str) -> bool {
        self.supported_types().contains(&mime_type)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}

/// The content-extraction capability consumed by the attachment mapper.
///
/// Given the payload bytes, an optional content-type hint and an optional
/// character limit, produce extracted text plus metadata. Failures are
/// reported as [`ExtractError`]; [`ExtractError::is_empty_content`]
/// separates "nothing to extract" from parse faults.
pub trait ContentExtractor: Send + Sync {
    /// Extract the request's payload.
    ///
    /// When `request.max_chars` is set, the returned text holds at most that
    /// many characters.
    fn extract(&self, request: &ExtractionRequest) -> ExtractResult<ExtractedContent>;
}
