//! PDF content extraction.
//!
//! Text comes from pdf-extract; the document information dictionary
//! (title, author, keywords, creation date) is read with lopdf. Metadata
//! survives a text-extraction failure so a PDF with unreadable content
//! streams still yields its title.

use std::panic;

use lopdf::{Dictionary, Document, Object};
use tracing::warn;

use crate::date::parse_date;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{non_empty, ExtractedContent, Modality};
use crate::Extractor;

/// PDF content extractor.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

/// Values read from the trailer's `/Info` dictionary.
#[derive(Debug, Default)]
struct PdfInfo {
    title: Option<String>,
    author: Option<String>,
    keywords: Option<String>,
    creation_date: Option<String>,
}

impl PdfInfo {
    fn from_document(document: &Document) -> Self {
        let Some(info) = Self::info_dictionary(document) else {
            return Self::default();
        };

        let read = |key: &[u8]| info.get(key).ok().and_then(decode_text_string);

        Self {
            title: read(b"Title"),
            author: read(b"Author"),
            keywords: read(b"Keywords"),
            creation_date: read(b"CreationDate"),
        }
    }

    fn info_dictionary(document: &Document) -> Option<&Dictionary> {
        match document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => document.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.keywords.is_none()
    }
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// PDFDocEncoding (treated as Latin-1).
fn decode_text_string(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };

    let decoded = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    };

    non_empty(decoded)
}

impl PdfExtractor {
    /// Create new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Run pdf-extract, turning its panics on unusual font programs into
    /// ordinary errors.
    fn extract_text(content: &[u8]) -> Result<String, String> {
        panic::catch_unwind(|| pdf_extract::extract_text_from_mem(content))
            .map_err(|_| "pdf-extract panicked".to_string())?
            .map_err(|e| e.to_string())
    }

    fn normalize_text(text: &str) -> String {
        text.lines()
            .map(|l| l.trim_end())
            .filter(|l| !l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Extractor for PdfExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let document = Document::load_mem(content)
            .map_err(|e| ExtractError::Pdf(format!("Failed to parse PDF: {}", e)))?;

        let info = PdfInfo::from_document(&document);

        let text = match Self::extract_text(content) {
            Ok(text) => Self::normalize_text(&text),
            Err(e) if !info.is_empty() => {
                warn!(error = %e, "PDF text extraction failed, keeping document metadata");
                String::new()
            }
            Err(e) => {
                return Err(ExtractError::Pdf(format!("Failed to extract text: {}", e)));
            }
        };

        if text.is_empty() && info.is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        Ok(ExtractedContent::new(text, Modality::Pdf)
            .with_title(info.title)
            .with_author(info.author)
            .with_keywords(info.keywords)
            .with_date(info.creation_date.as_deref().and_then(parse_date)))
    }

    fn supported_types(&self) -> &[&str] {
        &["application/pdf", "application/x-pdf"]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream, StringFormat};

    /// Build a one-page PDF with an information dictionary.
    fn sample_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("cargo transport")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(b"Fire protection manual".to_vec(), StringFormat::Literal),
            "Author" => Object::String(b"Safety Office".to_vec(), StringFormat::Literal),
            "Keywords" => Object::String(b"fire, safety".to_vec(), StringFormat::Literal),
            "CreationDate" => Object::String(b"D:20130405101500Z".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_creation() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.name(), "pdf-extract");
        assert!(extractor.supports("application/pdf"));
        assert!(!extractor.supports("application/docx"));
    }

    #[test]
    fn test_reads_info_dictionary() {
        let result = PdfExtractor::new().extract(&sample_pdf()).unwrap();
        assert_eq!(result.title.as_deref(), Some("Fire protection manual"));
        assert_eq!(result.author.as_deref(), Some("Safety Office"));
        assert_eq!(result.keywords.as_deref(), Some("fire, safety"));
        assert_eq!(result.date.map(|d| d.year()), Some(2013));
        assert_eq!(result.modality, Modality::Pdf);
        assert_eq!(result.text, "cargo transport");
    }

    #[test]
    fn test_utf16_text_string() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Überblick".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let decoded = decode_text_string(&Object::String(bytes, StringFormat::Hexadecimal));
        assert_eq!(decoded.as_deref(), Some("Überblick"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = PdfExtractor::new().extract(b"%PDF-1.4\nthis is not really a pdf");
        assert!(result.is_err());
    }
}
