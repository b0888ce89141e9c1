//! Plain text extraction.
//!
//! Decodes UTF-8 and UTF-16 (when a byte-order mark says so). Payloads
//! without a single valid multi-byte UTF-8 sequence are read as Latin-1; a
//! character cut off at the end of the payload is dropped.

use crate::detect::strip_utf8_bom;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{ExtractedContent, Modality};
use crate::Extractor;

/// Extractor for plain text payloads.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self
    }

    /// Decode payload bytes into a string.
    pub(crate) fn decode(content: &[u8]) -> String {
        if let Some(rest) = content.strip_prefix(&[0xFF, 0xFE]) {
            return decode_utf16(rest, u16::from_le_bytes);
        }
        if let Some(rest) = content.strip_prefix(&[0xFE, 0xFF]) {
            return decode_utf16(rest, u16::from_be_bytes);
        }
        decode_utf8_or_latin1(strip_utf8_bom(content))
    }
}

fn decode_utf8_or_latin1(content: &[u8]) -> String {
    let error = match std::str::from_utf8(content) {
        Ok(text) => return text.to_string(),
        Err(e) => e,
    };
    if error.error_len().is_none() {
        return String::from_utf8_lossy(&content[..error.valid_up_to()]).into_owned();
    }

    let lossy = String::from_utf8_lossy(content);
    if lossy
        .chars()
        .any(|c| !c.is_ascii() && c != char::REPLACEMENT_CHARACTER)
    {
        return lossy.into_owned();
    }
    content.iter().map(|&b| char::from(b)).collect()
}

fn decode_utf16(content: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = content
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

impl Extractor for TextExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let text = Self::decode(content);

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        Ok(ExtractedContent::new(text, Modality::Text))
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain", "text/csv", "text/markdown", "text/x-markdown"]
    }

    fn name(&self) -> &str {
        "text"
    }
}
