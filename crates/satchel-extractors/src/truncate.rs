//! Character-limit truncation of extracted text.
//!
//! Limits count Unicode scalar values. The cut always lands on a grapheme
//! cluster boundary, so neither a multi-byte character nor a base character
//! with its combining marks is ever split.

use unicode_segmentation::UnicodeSegmentation;

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    // Byte length bounds the character count from above.
    if text.len() <= max_chars {
        return text;
    }

    let mut count = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let width = grapheme.chars().count();
        if count + width > max_chars {
            return &text[..offset];
        }
        count += width;
    }
    text
}

/// Truncate `text` in place. Returns true if anything was removed.
pub fn truncate_in_place(text: &mut String, max_chars: usize) -> bool {
    let end = truncate_chars(text, max_chars).len();
    if end < text.len() {
        text.truncate(end);
        true
    } else {
        false
    }
}
