//! Content-type detection for raw payloads.
//!
//! Resolution order: explicit hint, magic bytes, resource name, then a
//! text check for plain text.

/// MIME type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

const SNIFF_WINDOW: usize = 1024;

/// Share of printable bytes a non-UTF-8 payload needs to pass as text.
const MIN_PRINTABLE_RATIO: f64 = 0.95;

/// Normalise a MIME type: drop parameters, trim and lowercase.
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Determine the MIME type of `content`.
pub fn detect_content_type(content: &[u8], hint: Option<&str>, name: Option<&str>) -> String {
    if let Some(hint) = hint.map(essence).filter(|h| !h.is_empty()) {
        return hint;
    }

    if let Some(sniffed) = sniff_magic(content) {
        return sniffed.to_string();
    }

    if let Some(guessed) = name.and_then(|n| mime_guess::from_path(n).first()) {
        return guessed.essence_str().to_string();
    }

    if looks_like_text(strip_utf8_bom(content)) {
        return "text/plain".to_string();
    }

    OCTET_STREAM.to_string()
}

/// Identify well-known formats by their leading bytes.
pub fn sniff_magic(content: &[u8]) -> Option<&'static str> {
    if content.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }

    if content.starts_with(b"PK\x03\x04") {
        return if contains(content, b"word/") {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        } else {
            Some("application/zip")
        };
    }

    if content.starts_with(&[0xFF, 0xFE]) || content.starts_with(&[0xFE, 0xFF]) {
        return Some("text/plain");
    }

    if content.starts_with(b"ID3") || is_mpeg_frame_sync(content) {
        return Some("audio/mpeg");
    }
    if content.len() >= 12 && content.starts_with(b"RIFF") && &content[8..12] == b"WAVE" {
        return Some("audio/wav");
    }
    if content.starts_with(b"fLaC") {
        return Some("audio/flac");
    }
    if content.starts_with(b"OggS") {
        return Some("audio/ogg");
    }

    sniff_markup(content)
}

/// Whether `content` reads as text: UTF-8 (possibly cut inside its last
/// character), or NUL-free bytes that are almost all printable, as written
/// by single-byte encodings such as Latin-1 or Windows-1252.
pub fn looks_like_text(content: &[u8]) -> bool {
    match std::str::from_utf8(content) {
        Ok(_) => true,
        Err(e) if e.error_len().is_none() => true,
        Err(_) => {
            if content.contains(&0) {
                return false;
            }
            let printable = content.iter().filter(|&&b| is_printable(b)).count();
            printable as f64 >= content.len() as f64 * MIN_PRINTABLE_RATIO
        }
    }
}

fn is_printable(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r' | 0x0C) || (0x20..0x7F).contains(&byte) || byte >= 0x80
}

/// Markup counts as HTML only when the root element opens the document,
/// after an optional XML prolog and comments.
fn sniff_markup(content: &[u8]) -> Option<&'static str> {
    let body = strip_utf8_bom(content);
    let window = &body[..body.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window).to_ascii_lowercase();
    let head = skip_comments(&head);

    if let Some(rest) = head.strip_prefix("<?xml") {
        let rest = rest.split_once("?>").map_or("", |(_, r)| r);
        return opens_html(skip_comments(rest)).then_some("application/xhtml+xml");
    }
    opens_html(head).then_some("text/html")
}

fn skip_comments(mut markup: &str) -> &str {
    loop {
        markup = markup.trim_start();
        match markup.strip_prefix("<!--") {
            Some(rest) => markup = rest.split_once("-->").map_or("", |(_, r)| r),
            None => return markup,
        }
    }
}

fn opens_html(markup: &str) -> bool {
    markup.starts_with("<!doctype html") || markup.starts_with("<html")
}

fn is_mpeg_frame_sync(content: &[u8]) -> bool {
    content.len() >= 2 && content[0] == 0xFF && (content[1] & 0xE0) == 0xE0
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn bom_len(content: &[u8]) -> usize {
    if content.starts_with(&[0xEF, 0xBB, 0xBF]) {
        3
    } else {
        0
    }
}

/// Drop a leading UTF-8 byte-order mark.
pub fn strip_utf8_bom(content: &[u8]) -> &[u8] {
    &content[bom_len(content)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wins_and_is_normalised() {
        let detected = detect_content_type(b"%PDF-1.4", Some("Text/HTML; charset=UTF-8"), None);
        assert_eq!(detected, "text/html");
    }

    #[test]
    fn test_blank_hint_is_ignored() {
        assert_eq!(detect_content_type(b"%PDF-1.7", Some("  "), None), "application/pdf");
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(sniff_magic(b"%PDF-1.7\n"), Some("application/pdf"));
        assert_eq!(sniff_magic(b"ID3\x03\x00\x00\x00\x00\x00\x00"), Some("audio/mpeg"));
        assert_eq!(sniff_magic(&[0xFF, 0xFB, 0x90, 0x64]), Some("audio/mpeg"));
        assert_eq!(sniff_magic(b"RIFF\x24\x00\x00\x00WAVEfmt "), Some("audio/wav"));
        assert_eq!(sniff_magic(b"fLaC\x00\x00\x00\x22"), Some("audio/flac"));
        assert_eq!(sniff_magic(b"OggS\x00\x02"), Some("audio/ogg"));
        assert_eq!(sniff_magic(&[0xFF, 0xFE, b'h', 0x00]), Some("text/plain"));
        assert_eq!(sniff_magic(b"PK\x03\x04....word/document.xml"), Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"));
        assert_eq!(sniff_magic(b"PK\x03\x04....data.csv"), Some("application/zip"));
    }

    #[test]
    fn test_markup_sniffing() {
        assert_eq!(sniff_magic(b"  <!DOCTYPE html><html></html>"), Some("text/html"));
        assert_eq!(sniff_magic(b"<html><body>x</body></html>"), Some("text/html"));
        assert_eq!(
            sniff_magic(b"<?xml version=\"1.0\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">"),
            Some("application/xhtml+xml")
        );
        assert_eq!(sniff_magic(b"<?xml version=\"1.0\"?><feed/>"), None);
        assert_eq!(sniff_magic("\u{feff}<html></html>".as_bytes()), Some("text/html"));
        assert_eq!(
            sniff_magic(b"<!-- generated -->\n<!-- twice -->\n<html><body>x</body></html>"),
            Some("text/html")
        );
        assert_eq!(
            sniff_magic(b"<?xml version=\"1.0\"?>\n<!-- note -->\n<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\">\n<html>"),
            Some("application/xhtml+xml")
        );
    }

    #[test]
    fn test_text_mentioning_html_tag_is_not_markup() {
        let notes = b"Release notes\n\nThe template now starts with <html lang=\"en\"> again.\n";
        assert_eq!(sniff_magic(notes), None);
        assert_eq!(detect_content_type(notes, None, None), "text/plain");
        assert_eq!(sniff_magic(b"<?xml version=\"1.0\"?><feed><title>&lt;html</title></feed>"), None);
    }

    #[test]
    fn test_utf8_cut_inside_last_character_is_text() {
        let cut = &"Begin héllo".as_bytes()[..8];
        assert!(std::str::from_utf8(cut).is_err());
        assert_eq!(detect_content_type(cut, None, None), "text/plain");
    }

    #[test]
    fn test_single_byte_encoded_text() {
        assert_eq!(detect_content_type(b"Caf\xe9 cr\xe8me br\xfbl\xe9e", None, None), "text/plain");
        assert_eq!(detect_content_type(b"\x93quoted\x94 \x96 dash", None, None), "text/plain");
        assert!(!looks_like_text(&[0x01, 0x02, 0x03, 0xC3, 0x28, 0x04, 0x05]));
    }

    #[test]
    fn test_name_then_text_fallbacks() {
        assert_eq!(detect_content_type(b"a,b\n1,2\n", None, Some("data.csv")), "text/csv");
        assert_eq!(detect_content_type(b"just words", None, None), "text/plain");
        assert_eq!(detect_content_type(&[0x00, 0xC3, 0x28, 0x9F], None, None), OCTET_STREAM);
    }
}
