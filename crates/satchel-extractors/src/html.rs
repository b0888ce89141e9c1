//! HTML and XHTML extraction using scraper.
//!
//! Body text is collected with block elements separated by newlines;
//! `script`, `style`, `noscript` and `head` are skipped. Title, author,
//! keywords, date and language come from the head.

use scraper::{ElementRef, Html, Selector};

use crate::date::parse_date;
use crate::error::{ExtractError, ExtractResult};
use crate::text::TextExtractor;
use crate::types::{non_empty, ExtractedContent, Modality};
use crate::Extractor;

/// Extractor for HTML and XHTML documents.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create a new HTML extractor.
    pub fn new() -> Self {
        Self
    }

    fn extract_title(document: &Html) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| non_empty(el.text().collect::<String>()))
    }

    /// Value of the first `<meta name=...>` whose name matches one of
    /// `names`, case-insensitively.
    fn meta_content(document: &Html, names: &[&str]) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        document.select(&selector).find_map(|meta| {
            let element = meta.value();
            let name = element
                .attr("name")
                .or_else(|| element.attr("http-equiv"))?;
            if names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                element.attr("content").and_then(non_empty)
            } else {
                None
            }
        })
    }

    fn extract_language(document: &Html) -> Option<String> {
        let root = document.root_element();
        root.value()
            .attr("lang")
            .or_else(|| root.value().attr("xml:lang"))
            .and_then(non_empty)
            .or_else(|| Self::meta_content(document, &["content-language", "dc.language"]))
    }

    fn extract_text(document: &Html) -> String {
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| document.select(&sel).next());

        let text = match body {
            Some(body) => Self::extract_element_text(&body),
            None => Self::extract_element_text(&document.root_element()),
        };

        Self::normalize_text(&text)
    }

    fn extract_element_text(element: &ElementRef) -> String {
        let mut text = String::new();

        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag_name = el.value().name();

                if matches!(tag_name, "script" | "style" | "noscript" | "head") {
                    continue;
                }

                let is_block = matches!(
                    tag_name,
                    "p" | "div"
                        | "h1"
                        | "h2"
                        | "h3"
                        | "h4"
                        | "h5"
                        | "h6"
                        | "br"
                        | "li"
                        | "tr"
                        | "td"
                        | "th"
                );
                if is_block && !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }

                text.push_str(&Self::extract_element_text(&el));

                if is_block {
                    text.push('\n');
                }
            } else if let Some(txt) = node.value().as_text() {
                text.push_str(txt);
            }
        }

        text
    }

    fn normalize_text(text: &str) -> String {
        text.lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let raw = TextExtractor::decode(content);
        let document = Html::parse_document(&raw);

        let text = Self::extract_text(&document);
        let title = Self::extract_title(&document);

        if text.is_empty() && title.is_none() {
            return Err(ExtractError::EmptyContent);
        }

        Ok(ExtractedContent::new(text, Modality::Html)
            .with_title(title)
            .with_author(Self::meta_content(&document, &["author", "dc.creator"]))
            .with_keywords(Self::meta_content(&document, &["keywords", "dc.subject"]))
            .with_date(
                Self::meta_content(&document, &["date", "dcterms.created", "dc.date"])
                    .as_deref()
                    .and_then(parse_date),
            )
            .with_language(Self::extract_language(&document)))
    }

    fn supported_types(&self) -> &[&str] {
        &["text/html", "application/xhtml+xml"]
    }

    fn name(&self) -> &str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" lang="en">
<head>
    <title>XHTML test document</title>
    <meta name="Author" content="kimchy" />
    <meta name="Keywords" content="elasticsearch,cool,bonsai" />
    <meta name="date" content="2011-02-21" />
    <style>p { color: red; }</style>
</head>
<body>
<script>var ignored = "scripted";</script>
<p>
    This document tests the ability of the extractor to pull content
    from an <a href="http://www.w3.org/TR/xhtml1/">XHTML document</a>.
</p>
<div>Second block</div>
</body>
</html>"#;

    #[test]
    fn test_html_extractor_creation() {
        let extractor = HtmlExtractor::new();
        assert_eq!(extractor.name(), "html");
        assert!(extractor.supports("text/html"));
        assert!(extractor.supports("application/xhtml+xml"));
        assert!(!extractor.supports("text/plain"));
    }

    #[test]
    fn test_extracts_metadata() {
        let result = HtmlExtractor::new().extract(XHTML.as_bytes()).unwrap();
        assert_eq!(result.title.as_deref(), Some("XHTML test document"));
        assert_eq!(result.author.as_deref(), Some("kimchy"));
        assert_eq!(result.keywords.as_deref(), Some("elasticsearch,cool,bonsai"));
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.date.map(|d| d.year()), Some(2011));
        assert_eq!(result.modality, Modality::Html);
    }

    #[test]
    fn test_extracts_body_text_only() {
        let result = HtmlExtractor::new().extract(XHTML.as_bytes()).unwrap();
        assert!(result.text.contains("tests the ability"));
        assert!(result.text.contains("XHTML document"));
        assert!(result.text.contains("Second block"));
        assert!(!result.text.contains("scripted"));
        assert!(!result.text.contains("color: red"));
        assert!(!result.text.contains("XHTML test document"));
    }

    #[test]
    fn test_empty_markup_is_empty_content() {
        let result = HtmlExtractor::new().extract(b"<html><body>  </body></html>");
        assert!(matches!(result, Err(ExtractError::EmptyContent)));
    }

    #[test]
    fn test_title_only_document_is_kept() {
        let result = HtmlExtractor::new()
            .extract(b"<html><head><title>Only a title</title></head><body></body></html>")
            .unwrap();
        assert!(result.text.is_empty());
        assert_eq!(result.title.as_deref(), Some("Only a title"));
    }
}
