//! DOCX content extraction using docx-rs.
//!
//! Paragraph and table text is joined with newlines. The first paragraph
//! styled `Title` becomes the document title.

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild};

use crate::error::{ExtractError, ExtractResult};
use crate::types::{non_empty, ExtractedContent, Modality};
use crate::Extractor;

/// DOCX content extractor.
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    /// Keep table rows as `cell | cell` lines instead of loose cell text.
    preserve_tables: bool,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Text and structure gathered from the document body.
#[derive(Debug, Default)]
struct DocxBody {
    parts: Vec<String>,
    title: Option<String>,
}

impl DocxExtractor {
    /// Create new DOCX extractor with default settings.
    pub fn new() -> Self {
        Self {
            preserve_tables: true,
        }
    }

    /// Configure whether to preserve table structure.
    pub fn with_tables(mut self, preserve: bool) -> Self {
        self.preserve_tables = preserve;
        self
    }

    fn read_body(&self, content: &[u8]) -> ExtractResult<DocxBody> {
        let docx = docx_rs::read_docx(content)
            .map_err(|e| ExtractError::Docx(format!("Failed to parse DOCX: {}", e)))?;

        let mut body = DocxBody::default();

        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let text = paragraph_text(&p);
                    let Some(trimmed) = non_empty(&text) else {
                        continue;
                    };

                    let is_title = p
                        .property
                        .style
                        .as_ref()
                        .is_some_and(|style| style.val.eq_ignore_ascii_case("title"));
                    if is_title && body.title.is_none() {
                        body.title = Some(trimmed);
                    }

                    body.parts.push(text);
                }
                DocumentChild::Table(t) => {
                    if self.preserve_tables {
                        let text = table_text(&t);
                        if !text.trim().is_empty() {
                            body.parts.push(text);
                        }
                    } else {
                        body.parts.extend(table_cells(&t).into_iter().filter(|c| !c.is_empty()));
                    }
                }
                _ => {}
            }
        }

        Ok(body)
    }
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => {
                for run_child in &r.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        for run_child in &r.children {
                            if let RunChild::Text(t) = run_child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    text
}

/// Text of every cell, row-major.
fn table_rows(t: &Table) -> Vec<Vec<String>> {
    t.rows
        .iter()
        .map(|row| {
            let TableChild::TableRow(r) = row;
            r.cells
                .iter()
                .map(|cell| {
                    let TableRowChild::TableCell(c) = cell;
                    c.children
                        .iter()
                        .filter_map(|child| match child {
                            TableCellContent::Paragraph(p) => non_empty(paragraph_text(p)),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect()
}

fn table_text(t: &Table) -> String {
    table_rows(t)
        .iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_cells(t: &Table) -> Vec<String> {
    table_rows(t).into_iter().flatten().collect()
}

impl Extractor for DocxExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let body = self.read_body(content)?;
        let text = body.parts.join("\n");

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        Ok(ExtractedContent::new(text, Modality::Docx).with_title(body.title))
    }

    fn supported_types(&self) -> &[&str] {
        &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/docx",
        ]
    }

    fn name(&self) -> &str {
        "docx-rs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, TableCell, TableRow};
    use std::io::Cursor;

    fn build_docx(docx: Docx) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    fn sample_docx() -> Vec<u8> {
        build_docx(
            Docx::new()
                .add_paragraph(
                    Paragraph::new()
                        .style("Title")
                        .add_run(Run::new().add_text("Quarterly report")),
                )
                .add_paragraph(
                    Paragraph::new()
                        .style("Heading1")
                        .add_run(Run::new().add_text("Logistics")),
                )
                .add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("Cargo transport volumes grew.")),
                )
                .add_table(Table::new(vec![TableRow::new(vec![
                    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Q1"))),
                    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("42"))),
                ])])),
        )
    }

    #[test]
    fn test_docx_extractor_creation() {
        let extractor = DocxExtractor::new();
        assert_eq!(extractor.name(), "docx-rs");
        assert!(extractor
            .supports("application/vnd.openxmlformats-officedocument.wordprocessingml.document"));
        assert!(extractor.supports("application/docx"));
        assert!(!extractor.supports("application/pdf"));
    }

    #[test]
    fn test_docx_extractor_empty_content() {
        let extractor = DocxExtractor::new();
        let result = extractor.extract(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_docx_extractor_configuration() {
        let extractor = DocxExtractor::new().with_tables(false);
        assert!(!extractor.preserve_tables);
    }

    #[test]
    fn test_extracts_text_title_and_tables() {
        let result = DocxExtractor::new().extract(&sample_docx()).unwrap();

        assert_eq!(result.title.as_deref(), Some("Quarterly report"));
        assert!(result.text.contains("Cargo transport volumes grew."));
        assert!(result.text.contains("Logistics"));
        assert!(result.text.contains("Q1 | 42"));
    }

    #[test]
    fn test_loose_table_cells() {
        let result = DocxExtractor::new()
            .with_tables(false)
            .extract(&sample_docx())
            .unwrap();
        assert!(!result.text.contains(" | "));
        assert!(result.text.lines().any(|l| l == "42"));
    }
}
