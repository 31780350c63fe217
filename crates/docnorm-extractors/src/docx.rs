//! DOCX content extraction using docx-rs.
//!
//! Extracts the raw text of DOCX files: paragraphs in document order,
//! optionally with table rows flattened into `a | b | c` lines.

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;
use async_trait::async_trait;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableChild, TableRowChild};

/// DOCX content extractor using docx-rs library.
///
/// Wraps synchronous docx-rs calls in spawn_blocking to avoid blocking
/// the async runtime.
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    /// Whether to keep table rows together as `|`-separated lines.
    preserve_tables: bool,
}

impl DocxExtractor {
    /// Create new DOCX extractor with default settings.
    pub fn new() -> Self {
        Self {
            preserve_tables: true,
        }
    }

    /// Configure whether to preserve table row structure.
    pub fn with_tables(mut self, preserve: bool) -> Self {
        self.preserve_tables = preserve;
        self
    }

    /// Extract text synchronously (called within spawn_blocking).
    fn extract_sync(content: Vec<u8>, preserve_tables: bool) -> ExtractResult<String> {
        let docx = docx_rs::read_docx(&content)
            .map_err(|e| ExtractError::Docx(format!("Failed to parse DOCX: {}", e)))?;

        let mut text_parts: Vec<String> = Vec::new();

        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let para_text = Self::extract_paragraph_text(&p);
                    if !para_text.trim().is_empty() {
                        text_parts.push(para_text);
                    }
                }
                DocumentChild::Table(t) => {
                    if preserve_tables {
                        let table_text = Self::extract_table_text(&t);
                        if !table_text.trim().is_empty() {
                            text_parts.push(table_text);
                        }
                    } else {
                        for row in &t.rows {
                            let TableChild::TableRow(r) = row;
                            for cell in &r.cells {
                                let TableRowChild::TableCell(c) = cell;
                                for child in &c.children {
                                    if let docx_rs::TableCellContent::Paragraph(p) = child {
                                        let cell_text = Self::extract_paragraph_text(p);
                                        if !cell_text.trim().is_empty() {
                                            text_parts.push(cell_text);
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                // Bookmarks, section properties and the like carry no text.
                _ => {}
            }
        }

        Ok(text_parts.join("\n"))
    }

    /// Extract text from a paragraph.
    fn extract_paragraph_text(p: &docx_rs::Paragraph) -> String {
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

    /// Extract text from a table, one line per row.
    fn extract_table_text(t: &docx_rs::Table) -> String {
        let mut rows: Vec<String> = Vec::new();

        for row in &t.rows {
            let TableChild::TableRow(r) = row;
            let mut cells: Vec<String> = Vec::new();
            for cell in &r.cells {
                let TableRowChild::TableCell(c) = cell;
                let mut cell_text = String::new();
                for child in &c.children {
                    if let docx_rs::TableCellContent::Paragraph(p) = child {
                        let para = Self::extract_paragraph_text(p);
                        if !cell_text.is_empty() && !para.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(&para);
                    }
                }
                cells.push(cell_text.trim().to_string());
            }
            rows.push(cells.join(" | "));
        }

        rows.join("\n")
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for DocxExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<String> {
        let content = content.to_vec();
        let content_len = content.len();
        let preserve_tables = self.preserve_tables;

        let text = tokio::task::spawn_blocking(move || {
            Self::extract_sync(content, preserve_tables)
        })
        .await??;

        tracing::debug!(bytes = content_len, chars = text.len(), "Extracted DOCX text");
        Ok(text)
    }

    fn supported_formats(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx-rs"
    }
}
