//! PDF content extraction using pdf-extract.

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;
use async_trait::async_trait;

/// PDF content extractor using pdf-extract library.
///
/// Extracts the text layer of PDF files, wrapping synchronous pdf-extract
/// calls in spawn_blocking to avoid blocking the async runtime. Image-only
/// PDFs yield whatever (possibly empty) text layer they carry; there is no
/// OCR fallback.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text synchronously (called within spawn_blocking).
    fn extract_sync(content: Vec<u8>) -> ExtractResult<String> {
        pdf_extract::extract_text_from_mem(&content)
            .map_err(|e| ExtractError::Pdf(format!("Failed to parse PDF: {}", e)))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<String> {
        if content.is_empty() {
            return Err(ExtractError::Pdf("empty input".to_string()));
        }

        let content = content.to_vec();
        let content_len = content.len();

        // pdf-extract can panic on broken cross-reference tables; a panic
        // surfaces here as a JoinError.
        let text = tokio::task::spawn_blocking(move || Self::extract_sync(content)).await??;

        tracing::debug!(bytes = content_len, chars = text.len(), "Extracted PDF text");
        Ok(text)
    }

    fn supported_formats(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_creation() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.name(), "pdf-extract");
        assert!(extractor.supports("pdf"));
        assert!(extractor.supports("PDF"));
        assert!(!extractor.supports("docx"));
    }

    #[tokio::test]
    async fn test_pdf_extractor_empty_content() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(&[]).await;
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_pdf_extractor_garbage_content() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(b"this is not a pdf document").await;
        assert!(result.is_err());
    }
}
