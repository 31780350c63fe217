//! Factory for creating extractors.

use std::sync::Arc;

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "docx")]
use crate::DocxExtractor;

/// Factory for creating document extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
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

    /// Create a DOCX extractor with custom table handling.
    #[cfg(feature = "docx")]
    pub fn docx_configured(preserve_tables: bool) -> Arc<dyn Extractor> {
        Arc::new(DocxExtractor::new().with_tables(preserve_tables))
    }

    /// Create extractor for a given format name (file extension).
    pub fn for_format(format: &str) -> ExtractResult<Arc<dyn Extractor>> {
        match format.to_ascii_lowercase().as_str() {
            #[cfg(feature = "pdf")]
            "pdf" => Ok(Self::pdf()),

            #[cfg(feature = "docx")]
            "docx" => Ok(Self::docx()),

            _ => Err(ExtractError::UnsupportedFormat(format.to_string())),
        }
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "docx")]
        extractors.push(Self::docx());

        extractors
    }
}
