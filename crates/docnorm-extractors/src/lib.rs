//! docnorm-extractors - Text extraction for binary document formats.
//!
//! Provides extractors for PDF and DOCX content behind a unified
//! trait-based interface. Each extractor turns raw file bytes into plain
//! text; formatting is not preserved.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text extraction via pdf-extract
//! - `docx` (default) - DOCX text extraction via docx-rs
//!
//! # Example
//!
//! ```ignore
//! use docnorm_extractors::{ExtractionPipeline, ExtractorFactory};
//!
//! // Route by format name
//! let pipeline = ExtractionPipeline::with_defaults();
//! let text = pipeline.extract(&pdf_bytes, "pdf").await?;
//!
//! // Or use a single extractor directly
//! let docx = ExtractorFactory::docx();
//! let text = docx.extract(&docx_bytes).await?;
//! ```

mod error;
mod factory;
mod pipeline;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use pipeline::ExtractionPipeline;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

use async_trait::async_trait;

/// Core Extractor trait - all document extractors implement this.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract plain text from the raw document bytes.
    async fn extract(&self, content: &[u8]) -> ExtractResult<String>;

    /// Lowercase format names (file extensions without the dot) handled
    /// by this extractor.
    fn supported_formats(&self) -> &[&str];

    /// Check if this extractor handles the given format.
    fn supports(&self, format: &str) -> bool {
        self.supported_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
