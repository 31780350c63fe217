//! Extraction pipeline for routing documents to the right extractor.

use std::sync::Arc;

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;

/// Pipeline for extracting text using registered extractors.
///
/// Routes content to the first registered extractor that supports the
/// format name. Cloning is cheap; extractors are shared.
#[derive(Clone)]
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Create new empty pipeline.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create pipeline with all available extractors.
    pub fn with_defaults() -> Self {
        Self {
            extractors: crate::ExtractorFactory::all(),
        }
    }

    /// Add an extractor to the pipeline.
    ///
    /// Extractors added later only see formats no earlier extractor claims.
    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Extract text using the appropriate extractor for the format.
    pub async fn extract(&self, content: &[u8], format: &str) -> ExtractResult<String> {
        match self.extractors.iter().find(|e| e.supports(format)) {
            Some(extractor) => {
                tracing::debug!(format, extractor = extractor.name(), "Routing document");
                extractor.extract(content).await
            }
            None => Err(ExtractError::UnsupportedFormat(format.to_string())),
        }
    }

    /// Check if pipeline can handle a given format.
    pub fn supports(&self, format: &str) -> bool {
        self.extractors.iter().any(|e| e.supports(format))
    }

    /// List all supported formats.
    pub fn supported_formats(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.supported_formats().iter().copied())
            .collect()
    }

    /// Get the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the pipeline has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
