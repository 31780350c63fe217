//! Format dispatch: route a path to the extractor that can turn it into text.

use std::path::Path;
use std::sync::Arc;

use docnorm_extractors::ExtractionPipeline;
use strum::EnumString;
use tracing::{debug, warn};

use crate::classify::{BinaryClassifier, ContentSniffer};
use crate::encoding::{ensure_exists, read_with_encoding};
use crate::error::{NormalizeError, NormalizeResult};
use crate::notebook::extract_notebook_text;

/// Size ceiling, in KB, for files read through the generic text path.
pub const MAX_TEXT_FILE_KB: u64 = 300;

const MAX_TEXT_FILE_BYTES: u64 = MAX_TEXT_FILE_KB * 1024;

/// Handling path chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentKind {
    Pdf,
    Docx,
    #[strum(serialize = "ipynb")]
    Notebook,
    /// Anything else, including no extension at all.
    #[strum(disabled)]
    Generic,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Self {
        extension.parse().unwrap_or(DocumentKind::Generic)
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(&extension_of(path))
    }

    /// Format name used for extractor routing and in error messages.
    pub fn format(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Notebook => "ipynb",
            DocumentKind::Generic => "text",
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Turns any file path into UTF-8 text.
///
/// - `.pdf` / `.docx` go to the registered extractor, output verbatim.
/// - `.ipynb` is decoded and flattened cell by cell.
/// - Everything else must pass the binary classifier and the size
///   ceiling, then is decoded with charset detection.
///
/// Holds no mutable state; one reader can serve any number of concurrent
/// calls.
#[derive(Clone)]
pub struct DocumentReader {
    pipeline: ExtractionPipeline,
    classifier: Arc<dyn BinaryClassifier>,
}

impl DocumentReader {
    /// Create a reader with the default extractors and content sniffer.
    pub fn new() -> Self {
        Self {
            pipeline: ExtractionPipeline::with_defaults(),
            classifier: Arc::new(ContentSniffer::new()),
        }
    }

    /// Replace the PDF/DOCX extraction pipeline.
    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the binary classifier used for generic files.
    pub fn with_classifier(mut self, classifier: Arc<dyn BinaryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Extract the text content of the file at `path`.
    pub async fn extract_text(&self, path: impl AsRef<Path>) -> NormalizeResult<String> {
        let path = path.as_ref();
        ensure_exists(path).await?;

        let kind = DocumentKind::from_path(path);
        debug!(path = %path.display(), kind = kind.format(), "Extracting text");

        match kind {
            DocumentKind::Pdf | DocumentKind::Docx => self.extract_document(path, kind).await,
            DocumentKind::Notebook => {
                let json = read_with_encoding(path).await?;
                extract_notebook_text(&json)
            }
            DocumentKind::Generic => self.read_plain_text(path).await,
        }
    }

    async fn extract_document(&self, path: &Path, kind: DocumentKind) -> NormalizeResult<String> {
        let format = kind.format();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| NormalizeError::from_io(path, e))?;

        self.pipeline
            .extract(&bytes, format)
            .await
            .map_err(|source| {
                warn!(
                    path = %path.display(),
                    format,
                    error = %source,
                    "Document extractor failed"
                );
                NormalizeError::FormatExtractionFailed {
                    format: format.to_string(),
                    source,
                }
            })
    }

    async fn read_plain_text(&self, path: &Path) -> NormalizeResult<String> {
        if self.classifier.classify(path).await.is_binary() {
            return Err(NormalizeError::UnsupportedBinaryFormat {
                extension: extension_of(path),
            });
        }

        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| NormalizeError::from_io(path, e))?
            .len();
        if size > MAX_TEXT_FILE_BYTES {
            debug!(path = %path.display(), size, "Text file exceeds size ceiling");
            return Err(NormalizeError::FileTooLarge {
                limit_kb: MAX_TEXT_FILE_KB,
            });
        }

        read_with_encoding(path).await
    }
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}
