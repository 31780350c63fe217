//! Error types for docnorm operations.

use std::path::{Path, PathBuf};

use docnorm_extractors::ExtractError;
use thiserror::Error;

/// Result type alias for docnorm operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Main error type for all docnorm operations.
///
/// Encoding ambiguity never shows up here: detection and conversion always
/// resolve to a best-effort string.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The path did not exist when it was checked.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Generic text file exceeds the plain-text size ceiling.
    #[error("File too large (max {limit_kb}KB)")]
    FileTooLarge { limit_kb: u64 },

    /// File was classified as binary and no extractor handles it.
    #[error("Unsupported binary file format: {extension}")]
    UnsupportedBinaryFormat { extension: String },

    /// A PDF or DOCX extractor failed.
    #[error("Failed to extract text from {format} file")]
    FormatExtractionFailed {
        format: String,
        #[source]
        source: ExtractError,
    },

    /// Notebook content is not valid JSON.
    #[error("Malformed notebook: {0}")]
    MalformedNotebook(#[from] serde_json::Error),

    /// Unexpected read failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NormalizeError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Wrap an I/O error on `path`, keeping a vanished file as `NotFound`.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(path),
            _ => Self::Io(err),
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_names_the_file() {
        let err = NormalizeError::not_found("/data/missing.txt");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "File not found: /data/missing.txt");
    }

    #[test]
    fn test_from_io_keeps_not_found() {
        let path = Path::new("gone.txt");
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(NormalizeError::from_io(path, missing).is_not_found());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            NormalizeError::from_io(path, denied),
            NormalizeError::Io(_)
        ));
    }

    #[test]
    fn test_file_too_large_message() {
        let err = NormalizeError::FileTooLarge { limit_kb: 300 };
        assert_eq!(err.to_string(), "File too large (max 300KB)");
    }

    #[test]
    fn test_extraction_failure_keeps_cause() {
        let err = NormalizeError::FormatExtractionFailed {
            format: "pdf".to_string(),
            source: ExtractError::ExtractionFailed("bad xref".to_string()),
        };
        assert_eq!(err.to_string(), "Failed to extract text from pdf file");
        let cause = err.source().map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("Extraction failed: bad xref"));
    }
}
