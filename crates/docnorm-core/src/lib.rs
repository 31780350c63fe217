//! docnorm-core - Turn any file into canonical UTF-8 text.
//!
//! Given a path, the pipeline picks a handling path from the extension:
//!
//! - `.pdf`, `.docx` - delegated to `docnorm-extractors`
//! - `.ipynb` - charset-decoded, then flattened cell by cell
//! - anything else - rejected if binary or larger than 300 KB, otherwise
//!   decoded with statistical charset detection
//!
//! Every call is independent: no caching, no shared mutable state.
//!
//! # Example
//!
//! ```ignore
//! let text = docnorm_core::extract_text("notes/analysis.ipynb").await?;
//! let encoding = docnorm_core::detect_encoding("legacy/readme.txt").await?;
//! ```

pub mod classify;
pub mod encoding;
pub mod error;
pub mod notebook;
pub mod reader;

use std::path::Path;

pub use classify::{BinaryClassifier, Classification, ContentSniffer};
pub use encoding::{detect_encoding, read_with_encoding, Detection};
pub use error::{NormalizeError, NormalizeResult};
pub use notebook::extract_notebook_text;
pub use reader::{DocumentKind, DocumentReader, MAX_TEXT_FILE_KB};

/// Extract the text of any supported file using the default reader.
pub async fn extract_text(path: impl AsRef<Path>) -> NormalizeResult<String> {
    DocumentReader::new().extract_text(path).await
}
