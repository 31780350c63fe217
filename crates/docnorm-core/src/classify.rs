//! Binary-vs-text classification for files without a dedicated extractor.

use std::path::Path;

use async_trait::async_trait;
use encoding_rs::Encoding;
use infer::MatcherType;
use tokio::io::AsyncReadExt;

/// Bytes read from the head of a file for classification.
const SNIFF_SIZE: u64 = 8192;

/// Verdict of a [`BinaryClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Text,
    Binary,
    /// The classifier could not decide (e.g. the file could not be read).
    Inconclusive,
}

impl Classification {
    /// Inconclusive results count as text: better to try reading a file
    /// than to reject it on a failed read.
    pub fn is_binary(self) -> bool {
        self == Classification::Binary
    }
}

/// Decides whether a file holds binary content.
#[async_trait]
pub trait BinaryClassifier: Send + Sync {
    async fn classify(&self, path: &Path) -> Classification;
}

/// Default classifier: magic bytes via `infer`, then a NUL-byte scan.
///
/// Buffers opening with a Unicode byte-order mark are always text, so
/// UTF-16 files are not mistaken for binary because of their NUL bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl ContentSniffer {
    pub fn new() -> Self {
        Self
    }

    /// Classify an in-memory buffer (the head of a file).
    pub fn classify_buffer(buffer: &[u8]) -> Classification {
        if buffer.is_empty() || Encoding::for_bom(buffer).is_some() {
            return Classification::Text;
        }

        if let Some(kind) = infer::get(buffer) {
            return match kind.matcher_type() {
                MatcherType::Text => Classification::Text,
                _ => Classification::Binary,
            };
        }

        if buffer.contains(&0) {
            Classification::Binary
        } else {
            Classification::Text
        }
    }
}

#[async_trait]
impl BinaryClassifier for ContentSniffer {
    async fn classify(&self, path: &Path) -> Classification {
        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not open file for sniffing");
                return Classification::Inconclusive;
            }
        };

        let mut buffer = Vec::with_capacity(SNIFF_SIZE as usize);
        if let Err(e) = file.take(SNIFF_SIZE).read_to_end(&mut buffer).await {
            tracing::debug!(path = %path.display(), error = %e, "Could not read file for sniffing");
            return Classification::Inconclusive;
        }

        Self::classify_buffer(&buffer)
    }
}
