//! Character encoding detection and conversion to UTF-8.
//!
//! Detection samples the head of a buffer, asks chardetng for a candidate
//! charset and scores it. The score of a legacy-encoding guess grows with
//! the amount of non-ASCII evidence in the sample and shrinks with malformed
//! sequences and control characters in the decoded text. Anything below
//! [`CONFIDENCE_THRESHOLD`] resolves to UTF-8.
//!
//! Detected names are reported in the converter vocabulary (`utf8`, `gbk`,
//! `win1252`, `latin2`, ...), see [`normalize_encoding_name`].
//!
//! Neither detection nor conversion ever fails on content. The only errors
//! surfaced by the path-level functions are a missing file and I/O failures
//! while reading the full content.

use std::collections::HashMap;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{
    Encoding, BIG5, EUC_JP, EUC_KR, GB18030, GBK, ISO_8859_10, ISO_8859_2, ISO_8859_3,
    ISO_8859_4, ISO_8859_5, ISO_8859_6, ISO_8859_7, ISO_8859_8, REPLACEMENT, SHIFT_JIS,
    UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252, WINDOWS_1253,
    WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257, WINDOWS_1258,
};
use once_cell::sync::Lazy;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::error::{NormalizeError, NormalizeResult};

/// Number of leading bytes fed to the charset classifier.
pub const SAMPLE_SIZE: usize = 4096;

/// Minimum confidence for a non-default encoding guess to be accepted.
pub const CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Encoding reported whenever detection is skipped, unsure or fails.
pub const DEFAULT_ENCODING: &str = "utf8";

/// Confidence ceiling for a guess chardetng itself does not vouch for.
const UNASSESSED_CONFIDENCE: f32 = 0.9;

/// Non-ASCII bytes a legacy-encoding guess needs before it carries full weight.
const EVIDENCE_BYTES: usize = 16;

/// Confidence lost per unit share of control characters in the decoded sample.
const CONTROL_PENALTY: f32 = 4.0;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detector vocabulary (lowercase) to converter vocabulary.
static CONVERTER_NAMES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut table: HashMap<String, String> = [
        ("ascii", "ascii"),
        ("utf-8", "utf8"),
        ("utf-16le", "utf16le"),
        ("utf-16be", "utf16be"),
        ("gbk", "gbk"),
        ("gb2312", "gb2312"),
        ("gb18030", "gb18030"),
        ("big5", "big5"),
        ("euc-jp", "eucjp"),
        ("shift_jis", "shiftjis"),
        ("euc-kr", "euckr"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect();

    for n in 1..=10 {
        table.insert(format!("iso-8859-{n}"), format!("latin{n}"));
    }
    for n in 1250..=1258 {
        table.insert(format!("windows-{n}"), format!("win{n}"));
    }
    table
});

/// Outcome of charset detection.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// The classifier produced a candidate at or above the threshold.
    Detected {
        /// Normalized (converter vocabulary) encoding name.
        name: String,
        /// Confidence in `[0, 1]` that produced the guess.
        confidence: f32,
    },
    /// Empty input, no usable candidate, or a failed sample read.
    Fallback,
}

impl Detection {
    /// Encoding name to convert with; `utf8` for [`Detection::Fallback`].
    pub fn name(&self) -> &str {
        match self {
            Detection::Detected { name, .. } => name,
            Detection::Fallback => DEFAULT_ENCODING,
        }
    }

    /// Confidence of the accepted guess, if there was one.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            Detection::Detected { confidence, .. } => Some(*confidence),
            Detection::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Detection::Fallback)
    }
}

/// Raw classifier output before thresholding.
struct Candidate {
    encoding: &'static Encoding,
    confidence: f32,
}

/// Map a detector encoding name onto the converter vocabulary.
///
/// Lookup is case-insensitive; unknown names come back lowercased.
pub fn normalize_encoding_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match CONVERTER_NAMES.get(&lower) {
        Some(converted) => converted.clone(),
        None => lower,
    }
}

/// Resolve a converter-vocabulary name to an `encoding_rs` encoding.
///
/// Falls back to WHATWG label lookup for names outside the fixed table.
/// Returns `None` when the converter cannot decode the name.
pub fn resolve_encoding(name: &str) -> Option<&'static Encoding> {
    let encoding = match name.to_ascii_lowercase().as_str() {
        "utf8" => UTF_8,
        "utf16le" => UTF_16LE,
        "utf16be" => UTF_16BE,
        // encoding_rs has no ASCII or ISO-8859-1 decoder; windows-1252 is a superset of both.
        "ascii" | "latin1" => WINDOWS_1252,
        "latin2" => ISO_8859_2,
        "latin3" => ISO_8859_3,
        "latin4" => ISO_8859_4,
        "latin5" => ISO_8859_5,
        "latin6" => ISO_8859_6,
        "latin7" => ISO_8859_7,
        "latin8" => ISO_8859_8,
        "latin9" => WINDOWS_1254,
        "latin10" => ISO_8859_10,
        "win1250" => WINDOWS_1250,
        "win1251" => WINDOWS_1251,
        "win1252" => WINDOWS_1252,
        "win1253" => WINDOWS_1253,
        "win1254" => WINDOWS_1254,
        "win1255" => WINDOWS_1255,
        "win1256" => WINDOWS_1256,
        "win1257" => WINDOWS_1257,
        "win1258" => WINDOWS_1258,
        "gbk" | "gb2312" => GBK,
        "gb18030" => GB18030,
        "big5" => BIG5,
        "eucjp" => EUC_JP,
        "shiftjis" => SHIFT_JIS,
        "euckr" => EUC_KR,
        other => Encoding::for_label(other.as_bytes())?,
    };

    // The replacement encoding decodes everything to a single U+FFFD.
    (encoding != REPLACEMENT).then_some(encoding)
}

/// Detect the encoding of a byte buffer.
///
/// Only the first [`SAMPLE_SIZE`] bytes are inspected. Never fails.
pub fn detect_bytes(bytes: &[u8]) -> Detection {
    if bytes.is_empty() {
        return Detection::Fallback;
    }

    let truncated = bytes.len() > SAMPLE_SIZE;
    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];

    match classify(sample, truncated) {
        Some(candidate) if candidate.confidence >= CONFIDENCE_THRESHOLD => {
            let name = normalize_encoding_name(candidate.encoding.name());
            debug!(
                encoding = %name,
                confidence = candidate.confidence,
                "Detected encoding"
            );
            Detection::Detected {
                name,
                confidence: candidate.confidence,
            }
        }
        Some(candidate) => {
            debug!(
                candidate = candidate.encoding.name(),
                confidence = candidate.confidence,
                "Encoding guess below threshold, assuming UTF-8"
            );
            Detection::Fallback
        }
        None => Detection::Fallback,
    }
}

/// Detect the encoding of `bytes` and decode them to UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let detection = detect_bytes(bytes);
    decode_with(bytes.to_vec(), detection.name())
}

/// Decode `bytes` with a converter-vocabulary encoding name.
///
/// Unsupported names decode as lossy UTF-8 with a warning.
pub fn decode_with(mut bytes: Vec<u8>, name: &str) -> String {
    if name == DEFAULT_ENCODING {
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        return String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    }

    match resolve_encoding(name) {
        Some(encoding) => {
            let (text, _, had_errors) = encoding.decode(&bytes);
            if had_errors {
                debug!(encoding = name, "Replaced malformed sequences while decoding");
            }
            text.into_owned()
        }
        None => {
            warn!(
                encoding = name,
                "Encoding not supported by converter, decoding as lossy UTF-8"
            );
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

fn classify(sample: &[u8], truncated: bool) -> Option<Candidate> {
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return Some(Candidate {
            encoding,
            confidence: 1.0,
        });
    }

    if is_utf8(sample, truncated) {
        return Some(Candidate {
            encoding: UTF_8,
            confidence: 1.0,
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, !truncated);
    let (encoding, assessed) = detector.guess_assess(None, false);
    let ceiling = if assessed { 1.0 } else { UNASSESSED_CONFIDENCE };

    Some(Candidate {
        encoding,
        confidence: ceiling * score(encoding, sample, truncated)?,
    })
}

/// Valid UTF-8, tolerating a multibyte sequence cut off by sampling.
fn is_utf8(sample: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// Score a legacy-encoding guess in `[0, 1]`.
///
/// The product of three factors:
/// - evidence: non-ASCII bytes seen, saturating at [`EVIDENCE_BYTES`]
/// - cleanliness: share of non-ASCII bytes decoded without malformed sequences
/// - plausibility: penalizes control characters, which real text lacks
fn score(encoding: &'static Encoding, sample: &[u8], truncated: bool) -> Option<f32> {
    let non_ascii = sample.iter().filter(|b| !b.is_ascii()).count();
    if non_ascii == 0 {
        return Some(1.0);
    }

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut decoded = String::with_capacity(decoder.max_utf8_buffer_length(sample.len())?);
    // A truncated sample may end mid-character; `last = false` keeps that
    // tail pending instead of counting it as malformed.
    let _ = decoder.decode_to_string(sample, &mut decoded, !truncated);

    let mut chars = 0usize;
    let mut malformed = 0usize;
    let mut controls = 0usize;
    for c in decoded.chars() {
        chars += 1;
        if c == char::REPLACEMENT_CHARACTER {
            malformed += 1;
        } else if c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0C') {
            controls += 1;
        }
    }

    let evidence = (non_ascii as f32 / EVIDENCE_BYTES as f32).min(1.0);
    let cleanliness = (1.0 - malformed as f32 / non_ascii as f32).max(0.0);
    let plausibility = (1.0 - CONTROL_PENALTY * controls as f32 / chars.max(1) as f32).max(0.0);
    Some(evidence * cleanliness * plausibility)
}

pub(crate) async fn ensure_exists(path: &Path) -> NormalizeResult<()> {
    tokio::fs::metadata(path)
        .await
        .map(|_| ())
        .map_err(|e| NormalizeError::from_io(path, e))
}

async fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    // One extra byte tells the classifier whether the sample was cut short.
    let mut sample = Vec::with_capacity(SAMPLE_SIZE + 1);
    file.take(SAMPLE_SIZE as u64 + 1)
        .read_to_end(&mut sample)
        .await?;
    Ok(sample)
}

async fn detect_file(path: &Path) -> Detection {
    match read_sample(path).await {
        Ok(sample) => detect_bytes(&sample),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not sample file, assuming UTF-8");
            Detection::Fallback
        }
    }
}

/// Detect the encoding of the file at `path`.
///
/// Fails only with [`NormalizeError::NotFound`] (or an I/O error while
/// checking existence); sampling problems resolve to `utf8`.
pub async fn detect_encoding(path: impl AsRef<Path>) -> NormalizeResult<String> {
    let path = path.as_ref();
    ensure_exists(path).await?;
    Ok(detect_file(path).await.name().to_string())
}

/// Read the file at `path` and return its content as UTF-8 text.
pub async fn read_with_encoding(path: impl AsRef<Path>) -> NormalizeResult<String> {
    let path = path.as_ref();
    ensure_exists(path).await?;

    let detection = detect_file(path).await;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| NormalizeError::from_io(path, e))?;

    debug!(path = %path.display(), encoding = detection.name(), bytes = bytes.len(), "Decoding file");
    Ok(decode_with(bytes, detection.name()))
}
