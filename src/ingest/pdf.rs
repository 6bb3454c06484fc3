//! PDF text extraction
//!
//! Records are read page by page. Each page with text becomes a
//! `--- Page N ---` block with its whitespace normalized; pages are joined by
//! a blank line. A document that yields no text at all is an error, so an
//! image-only scan never silently merges nothing.

use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use lopdf::Document;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ExtractionError;

/// Turns uploaded document bytes into plain text
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// `lopdf` backed extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<String, ExtractionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_text(&bytes)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let doc = Document::load_mem(bytes).map_err(|e| {
            let reason = e.to_string();
            let lower = reason.to_lowercase();
            if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password") {
                ExtractionError::Encrypted
            } else {
                ExtractionError::Corrupt { reason }
            }
        })?;
        if doc.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys().copied() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    debug!(page = page_number, chars = text.len(), "Page extracted");
                    pages.push((page_number, text));
                }
                Err(e) => {
                    debug!(page = page_number, error = %e, "Page has no readable text");
                }
            }
        }

        let text = assemble_pages(pages);
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text)
    }
}

/// Collapse runs of spaces and tabs, and runs of blank lines
pub fn normalize_whitespace(text: &str) -> String {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    static INLINE_SPACE: OnceLock<Regex> = OnceLock::new();

    let blank_lines = BLANK_LINES
        .get_or_init(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("valid blank-line pattern"));
    let inline_space =
        INLINE_SPACE.get_or_init(|| Regex::new(r"[ \t]+").expect("valid inline-space pattern"));

    let text = blank_lines.replace_all(text.trim(), "\n\n");
    inline_space.replace_all(&text, " ").into_owned()
}

/// Join non-empty pages as `--- Page N ---` blocks
pub fn assemble_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = (u32, String)>,
{
    pages
        .into_iter()
        .filter_map(|(number, text)| {
            let text = normalize_whitespace(&text);
            (!text.is_empty()).then(|| format!("--- Page {} ---\n{}", number, text))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Hex SHA-256 of an upload, used to skip repeated merges
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Scripted extractor for tests
pub struct MockExtractor {
    result: Result<String, ExtractionErrorKind>,
    calls: Mutex<usize>,
}

/// Which failure a [`MockExtractor`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    EmptyDocument,
    Encrypted,
    Corrupt,
    NoText,
}

impl MockExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(kind: ExtractionErrorKind) -> Self {
        Self {
            result: Err(kind),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TextExtractor for MockExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        match &self.result {
            Ok(text) => Ok(text.clone()),
            Err(ExtractionErrorKind::EmptyDocument) => Err(ExtractionError::EmptyDocument),
            Err(ExtractionErrorKind::Encrypted) => Err(ExtractionError::Encrypted),
            Err(ExtractionErrorKind::Corrupt) => Err(ExtractionError::Corrupt {
                reason: "mock corrupt document".to_string(),
            }),
            Err(ExtractionErrorKind::NoText) => Err(ExtractionError::NoText),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Na   114\tmmol/L\n\n \n\nK 3.1  "),
            "Na 114 mmol/L\n\nK 3.1"
        );
    }

    #[test]
    fn test_assemble_skips_blank_pages() {
        let text = assemble_pages(vec![
            (1, "Discharge summary".to_string()),
            (2, "  \n ".to_string()),
            (3, "Lab data".to_string()),
        ]);
        assert_eq!(
            text,
            "--- Page 1 ---\nDischarge summary\n\n--- Page 3 ---\nLab data"
        );
        assert_eq!(assemble_pages(Vec::new()), "");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"").len(), 64);
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        let extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.extract_text(&[]),
            Err(ExtractionError::EmptyDocument)
        ));
        assert!(matches!(
            extractor.extract_text(b"this is not a pdf"),
            Err(ExtractionError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfExtractor::new()
            .extract_file(dir.path().join("missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}
