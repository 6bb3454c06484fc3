//! Inputs that feed the note buffer besides typing
//!
//! - `pdf`: text extraction from uploaded records
//! - `audio`: validated dictation clips for transcription

pub mod audio;
pub mod pdf;

pub use audio::AudioClip;
pub use pdf::{fingerprint, ExtractionErrorKind, MockExtractor, PdfExtractor, TextExtractor};
