//! Dictation clips
//!
//! Recorded audio is validated as WAV before it is sent for transcription,
//! so a broken recording fails locally instead of costing a model call.

use std::io::Cursor;
use std::path::Path;

use hound::WavReader;

use crate::error::TranscriptionError;

/// Instruction sent alongside the audio
pub const TRANSCRIPTION_INSTRUCTION: &str = "Please transcribe this audio file. Provide only the transcribed text without any additional comments or formatting.";

const MIN_DURATION_SECS: f64 = 0.1;
// Inline request data is capped at 20 MB by the API
const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// A validated WAV recording
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    bytes: Vec<u8>,
    sample_rate: u32,
    channels: u16,
    duration_secs: f64,
}

impl AudioClip {
    pub fn from_wav_bytes(bytes: Vec<u8>) -> Result<Self, TranscriptionError> {
        if bytes.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        if bytes.len() > MAX_INLINE_BYTES {
            return Err(TranscriptionError::InvalidAudio {
                reason: format!(
                    "Recording is {:.1} MB; the limit is {} MB",
                    bytes.len() as f64 / (1024.0 * 1024.0),
                    MAX_INLINE_BYTES / (1024 * 1024)
                ),
            });
        }

        let reader = WavReader::new(Cursor::new(bytes.as_slice())).map_err(|e| {
            TranscriptionError::InvalidAudio {
                reason: format!("Not a readable WAV file: {}", e),
            }
        })?;
        let spec = reader.spec();
        if spec.sample_rate == 0 || spec.channels == 0 {
            return Err(TranscriptionError::InvalidAudio {
                reason: "WAV header has no sample rate or channels".to_string(),
            });
        }

        // duration() counts frames, not samples
        let duration_secs = reader.duration() as f64 / spec.sample_rate as f64;
        if reader.duration() == 0 {
            return Err(TranscriptionError::EmptyAudio);
        }
        if duration_secs < MIN_DURATION_SECS {
            return Err(TranscriptionError::InvalidAudio {
                reason: format!(
                    "Recording too short: {:.3}s (minimum {}s)",
                    duration_secs, MIN_DURATION_SECS
                ),
            });
        }

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_secs,
            bytes,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranscriptionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| TranscriptionError::InvalidAudio {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_wav_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[cfg(test)]
pub(crate) fn wav_bytes(sample_rate: u32, samples: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..samples {
            writer.write_sample(((i % 64) as i16 - 32) * 256).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
