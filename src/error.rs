//! Error handling for LazyResident
//!
//! Every error carries a stable code, a friendly message for the clinician,
//! and recovery suggestions. No error is fatal to a session: the note buffer
//! and the generated sections survive any failure.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::SectionKind;

/// Result type alias for LazyResident operations
pub type Result<T> = std::result::Result<T, ResidentError>;

/// Why a section generation did not produce content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationCause {
    /// Nothing to summarize; detected locally before any model call
    EmptyInput,
    NetworkFailure,
    AuthFailure,
    RateLimited,
    ModelError,
}

impl GenerationCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::NetworkFailure => "network_failure",
            Self::AuthFailure => "auth_failure",
            Self::RateLimited => "rate_limited",
            Self::ModelError => "model_error",
        }
    }
}

impl fmt::Display for GenerationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an external model client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelClientError {
    #[error("network failure: {message}")]
    Network { message: String },

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("model error: {message}")]
    Model { message: String },
}

impl ModelClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// The generation cause this client failure maps onto
    pub fn cause(&self) -> GenerationCause {
        match self {
            Self::Network { .. } => GenerationCause::NetworkFailure,
            Self::Auth { .. } => GenerationCause::AuthFailure,
            Self::RateLimited { .. } => GenerationCause::RateLimited,
            Self::Model { .. } => GenerationCause::ModelError,
        }
    }
}

/// Section generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Nothing to summarize for {section}: the notes are empty and no earlier section has content")]
    EmptyInput { section: SectionKind },

    #[error("{section} generation failed: {source}")]
    Client {
        section: SectionKind,
        #[source]
        source: ModelClientError,
    },

    #[error("{section} reply could not be read: {reason}")]
    MalformedOutput { section: SectionKind, reason: String },
}

impl GenerationError {
    pub fn cause(&self) -> GenerationCause {
        match self {
            Self::EmptyInput { .. } => GenerationCause::EmptyInput,
            Self::Client { source, .. } => source.cause(),
            Self::MalformedOutput { .. } => GenerationCause::ModelError,
        }
    }

    pub fn section(&self) -> SectionKind {
        match self {
            Self::EmptyInput { section }
            | Self::Client { section, .. }
            | Self::MalformedOutput { section, .. } => *section,
        }
    }
}

/// PDF merge failures
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Document is encrypted")]
    Encrypted,

    #[error("Document could not be read: {reason}")]
    Corrupt { reason: String },

    #[error("Document contains no extractable text")]
    NoText,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Dictation failures
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("No audio data provided")]
    EmptyAudio,

    #[error("Invalid audio: {reason}")]
    InvalidAudio { reason: String },

    #[error("Transcription returned no text")]
    EmptyTranscript,

    #[error("Transcription failed: {0}")]
    Client(#[from] ModelClientError),
}

/// Session store misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{section} is in copy view; switch to edit mode before changing it")]
    SectionNotEditable { section: SectionKind },

    #[error("Unknown section: {name}")]
    UnknownSection { name: String },
}

/// Configuration problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Invalid value for {key}: '{value}' (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

/// Main error type for LazyResident operations
#[derive(Error, Debug)]
pub enum ResidentError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Model client error: {0}")]
    Client(#[from] ModelClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResidentError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ResidentError::Generation(err) => match err.cause() {
                GenerationCause::EmptyInput => "EMPTY_INPUT",
                GenerationCause::NetworkFailure => "NETWORK_FAILURE",
                GenerationCause::AuthFailure => "AUTH_FAILURE",
                GenerationCause::RateLimited => "RATE_LIMITED",
                GenerationCause::ModelError => "MODEL_ERROR",
            },
            ResidentError::Extraction(_) => "EXTRACTION_ERROR",
            ResidentError::Transcription(_) => "TRANSCRIPTION_ERROR",
            ResidentError::Session(SessionError::SectionNotEditable { .. }) => {
                "SECTION_NOT_EDITABLE"
            }
            ResidentError::Session(SessionError::UnknownSection { .. }) => "UNKNOWN_SECTION",
            ResidentError::Config(_) => "CONFIG_ERROR",
            ResidentError::Client(err) => match err.cause() {
                GenerationCause::AuthFailure => "AUTH_FAILURE",
                GenerationCause::RateLimited => "RATE_LIMITED",
                GenerationCause::NetworkFailure => "NETWORK_FAILURE",
                _ => "MODEL_ERROR",
            },
            ResidentError::Io(_) => "IO_ERROR",
            ResidentError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the same action can simply be tried again
    pub fn is_recoverable(&self) -> bool {
        match self {
            ResidentError::Generation(err) => matches!(
                err.cause(),
                GenerationCause::NetworkFailure
                    | GenerationCause::RateLimited
                    | GenerationCause::ModelError
            ),
            ResidentError::Client(err) => !matches!(err, ModelClientError::Auth { .. }),
            ResidentError::Transcription(TranscriptionError::Client(err)) => {
                !matches!(err, ModelClientError::Auth { .. })
            }
            ResidentError::Transcription(TranscriptionError::EmptyTranscript) => true,
            ResidentError::Session(SessionError::SectionNotEditable { .. }) => true,
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ResidentError::Generation(err) => match err.cause() {
                GenerationCause::EmptyInput => vec![
                    "Type, dictate or paste notes first",
                    "Upload the patient's records to merge their text",
                ],
                GenerationCause::NetworkFailure => vec![
                    "Check the network connection",
                    "Try generating the section again",
                ],
                GenerationCause::AuthFailure => vec![
                    "Check that the API key is correct",
                    "Set GEMINI_API_KEY or pass --api-key",
                ],
                GenerationCause::RateLimited => vec![
                    "Wait a moment before generating again",
                    "Switch to a lighter model",
                ],
                GenerationCause::ModelError => vec![
                    "Try generating the section again",
                    "gemini-2.5-flash is recommended; weaker models can fail on structured output",
                ],
            },
            ResidentError::Extraction(ExtractionError::Encrypted) => vec![
                "Remove the password protection and upload again",
                "Paste the record text into the notes instead",
            ],
            ResidentError::Extraction(ExtractionError::NoText) => vec![
                "The document may be a scanned image without a text layer",
                "Paste the record text into the notes instead",
            ],
            ResidentError::Extraction(_) => vec![
                "Check that the file is a valid PDF",
                "Try re-exporting the document from its source",
            ],
            ResidentError::Transcription(TranscriptionError::InvalidAudio { .. }) => vec![
                "Record again or convert the clip to WAV",
            ],
            ResidentError::Transcription(_) => vec!["Record again and retry"],
            ResidentError::Session(SessionError::SectionNotEditable { .. }) => {
                vec!["Switch the section to edit view first"]
            }
            ResidentError::Session(SessionError::UnknownSection { .. }) => vec![
                "Known sections: history, chief_complaint, diagnosis, ros, physical_exam, soap",
            ],
            ResidentError::Config(ConfigError::MissingApiKey) => vec![
                "Get a key from Google AI Studio",
                "Set GEMINI_API_KEY or pass --api-key",
            ],
            _ => vec![],
        }
    }

    /// Get a user-friendly message for this error
    pub fn friendly_message(&self) -> String {
        match self {
            ResidentError::Generation(GenerationError::EmptyInput { section }) => {
                format!("There is nothing to build the {} from yet.", section)
            }
            ResidentError::Generation(err) => match err.cause() {
                GenerationCause::AuthFailure => {
                    "The model service rejected the API key.".to_string()
                }
                GenerationCause::RateLimited => {
                    "The model service is busy right now. Try again later.".to_string()
                }
                GenerationCause::NetworkFailure => {
                    "Couldn't reach the model service. Try again later.".to_string()
                }
                _ => format!("Couldn't generate the {}. Try again later.", err.section()),
            },
            ResidentError::Extraction(err) => {
                format!("Failed to extract text from the uploaded document: {}", err)
            }
            ResidentError::Transcription(err) => format!("Couldn't transcribe the audio: {}", err),
            ResidentError::Config(ConfigError::MissingApiKey) => {
                "Set an API key before generating notes.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
