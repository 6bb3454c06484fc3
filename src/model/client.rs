//! Model client traits
//!
//! Everything the pipeline needs from a hosted model: one text completion
//! per request, and speech-to-text for dictation. Implementations live in
//! `gemini` (production) and `mock` (tests and offline use).

use serde::Serialize;
use serde_json::Value;

use super::registry::ModelId;
use crate::error::ModelClientError;
use crate::ingest::AudioClip;

/// One completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: ModelId,
    /// JSON response schema; when present the reply must be JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: ModelId) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            response_schema: None,
        }
    }

    pub fn with_response_schema(mut self, schema: Option<Value>) -> Self {
        self.response_schema = schema;
        self
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// A hosted text model
pub trait ModelClient: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Send one prompt and return the reply text
    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelClientError>;
}

/// Speech-to-text for dictated notes
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, clip: &AudioClip, model: &ModelId) -> Result<String, ModelClientError>;
}

impl<T: ModelClient + ?Sized> ModelClient for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelClientError> {
        (**self).complete(request)
    }
}

impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelClientError> {
        (**self).complete(request)
    }
}
