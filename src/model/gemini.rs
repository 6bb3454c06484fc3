//! Gemini REST client
//!
//! Talks to `models/{model}:generateContent` on the Generative Language API
//! with a blocking HTTP client. Structured requests set
//! `responseMimeType: application/json` plus the section's response schema.
//! Dictation is sent inline as base64 WAV data.
//!
//! The HTTP parts compile only with the `gemini` feature; without it every
//! call reports a model error.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::{CompletionRequest, ModelClient, Transcriber};
use super::registry::ModelId;
use crate::config::Config;
use crate::error::{ConfigError, ModelClientError};
use crate::ingest::audio::{AudioClip, TRANSCRIPTION_INSTRUCTION};

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<Value>,
}

impl ApiError {
    /// Gemini answers a bad key with 400 INVALID_ARGUMENT and reason API_KEY_INVALID
    fn is_invalid_key(&self) -> bool {
        self.details
            .iter()
            .any(|d| d.get("reason").and_then(Value::as_str) == Some("API_KEY_INVALID"))
            || self.message.contains("API key not valid")
    }
}

/// Production model client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            base_url: crate::config::DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from process configuration; requires an API key
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let key = config.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        Ok(Self::new(key)
            .with_base_url(config.api_url.clone())
            .with_timeout(config.timeout))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg_attr(not(feature = "gemini"), allow(dead_code))]
    fn endpoint(&self, model: &ModelId) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn completion_body(request: &CompletionRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: request.response_schema.clone().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        }
    }

    fn transcription_body(clip: &AudioClip) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: TRANSCRIPTION_INSTRUCTION.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: clip.mime_type(),
                            data: BASE64.encode(clip.bytes()),
                        },
                    },
                ],
            }],
            generation_config: None,
        }
    }

    /// Check the key by listing models
    #[cfg(feature = "gemini")]
    pub fn validate_api_key(&self) -> Result<(), ModelClientError> {
        let client = self.http_client()?;
        let url = format!("{}/models?pageSize=1", self.base_url);
        let response = client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let retry_after = retry_after_header(&response);
        let body = response.text().unwrap_or_default();
        Err(map_http_error(status.as_u16(), &body, retry_after.as_deref()))
    }

    #[cfg(not(feature = "gemini"))]
    pub fn validate_api_key(&self) -> Result<(), ModelClientError> {
        Err(not_compiled())
    }

    #[cfg(feature = "gemini")]
    fn http_client(&self) -> Result<reqwest::blocking::Client, ModelClientError> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ModelClientError::network(format!("HTTP client setup failed: {}", e)))
    }

    /// Send a request body and return the reply text
    #[cfg(feature = "gemini")]
    fn send_request(&self, model: &ModelId, body: &GenerateRequest) -> Result<String, ModelClientError> {
        let client = self.http_client()?;
        let response = client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let retry_after = retry_after_header(&response);
        let text = response
            .text()
            .map_err(|e| ModelClientError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(map_http_error(status.as_u16(), &text, retry_after.as_deref()));
        }
        parse_reply(&text)
    }

    #[cfg(not(feature = "gemini"))]
    fn send_request(&self, _model: &ModelId, _body: &GenerateRequest) -> Result<String, ModelClientError> {
        Err(not_compiled())
    }
}

impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelClientError> {
        let body = Self::completion_body(request);
        self.send_request(&request.model, &body)
    }
}

impl Transcriber for GeminiClient {
    fn transcribe(&self, clip: &AudioClip, model: &ModelId) -> Result<String, ModelClientError> {
        tracing::debug!(
            model = %model,
            bytes = clip.bytes().len(),
            duration_secs = clip.duration_secs(),
            "Sending dictation for transcription"
        );
        let body = Self::transcription_body(clip);
        self.send_request(model, &body).map(|t| t.trim().to_string())
    }
}

#[cfg(not(feature = "gemini"))]
fn not_compiled() -> ModelClientError {
    ModelClientError::model("Gemini support not compiled. Build with --features gemini")
}

#[cfg(feature = "gemini")]
fn transport_error(e: reqwest::Error) -> ModelClientError {
    if e.is_timeout() {
        ModelClientError::network(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        ModelClientError::network(format!("Cannot connect to model API: {}", e))
    } else {
        ModelClientError::network(e.to_string())
    }
}

#[cfg(feature = "gemini")]
fn retry_after_header(response: &reqwest::blocking::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Map a non-success HTTP status onto a client error
pub fn map_http_error(status: u16, body: &str, retry_after: Option<&str>) -> ModelClientError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = match &api_error {
        Some(err) if !err.message.is_empty() => {
            if err.status.is_empty() {
                format!("HTTP {}: {}", status, err.message)
            } else {
                format!("HTTP {} {}: {}", status, err.status, err.message)
            }
        }
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("HTTP {}: {}", status, body.trim()),
    };

    match status {
        401 | 403 => ModelClientError::auth(message),
        400 if api_error.as_ref().is_some_and(ApiError::is_invalid_key) => {
            ModelClientError::auth(message)
        }
        429 => ModelClientError::rate_limited(
            message,
            retry_after.and_then(|v| v.trim().parse::<u64>().ok()),
        ),
        _ => ModelClientError::model(message),
    }
}

/// Extract the reply text from a `generateContent` response body
pub fn parse_reply(body: &str) -> Result<String, ModelClientError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ModelClientError::model(format!("Invalid response from model API: {}", e)))?;

    let candidate = response.candidates.first();
    let text: String = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelClientError::model(format!("Prompt was blocked: {}", reason)));
    }
    match candidate.and_then(|c| c.finish_reason.as_deref()) {
        Some(reason) => Err(ModelClientError::model(format!(
            "Model returned no text (finish reason {})",
            reason
        ))),
        None => Err(ModelClientError::model("Model returned no text")),
    }
}
