//! Hosted model access
//!
//! - `client`: the `ModelClient` and `Transcriber` traits
//! - `gemini`: the Gemini REST implementation
//! - `mock`: scripted clients for tests
//! - `registry`: model identifiers offered to the clinician

pub mod client;
pub mod gemini;
pub mod mock;
pub mod registry;

pub use client::{CompletionRequest, ModelClient, Transcriber};
pub use gemini::GeminiClient;
pub use mock::{MockModelClient, MockTranscriber};
pub use registry::{ModelId, ModelInfo, ModelRegistry, DEFAULT_MODEL};
