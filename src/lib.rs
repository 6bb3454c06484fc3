//! LazyResident - Clinical Note Drafting Pipeline
//!
//! Turns a clinician's rough notes, uploaded records and dictation into the
//! six sections of an admission note, one model call per section.
//!
//! # Architecture
//!
//! The sections form a fixed pipeline. Each prompt carries the notes plus
//! every earlier section that already has content:
//! 1. History of Present Illness
//! 2. Chief Complaint
//! 3. Tentative Diagnosis
//! 4. Review of Systems
//! 5. Physical Examination
//! 6. SOAP Plan
//!
//! - [`session`]: the note buffer, section store and model selection
//! - [`pipeline`]: section order, prompt construction and generation
//! - [`structured`]: response schemas and rendering of structured replies
//! - [`model`]: the model client seam, Gemini over HTTP and test mocks
//! - [`ingest`]: PDF text extraction and dictation clips
//! - [`cli`]: one-shot commands and the interactive shell

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod structured;

pub use config::Config;
pub use error::{GenerationCause, GenerationError, ResidentError, Result};
pub use model::{GeminiClient, ModelClient, ModelId, MockModelClient, Transcriber};
pub use pipeline::SectionKind;
pub use session::{SectionMode, Session};
