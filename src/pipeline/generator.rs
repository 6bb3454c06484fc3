//! Section generation
//!
//! One call produces one section: build the prompt, send it to the model,
//! and turn the reply into note text. The generator holds no session state;
//! the caller passes the notes, the earlier sections and the model.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::kind::SectionKind;
use super::prior::PriorSections;
use super::prompt::PromptBuilder;
use crate::error::GenerationError;
use crate::model::{CompletionRequest, ModelClient, ModelId};
use crate::structured::{self, StructuredReply};

#[derive(Debug, Clone, Default)]
pub struct SectionGenerator {
    prompts: PromptBuilder,
}

impl SectionGenerator {
    pub fn new(prompts: PromptBuilder) -> Self {
        Self { prompts }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// The exact prompt `generate` would send
    pub fn prompt_for(&self, kind: SectionKind, notes: &str, prior: &PriorSections) -> String {
        self.prompts.build(kind, notes, prior)
    }

    /// Generate one section.
    ///
    /// Fails with `EmptyInput` before any model call when the notes are blank
    /// and no earlier section has content. Client failures are returned
    /// unchanged, without retry.
    pub fn generate(
        &self,
        client: &dyn ModelClient,
        kind: SectionKind,
        notes: &str,
        prior: &PriorSections,
        model: &ModelId,
    ) -> Result<String, GenerationError> {
        let prior = prior.before(kind);
        if notes.trim().is_empty() && prior.is_empty() {
            debug!(section = kind.key(), "Nothing to summarize");
            return Err(GenerationError::EmptyInput { section: kind });
        }

        let prompt = self.prompts.build(kind, notes, &prior);
        let schema = self
            .prompts
            .is_structured()
            .then(|| structured::response_schema(kind));
        let request = CompletionRequest::new(prompt, model.clone()).with_response_schema(schema);

        debug!(
            section = kind.key(),
            model = %model,
            client = client.name(),
            prompt_chars = request.prompt.len(),
            prior_sections = prior.len(),
            "Sending generation request"
        );

        let start = Instant::now();
        let reply = client.complete(&request).map_err(|source| {
            warn!(section = kind.key(), model = %model, cause = %source.cause(), "Generation failed");
            GenerationError::Client {
                section: kind,
                source,
            }
        })?;

        let content = if request.is_structured() {
            let parsed = StructuredReply::parse(kind, &reply).map_err(|e| {
                warn!(section = kind.key(), error = %e, "Structured reply did not parse");
                GenerationError::MalformedOutput {
                    section: kind,
                    reason: e.to_string(),
                }
            })?;
            structured::render(&parsed, &prior)
        } else {
            reply.trim().to_string()
        };

        if content.trim().is_empty() {
            return Err(GenerationError::MalformedOutput {
                section: kind,
                reason: "reply contained no text".to_string(),
            });
        }

        info!(
            section = kind.key(),
            model = %model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "Section generated"
        );
        Ok(content)
    }
}
