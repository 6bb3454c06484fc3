//! Session state store
//!
//! A [`Session`] owns everything one clinician works with: the note buffer,
//! the six sections, the model selection and the prompt options. Nothing is
//! shared between sessions and nothing outlives the value.
//!
//! No operation here leaves the session half-updated. A failed generation,
//! merge or transcription returns its error and the notes and sections are
//! exactly as they were.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::note_buffer::NoteBuffer;
use super::section::{Section, SectionMode};
use crate::error::{ExtractionError, GenerationError, SessionError, TranscriptionError};
use crate::ingest::{fingerprint, AudioClip, TextExtractor};
use crate::model::{ModelClient, ModelId, Transcriber};
use crate::pipeline::{PriorSections, SectionGenerator, SectionKind};

/// Result of merging an uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// Text appended to the notes
    Merged { chars: usize },
    /// The same upload was merged before; notes unchanged
    AlreadyMerged,
}

/// Readiness of one section against its recommended prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReadiness {
    pub kind: SectionKind,
    pub has_content: bool,
    /// Recommended sections that are still empty
    pub missing: Vec<SectionKind>,
}

impl SectionReadiness {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Where the session stands in the pipeline. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub completed: Vec<SectionKind>,
    /// First section without content
    pub next: Option<SectionKind>,
    pub sections: Vec<SectionReadiness>,
}

impl PipelineState {
    pub fn readiness(&self, kind: SectionKind) -> Option<&SectionReadiness> {
        self.sections.iter().find(|r| r.kind == kind)
    }

    pub fn is_complete(&self) -> bool {
        self.next.is_none()
    }
}

/// Outcome of running several sections in order
#[derive(Debug)]
pub struct PipelineRun {
    pub completed: Vec<SectionKind>,
    /// The failure that stopped the run, if any
    pub failure: Option<GenerationError>,
}

impl PipelineRun {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    pub kind: SectionKind,
    pub label: &'static str,
    #[serde(flatten)]
    pub section: Section,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub model: ModelId,
    pub structured_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_style: Option<String>,
    pub notes: String,
    pub merged_documents: usize,
    pub sections: Vec<SectionSnapshot>,
}

/// One clinician's working session
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    notes: NoteBuffer,
    /// Indexed by pipeline position
    sections: [Section; 6],
    model: ModelId,
    generator: SectionGenerator,
    merged_documents: HashSet<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            notes: NoteBuffer::new(),
            sections: Default::default(),
            model: ModelId::default(),
            generator: SectionGenerator::default(),
            merged_documents: HashSet::new(),
        }
    }

    pub fn with_model(mut self, model: impl AsRef<str>) -> Self {
        self.select_model(model);
        self
    }

    pub fn with_structured_output(mut self, structured: bool) -> Self {
        self.set_structured_output(structured);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -- notes --

    pub fn notes(&self) -> &NoteBuffer {
        &self.notes
    }

    /// Direct edits to the notes; generated sections are never affected
    pub fn notes_mut(&mut self) -> &mut NoteBuffer {
        &mut self.notes
    }

    // -- sections --

    pub fn section(&self, kind: SectionKind) -> &Section {
        &self.sections[kind.position() - 1]
    }

    fn section_mut(&mut self, kind: SectionKind) -> &mut Section {
        &mut self.sections[kind.position() - 1]
    }

    pub fn content(&self, kind: SectionKind) -> &str {
        self.section(kind).content()
    }

    /// Overwrite a section's content directly, keeping its mode
    pub fn set_content(&mut self, kind: SectionKind, text: impl Into<String>) {
        let section = self.section_mut(kind);
        section.content = text.into();
        section.pending_edit = None;
    }

    /// Switch view mode. Going from edit to copy commits the edit field as
    /// the new content; every other switch leaves content alone.
    pub fn set_mode(&mut self, kind: SectionKind, mode: SectionMode) {
        let section = self.section_mut(kind);
        if section.mode == SectionMode::Edit && mode == SectionMode::Copy {
            if let Some(field) = section.pending_edit.take() {
                section.content = field;
            }
        } else if section.mode != mode {
            section.pending_edit = None;
        }
        section.mode = mode;
    }

    /// Update the live edit field of a section in edit mode
    pub fn edit_section(&mut self, kind: SectionKind, text: impl Into<String>) -> Result<(), SessionError> {
        let section = self.section_mut(kind);
        if section.mode != SectionMode::Edit {
            return Err(SessionError::SectionNotEditable { section: kind });
        }
        section.pending_edit = Some(text.into());
        Ok(())
    }

    /// Commit `field_text` as the section's content and switch to copy mode
    pub fn finish_editing(&mut self, kind: SectionKind, field_text: impl Into<String>) -> Result<(), SessionError> {
        let section = self.section_mut(kind);
        if section.mode != SectionMode::Edit {
            return Err(SessionError::SectionNotEditable { section: kind });
        }
        section.content = field_text.into();
        section.pending_edit = None;
        section.mode = SectionMode::Copy;
        Ok(())
    }

    /// [`finish_editing`](Self::finish_editing) with whatever the edit field currently holds
    pub fn commit_edit(&mut self, kind: SectionKind) -> Result<(), SessionError> {
        let field = self.section(kind).edit_field().to_string();
        self.finish_editing(kind, field)
    }

    /// Every section with content, in pipeline order
    pub fn prior_sections(&self) -> PriorSections {
        let mut prior = PriorSections::new();
        for kind in SectionKind::ALL {
            prior.insert(kind, self.section(kind).content.clone());
        }
        prior
    }

    // -- model and prompt options --

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// Use `model` for later generations. A blank selection means the default.
    /// Existing content is untouched.
    pub fn select_model(&mut self, model: impl AsRef<str>) {
        let model = ModelId::new(model);
        debug!(model = %model, "Model selected");
        self.model = model;
    }

    pub fn history_style(&self) -> Option<&str> {
        self.generator.prompts().history_style()
    }

    /// Replace (or with `None`, restore) the present illness guidance
    pub fn set_history_style(&mut self, style: Option<String>) {
        let prompts = self.generator.prompts().clone().with_history_style(style);
        self.generator = SectionGenerator::new(prompts);
    }

    pub fn structured_output(&self) -> bool {
        self.generator.prompts().is_structured()
    }

    pub fn set_structured_output(&mut self, structured: bool) {
        let prompts = self.generator.prompts().clone().with_structured(structured);
        self.generator = SectionGenerator::new(prompts);
    }

    /// The prompt a generation of `kind` would send right now
    pub fn prompt_for(&self, kind: SectionKind) -> String {
        self.generator
            .prompt_for(kind, self.notes.read(), &self.prior_sections())
    }

    // -- generation --

    /// Generate one section from the notes and every earlier section.
    ///
    /// On success the content is replaced (including manual edits), the mode
    /// becomes copy and the model is recorded. On failure nothing changes.
    pub fn generate(&mut self, kind: SectionKind, client: &dyn ModelClient) -> Result<&str, GenerationError> {
        let content = self.generator.generate(
            client,
            kind,
            self.notes.read(),
            &self.prior_sections(),
            &self.model,
        )?;
        let model = self.model.clone();
        let section = self.section_mut(kind);
        section.store_generated(content, &model);
        Ok(section.content())
    }

    /// Generate `kinds` in pipeline order, stopping at the first failure
    pub fn generate_sections(&mut self, kinds: &[SectionKind], client: &dyn ModelClient) -> PipelineRun {
        let mut ordered = kinds.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut completed = Vec::with_capacity(ordered.len());
        for kind in ordered {
            if let Err(err) = self.generate(kind, client) {
                warn!(section = kind.key(), cause = %err.cause(), completed = completed.len(), "Pipeline stopped");
                return PipelineRun {
                    completed,
                    failure: Some(err),
                };
            }
            completed.push(kind);
        }
        PipelineRun {
            completed,
            failure: None,
        }
    }

    /// Generate all six sections in order
    pub fn generate_pipeline(&mut self, client: &dyn ModelClient) -> PipelineRun {
        self.generate_sections(&SectionKind::ALL, client)
    }

    // -- ingest --

    /// Extract text from an uploaded document and append it to the notes.
    ///
    /// On failure the notes are unchanged. Re-merging identical bytes is a no-op.
    pub fn merge_document(
        &mut self,
        bytes: &[u8],
        name: Option<&str>,
        extractor: &dyn TextExtractor,
    ) -> Result<MergeOutcome, ExtractionError> {
        let digest = fingerprint(bytes);
        if self.merged_documents.contains(&digest) {
            debug!(document = name.unwrap_or("<upload>"), "Document already merged");
            return Ok(MergeOutcome::AlreadyMerged);
        }

        let text = extractor.extract_text(bytes).map_err(|e| {
            warn!(document = name.unwrap_or("<upload>"), error = %e, "Document extraction failed");
            e
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        let block = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("=== {} ===\n{}", name, text),
            None => text.to_string(),
        };
        self.notes.append_block(&block);
        self.merged_documents.insert(digest);

        info!(document = name.unwrap_or("<upload>"), chars = text.len(), "Document merged into notes");
        Ok(MergeOutcome::Merged { chars: text.len() })
    }

    /// Transcribe a dictation clip with the selected model and append it to the notes
    pub fn append_transcript(
        &mut self,
        clip: &AudioClip,
        transcriber: &dyn Transcriber,
    ) -> Result<usize, TranscriptionError> {
        let transcript = transcriber.transcribe(clip, &self.model)?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }
        self.notes.append_block(transcript);
        info!(chars = transcript.len(), duration_secs = clip.duration_secs(), "Transcript appended to notes");
        Ok(transcript.len())
    }

    // -- views --

    pub fn pipeline_state(&self) -> PipelineState {
        let has = |kind: SectionKind| self.section(kind).has_content();
        let completed: Vec<_> = SectionKind::ALL.into_iter().filter(|k| has(*k)).collect();
        let next = SectionKind::ALL.into_iter().find(|k| !has(*k));
        let sections = SectionKind::ALL
            .into_iter()
            .map(|kind| SectionReadiness {
                kind,
                has_content: has(kind),
                missing: kind
                    .prerequisites()
                    .iter()
                    .copied()
                    .filter(|p| !has(*p))
                    .collect(),
            })
            .collect();
        PipelineState {
            completed,
            next,
            sections,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            model: self.model.clone(),
            structured_output: self.structured_output(),
            history_style: self.history_style().map(str::to_string),
            notes: self.notes.read().to_string(),
            merged_documents: self.merged_documents.len(),
            sections: SectionKind::ALL
                .into_iter()
                .map(|kind| SectionSnapshot {
                    kind,
                    label: kind.label(),
                    section: self.section(kind).clone(),
                })
                .collect(),
        }
    }
}
