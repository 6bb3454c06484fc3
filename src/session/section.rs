//! Per-section state

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ModelId;

/// How a section is shown: an editable field, or a read-only block to copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionMode {
    #[default]
    Edit,
    Copy,
}

impl SectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Copy => "copy",
        }
    }
}

/// One generated (or hand-written) section of the note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub(crate) content: String,
    pub(crate) mode: SectionMode,
    /// Live text of the edit field while in edit mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pending_edit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) generated_from_model: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) generated_at: Option<DateTime<Utc>>,
}

impl Section {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mode(&self) -> SectionMode {
        self.mode
    }

    pub fn pending_edit(&self) -> Option<&str> {
        self.pending_edit.as_deref()
    }

    /// Text the edit field shows: the pending edit, else the stored content
    pub fn edit_field(&self) -> &str {
        self.pending_edit.as_deref().unwrap_or(&self.content)
    }

    pub fn generated_from_model(&self) -> Option<&ModelId> {
        self.generated_from_model.as_ref()
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Replace content with a fresh generation
    pub(crate) fn store_generated(&mut self, content: String, model: &ModelId) {
        self.content = content;
        self.mode = SectionMode::Copy;
        self.pending_edit = None;
        self.generated_from_model = Some(model.clone());
        self.generated_at = Some(Utc::now());
    }
}
