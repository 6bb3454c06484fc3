//! Session-scoped state
//!
//! - `note_buffer`: the clinician's working text
//! - `section`: content and view mode of one section
//! - `store`: the [`Session`] that owns both

pub mod note_buffer;
pub mod section;
pub mod store;

pub use note_buffer::NoteBuffer;
pub use section::{Section, SectionMode};
pub use store::{
    MergeOutcome, PipelineRun, PipelineState, SectionReadiness, SectionSnapshot, Session,
    SessionSnapshot,
};
