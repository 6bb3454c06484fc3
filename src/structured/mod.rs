//! Structured (JSON schema constrained) replies
//!
//! - `catalog`: symptom and examination vocabularies
//! - `schema`: reply models and response schemas
//! - `render`: clinical text layouts for each reply

pub mod catalog;
pub mod render;
pub mod schema;

pub use render::render;
pub use schema::{response_schema, StructuredReply};
