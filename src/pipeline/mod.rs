//! The section pipeline
//!
//! Six sections are generated in a fixed order. Each prompt carries the
//! clinical notes plus everything generated before it, so later sections
//! build on earlier ones:
//!
//! History -> Chief Complaint -> Tentative Diagnosis -> Review of Systems
//! -> Physical Examination -> SOAP Note

pub mod generator;
pub mod kind;
pub mod prior;
pub mod prompt;
pub mod templates;

pub use generator::SectionGenerator;
pub use kind::SectionKind;
pub use prior::PriorSections;
pub use prompt::PromptBuilder;
pub use templates::DEFAULT_PRESENT_ILLNESS_STYLE;
