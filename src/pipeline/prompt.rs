//! Prompt assembly
//!
//! A prompt is the section's instruction, the clinical notes, and then the
//! content of every earlier section in pipeline order. Nothing else goes in,
//! so identical inputs always produce byte-identical prompts.

use super::kind::SectionKind;
use super::prior::PriorSections;
use super::templates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    history_style: Option<String>,
    structured: bool,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            history_style: None,
            structured: true,
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the present illness writing guidance used for History
    pub fn with_history_style(mut self, style: Option<String>) -> Self {
        self.history_style = style.filter(|s| !s.trim().is_empty());
        self
    }

    /// Ask for a JSON reply matching the section's response schema
    pub fn with_structured(mut self, structured: bool) -> Self {
        self.structured = structured;
        self
    }

    pub fn is_structured(&self) -> bool {
        self.structured
    }

    pub fn history_style(&self) -> Option<&str> {
        self.history_style.as_deref()
    }

    /// Build the prompt for `kind`. Sections at or after `kind` in `prior` are ignored.
    pub fn build(&self, kind: SectionKind, notes: &str, prior: &PriorSections) -> String {
        let mut out = String::new();
        out.push_str(&templates::instruction(kind, self.history_style.as_deref()));
        out.push_str("\n\n");
        out.push_str(&templates::output_format(kind, self.structured));
        out.push_str("\n\n## Patient Context\n- Based on the following information, generate the `");
        out.push_str(kind.label());
        out.push_str("` section.");

        if !notes.trim().is_empty() {
            out.push_str("\n\nClinical notes:\n");
            out.push_str(notes);
        }

        for (prior_kind, content) in prior.before(kind).iter() {
            out.push_str("\n\n");
            out.push_str(prior_kind.label());
            out.push_str(":\n");
            out.push_str(content.trim());
        }

        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_heading_omitted_when_blank() {
        let prior = PriorSections::new().with(SectionKind::History, "hx text");
        let prompt = PromptBuilder::new().build(SectionKind::ChiefComplaint, "  \n", &prior);
        assert!(!prompt.contains("Clinical notes:"));
        assert!(prompt.ends_with("History:\nhx text\n"));
    }

    #[test]
    fn test_notes_are_embedded_as_written() {
        let notes = "  BP 150/90\n\tHR 88  \n";
        let prompt = PromptBuilder::new().build(SectionKind::History, notes, &PriorSections::new());
        assert!(prompt.contains(&format!("Clinical notes:\n{}", notes)));
    }

    #[test]
    fn test_later_sections_are_not_included() {
        let prior = PriorSections::new()
            .with(SectionKind::History, "hx text")
            .with(SectionKind::SoapPlan, "soap text");
        let prompt = PromptBuilder::new().build(SectionKind::TentativeDiagnosis, "notes", &prior);
        assert!(prompt.contains("hx text"));
        assert!(!prompt.contains("soap text"));
    }

    #[test]
    fn test_plain_text_mode_changes_output_format() {
        let structured = PromptBuilder::new().build(SectionKind::History, "notes", &PriorSections::new());
        let plain = PromptBuilder::new()
            .with_structured(false)
            .build(SectionKind::History, "notes", &PriorSections::new());
        assert!(structured.contains("single JSON object"));
        assert!(plain.contains("Do not use JSON"));
    }
}
