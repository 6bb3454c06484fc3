//! Ordered accumulation of already generated sections
//!
//! Each generation reads the contents of the sections before it. The
//! accumulation is keyed by [`SectionKind`], whose ordering is pipeline order,
//! so iteration always yields sections top to bottom no matter when they
//! were inserted.

use std::collections::BTreeMap;

use serde::Serialize;

use super::kind::SectionKind;

/// Section contents available to a generation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorSections {
    sections: BTreeMap<SectionKind, String>,
}

impl PriorSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, kind: SectionKind, content: impl Into<String>) -> Self {
        self.insert(kind, content);
        self
    }

    /// Record a section's content. Blank content is not recorded.
    pub fn insert(&mut self, kind: SectionKind, content: impl Into<String>) {
        let content = content.into();
        if content.trim().is_empty() {
            self.sections.remove(&kind);
        } else {
            self.sections.insert(kind, content);
        }
    }

    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    /// Sections in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Only the sections strictly before `kind` in the pipeline
    pub fn before(&self, kind: SectionKind) -> PriorSections {
        PriorSections {
            sections: self
                .sections
                .range(..kind)
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterates_in_pipeline_order() {
        let prior = PriorSections::new()
            .with(SectionKind::TentativeDiagnosis, "dx")
            .with(SectionKind::History, "hx")
            .with(SectionKind::ChiefComplaint, "cc");

        let kinds: Vec<_> = prior.iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::History,
                SectionKind::ChiefComplaint,
                SectionKind::TentativeDiagnosis
            ]
        );
    }

    #[test]
    fn test_blank_content_is_not_recorded() {
        let mut prior = PriorSections::new().with(SectionKind::History, "hx");
        prior.insert(SectionKind::ChiefComplaint, "   \n");
        assert_eq!(prior.len(), 1);

        prior.insert(SectionKind::History, "");
        assert!(prior.is_empty());
    }

    #[test]
    fn test_before_excludes_self_and_later() {
        let prior = PriorSections::new()
            .with(SectionKind::History, "hx")
            .with(SectionKind::ChiefComplaint, "cc")
            .with(SectionKind::SoapPlan, "soap");

        let before_cc = prior.before(SectionKind::ChiefComplaint);
        assert_eq!(before_cc.len(), 1);
        assert_eq!(before_cc.get(SectionKind::History), Some("hx"));
        assert!(prior.before(SectionKind::History).is_empty());
    }
}
