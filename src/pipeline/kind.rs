//! The six section kinds and their fixed pipeline order

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// One of the six admission-note sections.
///
/// Variant order is pipeline order, so `Ord` sorts sections the way they
/// are generated and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    #[serde(rename = "history")]
    History,
    #[serde(rename = "chief_complaint")]
    ChiefComplaint,
    #[serde(rename = "diagnosis")]
    TentativeDiagnosis,
    #[serde(rename = "ros")]
    ReviewOfSystems,
    #[serde(rename = "physical_exam")]
    PhysicalExamination,
    #[serde(rename = "soap")]
    SoapPlan,
}

impl SectionKind {
    /// All kinds in pipeline order
    pub const ALL: [SectionKind; 6] = [
        SectionKind::History,
        SectionKind::ChiefComplaint,
        SectionKind::TentativeDiagnosis,
        SectionKind::ReviewOfSystems,
        SectionKind::PhysicalExamination,
        SectionKind::SoapPlan,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::ChiefComplaint => "chief_complaint",
            Self::TentativeDiagnosis => "diagnosis",
            Self::ReviewOfSystems => "ros",
            Self::PhysicalExamination => "physical_exam",
            Self::SoapPlan => "soap",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::History => "History",
            Self::ChiefComplaint => "Chief Complaint",
            Self::TentativeDiagnosis => "Tentative Diagnosis",
            Self::ReviewOfSystems => "Review of Systems",
            Self::PhysicalExamination => "Physical Examination",
            Self::SoapPlan => "SOAP Note",
        }
    }

    /// 1-based position in the pipeline
    pub fn position(&self) -> usize {
        match self {
            Self::History => 1,
            Self::ChiefComplaint => 2,
            Self::TentativeDiagnosis => 3,
            Self::ReviewOfSystems => 4,
            Self::PhysicalExamination => 5,
            Self::SoapPlan => 6,
        }
    }

    /// Sections that should have content before this one is generated.
    ///
    /// Advisory only: generation is never blocked on these.
    pub fn prerequisites(&self) -> &'static [SectionKind] {
        match self {
            Self::History => &[],
            Self::ChiefComplaint | Self::TentativeDiagnosis => &[Self::History],
            Self::ReviewOfSystems => &[Self::History, Self::ChiefComplaint, Self::TentativeDiagnosis],
            Self::PhysicalExamination => &[
                Self::History,
                Self::ChiefComplaint,
                Self::TentativeDiagnosis,
                Self::ReviewOfSystems,
            ],
            Self::SoapPlan => &[Self::History, Self::TentativeDiagnosis],
        }
    }

    /// Kinds strictly earlier in the pipeline
    pub fn predecessors(&self) -> impl Iterator<Item = SectionKind> {
        let this = *self;
        Self::ALL.into_iter().filter(move |k| *k < this)
    }

    /// The kind that follows this one, if any
    pub fn next(&self) -> Option<SectionKind> {
        Self::ALL.into_iter().find(|k| k > self)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SectionKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "history" | "hx" | "1" => Ok(Self::History),
            "chief_complaint" | "cc" | "2" => Ok(Self::ChiefComplaint),
            "diagnosis" | "tentative_diagnosis" | "dx" | "3" => Ok(Self::TentativeDiagnosis),
            "ros" | "review_of_systems" | "4" => Ok(Self::ReviewOfSystems),
            "physical_exam" | "physical_examination" | "pe" | "5" => {
                Ok(Self::PhysicalExamination)
            }
            "soap" | "soap_plan" | "plan" | "6" => Ok(Self::SoapPlan),
            _ => Err(SessionError::UnknownSection {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order_matches_ord() {
        let mut shuffled = vec![
            SectionKind::SoapPlan,
            SectionKind::History,
            SectionKind::ReviewOfSystems,
            SectionKind::ChiefComplaint,
            SectionKind::PhysicalExamination,
            SectionKind::TentativeDiagnosis,
        ];
        shuffled.sort();
        assert_eq!(shuffled, SectionKind::ALL.to_vec());

        for (i, kind) in SectionKind::ALL.iter().enumerate() {
            assert_eq!(kind.position(), i + 1);
        }
    }

    #[test]
    fn test_section_kind_parsing() {
        assert_eq!("cc".parse::<SectionKind>(), Ok(SectionKind::ChiefComplaint));
        assert_eq!(
            "Physical Exam".parse::<SectionKind>(),
            Ok(SectionKind::PhysicalExamination)
        );
        assert_eq!(
            "review-of-systems".parse::<SectionKind>(),
            Ok(SectionKind::ReviewOfSystems)
        );
        assert_eq!("6".parse::<SectionKind>(), Ok(SectionKind::SoapPlan));
        assert!("discharge".parse::<SectionKind>().is_err());
    }

    #[test]
    fn test_keys_round_trip_through_parse() {
        for kind in SectionKind::ALL {
            assert_eq!(kind.key().parse::<SectionKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_predecessors_and_next() {
        let before: Vec<_> = SectionKind::ReviewOfSystems.predecessors().collect();
        assert_eq!(
            before,
            vec![
                SectionKind::History,
                SectionKind::ChiefComplaint,
                SectionKind::TentativeDiagnosis
            ]
        );
        assert_eq!(SectionKind::History.predecessors().count(), 0);
        assert_eq!(SectionKind::History.next(), Some(SectionKind::ChiefComplaint));
        assert_eq!(SectionKind::SoapPlan.next(), None);
    }

    #[test]
    fn test_prerequisites_are_earlier_sections() {
        for kind in SectionKind::ALL {
            assert!(kind.prerequisites().iter().all(|p| p < &kind));
        }
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&SectionKind::TentativeDiagnosis).unwrap();
        assert_eq!(json, "\"diagnosis\"");
    }
}
