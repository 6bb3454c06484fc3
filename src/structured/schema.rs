//! Reply models and JSON response schemas for structured generation
//!
//! Each section kind has a serde model for the JSON the model returns and a
//! matching response schema in the OpenAPI subset the Gemini API accepts.
//! Deserialization is lenient the way model output needs it to be: `null`,
//! a single string, or a list are all accepted for list fields, and items
//! reading "None" count as absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::catalog;
use crate::pipeline::SectionKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHistory {
    #[serde(default, deserialize_with = "text_field")]
    pub alcohol: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub betel_nuts: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub cigarette: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub travel_history: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub contact_history: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReply {
    #[serde(default, deserialize_with = "list_field")]
    pub underlying: Vec<String>,
    #[serde(default)]
    pub present_illness: String,
    #[serde(default, deserialize_with = "list_field")]
    pub allergy: Vec<String>,
    #[serde(default, deserialize_with = "list_field")]
    pub current_medication: Vec<String>,
    #[serde(default, deserialize_with = "list_field")]
    pub past_surgical_history: Vec<String>,
    #[serde(default, deserialize_with = "list_field")]
    pub family_history: Vec<String>,
    #[serde(default)]
    pub social_history: Option<SocialHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChiefComplaintReply {
    pub chief_complaint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisReply {
    #[serde(default, deserialize_with = "list_field")]
    pub active_problem: Vec<String>,
    #[serde(default, deserialize_with = "list_field")]
    pub underlying: Vec<String>,
}

/// Positive symptoms as paired lists; `descriptions[i]` belongs to `symptoms[i]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosReply {
    #[serde(default, deserialize_with = "paired_field")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "paired_field")]
    pub descriptions: Vec<String>,
}

impl RosReply {
    /// Description for a positive symptom, `Some("")` when positive without one
    pub fn positive(&self, key: &str) -> Option<&str> {
        let idx = self.symptoms.iter().position(|s| s == key)?;
        Some(self.descriptions.get(idx).map(String::as_str).unwrap_or(""))
    }
}

/// Abnormal findings as paired lists; `descriptions[i]` belongs to `findings[i]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalExamReply {
    #[serde(default, deserialize_with = "paired_field")]
    pub findings: Vec<String>,
    #[serde(default, deserialize_with = "paired_field")]
    pub descriptions: Vec<String>,
}

impl PhysicalExamReply {
    /// Description for an abnormal finding; a finding without one reads "abnormal"
    pub fn abnormal(&self, key: &str) -> Option<&str> {
        let idx = self.findings.iter().position(|f| f == key)?;
        match self.descriptions.get(idx).map(String::as_str) {
            Some(desc) if !desc.is_empty() => Some(desc),
            _ => Some("abnormal"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapPlanReply {
    #[serde(default, deserialize_with = "list_field")]
    pub plan: Vec<String>,
    #[serde(default, deserialize_with = "list_field")]
    pub treatment_goal: Vec<String>,
}

/// A parsed structured reply for one section kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum StructuredReply {
    History(HistoryReply),
    ChiefComplaint(ChiefComplaintReply),
    Diagnosis(DiagnosisReply),
    ReviewOfSystems(RosReply),
    PhysicalExam(PhysicalExamReply),
    SoapPlan(SoapPlanReply),
}

impl StructuredReply {
    /// Parse the raw reply text for `kind`
    pub fn parse(kind: SectionKind, text: &str) -> serde_json::Result<Self> {
        let body = strip_code_fence(text);
        Ok(match kind {
            SectionKind::History => Self::History(serde_json::from_str(body)?),
            SectionKind::ChiefComplaint => Self::ChiefComplaint(serde_json::from_str(body)?),
            SectionKind::TentativeDiagnosis => Self::Diagnosis(serde_json::from_str(body)?),
            SectionKind::ReviewOfSystems => Self::ReviewOfSystems(serde_json::from_str(body)?),
            SectionKind::PhysicalExamination => Self::PhysicalExam(serde_json::from_str(body)?),
            SectionKind::SoapPlan => Self::SoapPlan(serde_json::from_str(body)?),
        })
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::History(_) => SectionKind::History,
            Self::ChiefComplaint(_) => SectionKind::ChiefComplaint,
            Self::Diagnosis(_) => SectionKind::TentativeDiagnosis,
            Self::ReviewOfSystems(_) => SectionKind::ReviewOfSystems,
            Self::PhysicalExam(_) => SectionKind::PhysicalExamination,
            Self::SoapPlan(_) => SectionKind::SoapPlan,
        }
    }
}

/// Accept a reply wrapped in a ```json fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn is_absent(item: &str) -> bool {
    item.is_empty() || item.eq_ignore_ascii_case("none") || item.eq_ignore_ascii_case("null")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<Option<String>>),
    Text(String),
}

/// Non-blank items of a list field
fn list_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<String> = match Option::<ListOrText>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ListOrText::Text(text)) => text.lines().map(str::to_string).collect(),
        Some(ListOrText::List(items)) => items.into_iter().flatten().collect(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !is_absent(s))
        .collect())
}

/// List field whose positions matter; blank items are kept as empty strings
fn paired_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListOrText>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ListOrText::Text(text)) if is_absent(text.trim()) => Vec::new(),
        Some(ListOrText::Text(text)) => vec![text.trim().to_string()],
        Some(ListOrText::List(items)) => items
            .into_iter()
            .map(|item| item.map(|s| s.trim().to_string()).unwrap_or_default())
            .collect(),
    })
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !is_absent(s)))
}

fn nullable_string(description: &str) -> Value {
    json!({ "type": "STRING", "nullable": true, "description": description })
}

fn nullable_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "nullable": true,
        "description": description,
        "items": { "type": "STRING" }
    })
}

/// Response schema sent with a structured request for `kind`
pub fn response_schema(kind: SectionKind) -> Value {
    match kind {
        SectionKind::History => json!({
            "type": "OBJECT",
            "properties": {
                "underlying": nullable_list("List of chronic conditions."),
                "present_illness": { "type": "STRING", "description": "Current admission story." },
                "allergy": nullable_list("Medication allergies."),
                "current_medication": nullable_list("Current medications with doses."),
                "past_surgical_history": nullable_list("Previous surgeries with dates/years."),
                "family_history": nullable_list("Family medical history."),
                "social_history": {
                    "type": "OBJECT",
                    "nullable": true,
                    "description": "Social history details including alcohol, smoking, occupation, etc.",
                    "properties": {
                        "alcohol": nullable_string("Alcohol use status."),
                        "betel_nuts": nullable_string("Betel nut use status."),
                        "cigarette": nullable_string("Cigarette use status. Document pack-years."),
                        "travel_history": nullable_string("Recent travel history."),
                        "occupation": nullable_string("Patient's occupation."),
                        "contact_history": nullable_string("Contact history with infectious diseases."),
                        "cluster": nullable_string("Cluster exposure or outbreak history.")
                    }
                }
            },
            "required": ["present_illness"],
            "propertyOrdering": [
                "underlying", "present_illness", "allergy", "current_medication",
                "past_surgical_history", "family_history", "social_history"
            ]
        }),
        SectionKind::ChiefComplaint => json!({
            "type": "OBJECT",
            "properties": {
                "chief_complaint": {
                    "type": "STRING",
                    "description": "Concise summary of patient's main presenting problem in their own words"
                }
            },
            "required": ["chief_complaint"]
        }),
        SectionKind::TentativeDiagnosis => json!({
            "type": "OBJECT",
            "properties": {
                "active_problem": nullable_list(
                    "List of primary diagnoses or problems requiring immediate attention or investigation. This is the 'impression' or 'assessment'."
                ),
                "underlying": nullable_list(
                    "Chronic or predisposing conditions. Directly copy from provided context without any modification."
                )
            },
            "propertyOrdering": ["active_problem", "underlying"]
        }),
        SectionKind::ReviewOfSystems => json!({
            "type": "OBJECT",
            "properties": {
                "symptoms": {
                    "type": "ARRAY",
                    "nullable": true,
                    "description": "List of present symptom keys. Only include symptoms that are PRESENT.",
                    "items": {
                        "type": "STRING",
                        "format": "enum",
                        "enum": catalog::symptom_keys().collect::<Vec<_>>()
                    }
                },
                "descriptions": nullable_list(
                    "List of symptom descriptions corresponding to each symptom (e.g., 'high grade for 3 days'). Must match symptoms list length."
                )
            },
            "propertyOrdering": ["symptoms", "descriptions"]
        }),
        SectionKind::PhysicalExamination => json!({
            "type": "OBJECT",
            "properties": {
                "findings": {
                    "type": "ARRAY",
                    "nullable": true,
                    "description": "List of abnormal physical exam finding keys. Only include findings that are ABNORMAL.",
                    "items": {
                        "type": "STRING",
                        "format": "enum",
                        "enum": catalog::finding_keys().collect::<Vec<_>>()
                    }
                },
                "descriptions": nullable_list(
                    "List of abnormal descriptions corresponding to each finding (e.g., 'BP 180/100'). Must match findings list length."
                )
            },
            "propertyOrdering": ["findings", "descriptions"]
        }),
        SectionKind::SoapPlan => json!({
            "type": "OBJECT",
            "properties": {
                "plan": nullable_list("List of specific actionable treatment steps"),
                "treatment_goal": nullable_list("List of desired clinical outcomes")
            },
            "propertyOrdering": ["plan", "treatment_goal"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_fields_accept_null_text_and_none_items() {
        let reply: DiagnosisReply = serde_json::from_str(
            r#"{"active_problem": "Migraine\nDehydration", "underlying": ["None"]}"#,
        )
        .unwrap();
        assert_eq!(reply.active_problem, vec!["Migraine", "Dehydration"]);
        assert!(reply.underlying.is_empty());

        let reply: DiagnosisReply = serde_json::from_str(r#"{"active_problem": null}"#).unwrap();
        assert_eq!(reply, DiagnosisReply::default());
    }

    #[test]
    fn test_paired_fields_keep_positions() {
        let reply: RosReply = serde_json::from_str(
            r#"{"symptoms": ["fever", "cough"], "descriptions": [null, "dry"]}"#,
        )
        .unwrap();
        assert_eq!(reply.positive("fever"), Some(""));
        assert_eq!(reply.positive("cough"), Some("dry"));
        assert_eq!(reply.positive("rash"), None);
    }

    #[test]
    fn test_abnormal_finding_without_description() {
        let reply = PhysicalExamReply {
            findings: vec!["gait".into(), "breath_sounds".into()],
            descriptions: vec!["ataxic".into()],
        };
        assert_eq!(reply.abnormal("gait"), Some("ataxic"));
        assert_eq!(reply.abnormal("breath_sounds"), Some("abnormal"));
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let reply = StructuredReply::parse(
            SectionKind::ChiefComplaint,
            "```json\n{\"chief_complaint\": \"Headache for 3 days\"}\n```",
        )
        .unwrap();
        assert_eq!(
            reply,
            StructuredReply::ChiefComplaint(ChiefComplaintReply {
                chief_complaint: "Headache for 3 days".into()
            })
        );
        assert_eq!(reply.kind(), SectionKind::ChiefComplaint);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(StructuredReply::parse(SectionKind::SoapPlan, "Here is the plan:").is_err());
    }

    #[test]
    fn test_every_kind_has_object_schema() {
        for kind in SectionKind::ALL {
            assert_eq!(response_schema(kind)["type"], "OBJECT");
        }
        let ros = response_schema(SectionKind::ReviewOfSystems);
        let allowed = ros["properties"]["symptoms"]["items"]["enum"]
            .as_array()
            .unwrap();
        assert!(allowed.iter().any(|v| v == "headache"));
    }
}
