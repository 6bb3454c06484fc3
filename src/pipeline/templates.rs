//! Instruction templates for each section kind

use super::kind::SectionKind;
use crate::structured::catalog;

/// Writing guidance for the present illness narrative inside History.
///
/// A session may replace this block with its own style.
pub const DEFAULT_PRESENT_ILLNESS_STYLE: &str = r#"Start with: "The [age]-year-old [sex] with [key underlying] was in his/her usual state of health until [time of symptom onset] ago when [symptom] occurred "
Order: symptom onset, description of symptoms & chronology → evaluations/tests → interventions/response → current status/reason for admission.
Reflects the current admission and clearly distinguishes prior vs current data.
End with: "Under the impression of [tentative diagnosis], he/she was admitted for [surgical procedure]/[further workup] on [date]."
Use paragraph breaks to separate major events or phases.
Use absolute dates `YYYY/MM/DD` when available; otherwise anchored time phrases ("3 days prior to admission").
Quantify with units (e.g., "Na 114 mmol/L"); name standard scales/classifications (e.g., "CAD-RADS 2.0, P4/HRP").
Expand non-universal abbreviations at first mention.
Document negatives only if explicitly stated (e.g., "denies fever")."#;

const HISTORY: &str = r#"# ROLE
- You are a medical scribe writing a structured patient history for an admission note.

# TASK
- Combine prior records with the newly provided admission fragments.
- Write in a clinically neutral, concise NEJM-style voice.
- Base the present illness primarily on the new admission information; merge prior history only when it clarifies context.
- The inputs may be incomplete: triage notes, dictation snippets, labs, imaging, prior diagnoses and medications. Link the fragments.

# OUTPUT RULES
## No fabrication of diagnoses, doses, dates, results, or denials.
## Underlying
   - List the chronic conditions given in the context, copied as written.
   - Include treatment status when provided (e.g., "Hypertension, under treatment", "Cholecystitis, status post LC surgery in 2005").
   - If explicitly negative or not mentioned: None
## Present illness
{present_illness_style}
## Other fields
   - Allergy, current medication, past surgical history and family history are lists; None when negative or not mentioned.
   - Social history (alcohol, betel nuts, cigarette, travel history, occupation, contact history, cluster) are short factual strings; None when negative or not mentioned."#;

const CHIEF_COMPLAINT: &str = r#"# ROLE
- You are a medical scribe writing the chief complaint for an admission note.

# TASK
- Write the chief complaint from the patient's history.

# OUTPUT RULES
- One concise sentence summarizing the main problem, in the patient's own words when possible.
- Capture the single most important reason for the visit."#;

const DIAGNOSIS: &str = r#"# ROLE
- You are a medical scribe writing the tentative diagnosis for an admission note.

# TASK
- Write the tentative diagnosis from the patient's history and chief complaint.

# OUTPUT RULES
## Active problems
   - The primary diagnoses or problems that require immediate attention or investigation: the impression or assessment.
## Underlying
   - Copy the underlying diseases exactly as provided. Do not change them."#;

const ROS: &str = r#"# ROLE
- You are a medical scribe writing the review of systems for an admission note.

# TASK
- List the positive symptoms, each with a clinical description.

# OUTPUT RULES
- Only include symptoms that are PRESENT.
- Every positive symptom needs a description, e.g. "mild, for 3 days", "rated 8/10", "worse at night", "intermittent".
- Use the exact symptom keys below. When a symptom is not listed, choose the closest key and put the detail in its description.
- If no symptom is positive, return no symptoms.

# SYMPTOM KEYS
{symptom_keys}"#;

const PHYSICAL_EXAM: &str = r#"# ROLE
- You are a medical scribe writing the physical examination for an admission note.

# TASK
- List the abnormal findings, each with a specific description.

# OUTPUT RULES
- Only include findings that are ABNORMAL.
- Every abnormal finding needs a description, e.g. "coma for 4 days", "bilateral rhonchi", "E2M4V2", "3/5 on right side".
- Use the exact finding keys below.
- If every finding is normal, return no findings.

# FINDING KEYS
{finding_keys}"#;

const SOAP_PLAN: &str = r#"# ROLE
- You are a medical scribe writing the treatment plan for an admission note.

# TASK
- From the context, write a concise plan and the treatment goals.

# OUTPUT RULES
- Plan: specific, actionable treatment steps, each starting with a verb.
- Treatment goals: desired clinical outcomes, each starting with a verb.
- Use standard medical terminology and abbreviations. Keep each item short.
- Do not number the items.

# EXAMPLES
- Plan: "Schedule coronary angiogram on 12/4; explain indications and risks to the patient and family", "Administer aspirin 325 mg PO daily"
- Treatment goals: "Maintain stable vital signs", "Prevent angina on exertion post-treatment""#;

fn key_list<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    keys.map(|k| format!("`{}`", k)).collect::<Vec<_>>().join(", ")
}

/// Instruction block for `kind`; `history_style` replaces the present illness guidance
pub fn instruction(kind: SectionKind, history_style: Option<&str>) -> String {
    match kind {
        SectionKind::History => {
            let style = history_style
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_PRESENT_ILLNESS_STYLE);
            HISTORY.replace("{present_illness_style}", style)
        }
        SectionKind::ChiefComplaint => CHIEF_COMPLAINT.to_string(),
        SectionKind::TentativeDiagnosis => DIAGNOSIS.to_string(),
        SectionKind::ReviewOfSystems => {
            ROS.replace("{symptom_keys}", &key_list(catalog::symptom_keys()))
        }
        SectionKind::PhysicalExamination => {
            PHYSICAL_EXAM.replace("{finding_keys}", &key_list(catalog::finding_keys()))
        }
        SectionKind::SoapPlan => SOAP_PLAN.to_string(),
    }
}

/// Closing line telling the model what shape of reply to produce
pub fn output_format(kind: SectionKind, structured: bool) -> String {
    if structured {
        "# OUTPUT FORMAT\n- Reply with a single JSON object that follows the response schema.".to_string()
    } else {
        format!(
            "# OUTPUT FORMAT\n- Reply with the {} text only, ready to paste into the admission note. Do not use JSON or Markdown.",
            kind.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_style_override() {
        let custom = instruction(SectionKind::History, Some("  Keep it to two sentences. "));
        assert!(custom.contains("## Present illness\nKeep it to two sentences.\n## Other fields"));
        assert!(!custom.contains("usual state of health"));

        let blank = instruction(SectionKind::History, Some("   "));
        assert!(blank.contains(DEFAULT_PRESENT_ILLNESS_STYLE));
    }

    #[test]
    fn test_key_lists_are_filled_in() {
        let ros = instruction(SectionKind::ReviewOfSystems, None);
        assert!(ros.contains("`fever`, `chills`"));
        assert!(!ros.contains("{symptom_keys}"));

        let pe = instruction(SectionKind::PhysicalExamination, None);
        assert!(pe.contains("`extremities_rom`"));
    }
}
