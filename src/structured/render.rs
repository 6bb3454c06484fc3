//! Rendering structured replies into admission-note text
//!
//! The layouts are what clinicians paste into the hospital record: bracketed
//! headings for History and Diagnosis, a checkbox grid for the review of
//! systems, the fixed nine-part examination template, and S/O/A/P blocks.

use super::catalog::{self, ROS_GROUPS};
use super::schema::{
    ChiefComplaintReply, DiagnosisReply, HistoryReply, PhysicalExamReply, RosReply,
    SoapPlanReply, StructuredReply,
};
use crate::pipeline::{PriorSections, SectionKind};

const POSITIVE: char = '■';
const NEGATIVE: char = '□';

/// Render a reply; SOAP reads the chief complaint, examination and diagnosis
/// from `prior`
pub fn render(reply: &StructuredReply, prior: &PriorSections) -> String {
    match reply {
        StructuredReply::History(h) => render_history(h),
        StructuredReply::ChiefComplaint(cc) => render_chief_complaint(cc),
        StructuredReply::Diagnosis(dx) => render_diagnosis(dx),
        StructuredReply::ReviewOfSystems(ros) => render_ros(ros),
        StructuredReply::PhysicalExam(pe) => render_physical_exam(pe),
        StructuredReply::SoapPlan(plan) => render_soap(plan, prior),
    }
}

/// `Label:` followed by an indented block, or `empty` inline
fn indented_block(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!(" {}", empty);
    }
    items
        .iter()
        .map(|item| format!("\n    {}", item))
        .collect()
}

fn hash_block(items: &[String]) -> String {
    items.iter().map(|item| format!("\n# {}", item)).collect()
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_history(h: &HistoryReply) -> String {
    let social = h.social_history.clone().unwrap_or_default();
    let pick = |value: &Option<String>, default: &'static str| -> String {
        value.clone().unwrap_or_else(|| default.to_string())
    };

    let lines = [
        format!("[Underlying]{}", hash_block(&h.underlying)),
        String::new(),
        "[Present Illness]".to_string(),
        h.present_illness.trim().to_string(),
        String::new(),
        "[Past medical history]".to_string(),
        "1. Systemic diseases: as above-mentioned".to_string(),
        format!("2. Allergy:{}", indented_block(&h.allergy, "denied")),
        format!(
            "3. Current medication:{}",
            indented_block(&h.current_medication, "denied")
        ),
        format!(
            "4. Past surgical history:{}",
            indented_block(&h.past_surgical_history, "denied")
        ),
        format!(
            "5. Family history:{}",
            indented_block(&h.family_history, "no relevant family history")
        ),
        "6. Social history".to_string(),
        format!("    - Alcohol: {}", pick(&social.alcohol, "denied")),
        format!("    - Betel nuts: {}", pick(&social.betel_nuts, "denied")),
        format!("    - Cigarette: {}", pick(&social.cigarette, "denied")),
        format!(
            "    - Travel history: {}",
            pick(&social.travel_history, "denied recent travel history")
        ),
        format!("    - Occupation: {}", pick(&social.occupation, "retired")),
        format!(
            "    - Contact history: {}",
            pick(&social.contact_history, "denied")
        ),
        format!("    - Cluster: {}", pick(&social.cluster, "denied")),
    ];
    lines.join("\n")
}

pub fn render_chief_complaint(cc: &ChiefComplaintReply) -> String {
    cc.chief_complaint.trim().to_string()
}

pub fn render_diagnosis(dx: &DiagnosisReply) -> String {
    let active = if dx.active_problem.is_empty() {
        ": None".to_string()
    } else {
        dx.active_problem
            .iter()
            .map(|p| format!("\n- {}", p))
            .collect()
    };
    let underlying = if dx.underlying.is_empty() {
        "\nDenied history of underlying disease.".to_string()
    } else {
        hash_block(&dx.underlying)
    };
    format!("[Active Problems]{}\n\n[Underlying]{}", active, underlying)
}

/// Twelve-group checkbox grid; positives carry their description in parentheses
pub fn render_ros(ros: &RosReply) -> String {
    let mut out = Vec::with_capacity(ROS_GROUPS.len() * 3);
    for (group, keys) in ROS_GROUPS {
        out.push(format!("{}:", group));
        let marks: Vec<String> = keys
            .iter()
            .map(|key| {
                let name = catalog::display_name(key);
                match ros.positive(key) {
                    Some("") => format!("{}{}", POSITIVE, name),
                    Some(desc) => format!("{}{} ({})", POSITIVE, name, desc),
                    None => format!("{}{}", NEGATIVE, name),
                }
            })
            .collect();
        out.push(marks.join(", "));
        out.push(String::new());
    }
    out.join("\n").trim_end().to_string()
}

pub fn render_physical_exam(pe: &PhysicalExamReply) -> String {
    let f = |key: &str| -> String {
        pe.abnormal(key)
            .or_else(|| catalog::normal_finding(key))
            .unwrap_or("")
            .to_string()
    };

    let lines = [
        format!("1. Consciousness: {}", f("consciousness")),
        format!("2. Vital signs: {}", f("vital_signs")),
        "3. Head, ear, eye, nose and throat:".to_string(),
        format!(
            "(1) Eye: Conjunctiva: {}, Sclera: {}, Light reflex: {}.",
            f("eye_conjunctiva"),
            f("eye_sclera"),
            f("eye_light_reflex")
        ),
        format!(
            "(2) Neck: {}, {}, {}, {}.",
            f("neck_supple"),
            f("neck_lap"),
            f("neck_jugular_vein"),
            f("neck_goiter")
        ),
        "4. Neurological exam:".to_string(),
        format!("(1) Cranial nerve examinations: {}", f("cranial_nerves")),
        format!(
            "(2) Motor systems: strength {}, tone: {}.",
            f("motor_strength"),
            f("motor_tone")
        ),
        format!("(3) Sensation: {}", f("sensation")),
        format!("(4) Gait: {}", f("gait")),
        format!(
            "5. Chest: {} and {}, breath sounds: {}.",
            f("chest_expansion"),
            f("chest_deformity"),
            f("breath_sounds")
        ),
        format!("6. Heart: {}, {}.", f("heart_rhythm"), f("heart_murmur")),
        "7. Abdomen:".to_string(),
        format!(
            "(1) {}, {}, {}, {}, {}, {}.",
            f("abdomen_soft_flat"),
            f("abdomen_tenderness"),
            f("abdomen_rebounding"),
            f("abdomen_shifting_dullness"),
            f("abdomen_mcburney"),
            f("abdomen_roving")
        ),
        format!("(2) Bowel sound: {}", f("bowel_sound")),
        format!("(3) Liver and spleen: {}", f("liver_spleen")),
        format!("(4) Previous OP scar: {}", f("op_scar")),
        format!("8. Back: {}", f("cv_angle_tenderness")),
        format!("9. Extremities: {}", f("extremities_rom")),
    ];
    lines.join("\n")
}

/// Numbered plan, then the treatment goals after a blank line
pub fn render_plan(plan: &SoapPlanReply) -> String {
    let mut parts = Vec::new();
    if !plan.plan.is_empty() {
        parts.push(numbered(&plan.plan));
    }
    if !plan.treatment_goal.is_empty() {
        parts.push(String::new());
        parts.push("Treatment Goal:".to_string());
        parts.push(numbered(&plan.treatment_goal));
    }
    parts.join("\n")
}

pub fn render_soap(plan: &SoapPlanReply, prior: &PriorSections) -> String {
    let subjective = prior.get(SectionKind::ChiefComplaint).unwrap_or("").trim();
    let objective = prior
        .get(SectionKind::PhysicalExamination)
        .map(str::trim)
        .unwrap_or("Physical examination unremarkable");
    let assessment = prior
        .get(SectionKind::TentativeDiagnosis)
        .unwrap_or("")
        .trim();

    format!(
        "S:\n{}\n\nO:\n{}\n\nA:\n{}\n\nP:\n{}",
        subjective,
        objective,
        assessment,
        render_plan(plan)
    )
    .trim_end()
    .to_string()
}
