//! Fixed clinical vocabularies used by structured replies
//!
//! The model is told to pick symptom and finding keys from these lists, and
//! the renderers lay their output out in the same order.

/// Review-of-systems groups, each with its symptom keys in display order
pub const ROS_GROUPS: &[(&str, &[&str])] = &[
    (
        "Systemic",
        &[
            "fever",
            "chills",
            "night_sweats",
            "fatigue",
            "somnolence",
            "weight_loss",
            "decreased_appetite",
            "consciousness_disturbance",
            "diffuse_arthralgias_myalgias",
            "heat_cold_intolerance",
            "thirsty",
            "general_edema",
            "insomnia",
        ],
    ),
    (
        "Head/Eyes",
        &[
            "headache",
            "dizziness",
            "vertigo",
            "photophobia",
            "diplopia",
            "visual_field_defect",
            "blurred_vision",
            "ocular_pain",
            "eye_redness",
            "dry_eye",
            "excess_tearing",
            "alopecia",
            "head_trauma",
            "cataracts",
            "glaucoma",
        ],
    ),
    (
        "Ears/Nose",
        &[
            "hearing_impairment",
            "tinnitus",
            "otalgia",
            "otorrhea",
            "nasal_congestion",
            "rhinorrhea",
            "epistaxis",
            "anosmia",
        ],
    ),
    (
        "Mouth/Throat",
        &[
            "oral_ulcer",
            "gum_bleeding",
            "dry_mouth",
            "dental_problems",
            "sore_throat",
            "dysphagia",
            "odynophagia",
            "hoarseness",
        ],
    ),
    (
        "Cardiovascular/Respiratory",
        &[
            "cough",
            "sputum",
            "hemoptysis",
            "wheezes",
            "dyspnea",
            "chest_tightness",
            "orthopnea",
            "paroxysmal_nocturnal_dyspnea",
            "syncope",
            "palpitation",
            "intermittent_claudication",
        ],
    ),
    (
        "Gastrointestinal",
        &[
            "anorexia",
            "nausea",
            "vomiting_bilious_feculent",
            "hematemesis",
            "heartburn_acid_regurgitation",
            "belching",
            "hiccup",
            "abdominal_pain",
            "diarrhea",
            "constipation",
            "bloody_stool",
            "clay_colored_stool",
            "change_of_bowel_habit",
            "tenesmus",
            "flatulence",
        ],
    ),
    (
        "Genitourinary",
        &[
            "urinary_frequency",
            "urgency",
            "dysuria",
            "incontinence",
            "nocturia",
            "polyuria",
            "oliguria",
            "small_stream_of_urine",
            "hesitancy",
            "cloudy_urine",
            "hematuria",
            "incomplete_voiding",
            "urinary_retention",
            "flank_pain",
            "impotence",
            "abnormal_sexual_exposure",
        ],
    ),
    ("Gynecological", &["abnormal_menstruation"]),
    (
        "Skin/Hematological",
        &[
            "rash",
            "pruritus",
            "dryness",
            "jaundice",
            "color_changes",
            "moles",
            "plaque",
            "ulcers",
            "hair_loss",
            "hirsutism",
            "telangiectasia",
            "petechiae",
            "ecchymoses",
            "purpura",
        ],
    ),
    (
        "Musculoskeletal",
        &[
            "arthralgia",
            "myalgia",
            "back_pain",
            "bone_pain",
            "joint_stiffness",
            "cramps",
            "fractures",
        ],
    ),
    (
        "Neurological",
        &[
            "numbness",
            "paresis_plegia",
            "convulsion",
            "paresthesia",
            "allodynia",
            "resting_tremor",
            "gait_disturbance",
        ],
    ),
    (
        "Psychiatric",
        &[
            "insomnia_psychiatric",
            "memory_loss",
            "anxiety",
            "panic",
            "hallucination",
            "delusion",
            "depression",
            "suicidality",
        ],
    ),
];

/// Physical examination finding keys with the text used when a finding is normal
pub const PE_FINDINGS: &[(&str, &str)] = &[
    ("consciousness", "clear and oriented."),
    ("vital_signs", "as above."),
    ("eye_conjunctiva", "not pale"),
    ("eye_sclera", "anicteric"),
    ("eye_light_reflex", "+/ +"),
    ("neck_supple", "supple"),
    ("neck_lap", "no LAP"),
    ("neck_jugular_vein", "no jugular vein engorgement"),
    ("neck_goiter", "no goiter"),
    ("cranial_nerves", "CNII-XII grossly intact."),
    ("motor_strength", "5/5 throughout"),
    ("motor_tone", "within normal limits"),
    ("sensation", "intact to sharp and dull throughout."),
    ("gait", "within normal limits."),
    ("chest_expansion", "symmetric expansion"),
    ("chest_deformity", "no deformity"),
    ("breath_sounds", "clear"),
    ("heart_rhythm", "regular heart beats"),
    ("heart_murmur", "no murmur"),
    ("abdomen_soft_flat", "soft and flat"),
    ("abdomen_tenderness", "no tenderness"),
    ("abdomen_rebounding", "no rebounding pain"),
    ("abdomen_shifting_dullness", "no shifting dullness"),
    ("abdomen_mcburney", "no McBurney point tenderness"),
    ("abdomen_roving", "no Roving's sign"),
    ("bowel_sound", "normoactive."),
    ("liver_spleen", "not palpable."),
    ("op_scar", "no visible op scar."),
    ("cv_angle_tenderness", "no CV angle knocking tenderness."),
    ("extremities_rom", "free range of motion"),
];

/// All symptom keys, group by group
pub fn symptom_keys() -> impl Iterator<Item = &'static str> {
    ROS_GROUPS.iter().flat_map(|(_, keys)| keys.iter().copied())
}

pub fn finding_keys() -> impl Iterator<Item = &'static str> {
    PE_FINDINGS.iter().map(|(key, _)| *key)
}

/// Normal-finding text for a physical examination key
pub fn normal_finding(key: &str) -> Option<&'static str> {
    PE_FINDINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, normal)| *normal)
}

/// `night_sweats` -> `night sweats`
pub fn display_name(key: &str) -> String {
    key.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_symptom_keys_are_unique() {
        let keys: Vec<_> = symptom_keys().collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert_eq!(ROS_GROUPS.len(), 12);
    }

    #[test]
    fn test_finding_defaults() {
        assert_eq!(normal_finding("neck_lap"), Some("no LAP"));
        assert_eq!(normal_finding("tail"), None);
        assert_eq!(finding_keys().count(), PE_FINDINGS.len());
    }
}
