//! Supported model registry
//!
//! Lists the Gemini models the shell offers in its picker, with guidance on
//! when each is a good choice. Any identifier may still be selected; the
//! registry only informs the picker.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model used when a session starts or a selection is blank
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Identifier of a model on the remote API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Blank identifiers fall back to [`DEFAULT_MODEL`]
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().trim();
        if id.is_empty() {
            Self(DEFAULT_MODEL.to_string())
        } else {
            Self(id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_MODEL
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_string())
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Picker entry for a model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub description: &'static str,
    /// Whether structured (schema constrained) replies are reliable
    pub reliable_structured_output: bool,
}

const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.5-flash",
        description: "Recommended balance of speed and quality",
        reliable_structured_output: true,
    },
    ModelInfo {
        id: "gemini-2.5-flash-lite",
        description: "Fastest, may drop fields on long records",
        reliable_structured_output: false,
    },
    ModelInfo {
        id: "gemini-2.5-pro",
        description: "Highest quality, slowest and most expensive",
        reliable_structured_output: true,
    },
    ModelInfo {
        id: "gemini-2.0-flash",
        description: "Previous generation flash model",
        reliable_structured_output: true,
    },
    ModelInfo {
        id: "gemini-2.0-flash-lite",
        description: "Previous generation, weakest on structured output",
        reliable_structured_output: false,
    },
];

/// Registry of models offered by the shell
pub struct ModelRegistry;

impl ModelRegistry {
    pub fn all() -> &'static [ModelInfo] {
        MODELS
    }

    pub fn get(id: &str) -> Option<&'static ModelInfo> {
        MODELS.iter().find(|m| m.id == id)
    }

    pub fn is_known(id: &ModelId) -> bool {
        Self::get(id.as_str()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_model_falls_back_to_default() {
        assert_eq!(ModelId::new("  "), ModelId::default());
        assert!(ModelId::new("").is_default());
        assert_eq!(ModelId::new(" gemini-2.5-pro ").as_str(), "gemini-2.5-pro");
    }

    #[test]
    fn test_registry_contains_default() {
        let info = ModelRegistry::get(DEFAULT_MODEL).expect("default model listed");
        assert!(info.reliable_structured_output);
        assert_eq!(ModelRegistry::all()[0].id, DEFAULT_MODEL);
    }

    #[test]
    fn test_unknown_models_are_allowed_but_not_listed() {
        let custom = ModelId::new("gemini-exp-1206");
        assert!(!ModelRegistry::is_known(&custom));
        assert_eq!(custom.to_string(), "gemini-exp-1206");
    }
}
