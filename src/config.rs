//! Process configuration
//!
//! Read from the environment, then overridden by command-line flags:
//!
//! | Variable | Default |
//! |---|---|
//! | `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) | none |
//! | `LAZYRESIDENT_MODEL` | `gemini-2.5-flash` |
//! | `LAZYRESIDENT_API_URL` | `https://generativelanguage.googleapis.com/v1beta` |
//! | `LAZYRESIDENT_TIMEOUT_MS` | no timeout |
//! | `LAZYRESIDENT_STRUCTURED_OUTPUT` | `true` |
//! | `LAZYRESIDENT_LOG_LEVEL` | `info` |

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::ModelId;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: ModelId,
    pub api_url: String,
    /// Request timeout; `None` waits as long as the API takes
    pub timeout: Option<Duration>,
    pub structured_output: bool,
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("structured_output", &self.structured_output)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: ModelId::default(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            structured_output: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup (the environment, or a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("GOOGLE_API_KEY"))
            .map(|k| k.trim().to_string());
        let model = ModelId::new(non_blank("LAZYRESIDENT_MODEL").unwrap_or_default());
        let api_url = non_blank("LAZYRESIDENT_API_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout = non_blank("LAZYRESIDENT_TIMEOUT_MS")
            .map(|raw| parse_timeout_ms(&raw))
            .transpose()?;
        let structured_output = non_blank("LAZYRESIDENT_STRUCTURED_OUTPUT")
            .map(|raw| parse_bool("LAZYRESIDENT_STRUCTURED_OUTPUT", &raw))
            .transpose()?
            .unwrap_or(true);
        let log_level = non_blank("LAZYRESIDENT_LOG_LEVEL")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let config = Self {
            api_key,
            model,
            api_url,
            timeout,
            structured_output,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = ModelId::new(model);
        }
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        if let Some(ms) = timeout_ms {
            self.timeout = Some(Duration::from_millis(ms));
        }
        self
    }

    pub fn with_structured_output(mut self, structured: bool) -> Self {
        self.structured_output = structured;
        self
    }

    /// Check values that flags may have changed after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.as_str().chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                key: "model".to_string(),
                value: self.model.to_string(),
                expected: "a model identifier without spaces".to_string(),
            });
        }
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                key: "LAZYRESIDENT_API_URL".to_string(),
                value: self.api_url.clone(),
                expected: "an http:// or https:// URL".to_string(),
            });
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                key: "LAZYRESIDENT_TIMEOUT_MS".to_string(),
                value: "0".to_string(),
                expected: "a positive number of milliseconds".to_string(),
            });
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue {
            key: "LAZYRESIDENT_TIMEOUT_MS".to_string(),
            value: raw.to_string(),
            expected: "a positive number of milliseconds".to_string(),
        })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_gemini_key_wins_over_google_key() {
        let config = load(&[("GEMINI_API_KEY", " g-key "), ("GOOGLE_API_KEY", "other")]).unwrap();
        assert_eq!(config.require_api_key(), Ok("g-key"));

        let config = load(&[("GEMINI_API_KEY", ""), ("GOOGLE_API_KEY", "other")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("other"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LAZYRESIDENT_MODEL", "gemini-2.5-pro"),
            ("LAZYRESIDENT_API_URL", "http://localhost:8080/v1beta/"),
            ("LAZYRESIDENT_TIMEOUT_MS", "30000"),
            ("LAZYRESIDENT_STRUCTURED_OUTPUT", "off"),
        ])
        .unwrap();
        assert_eq!(config.model.as_str(), "gemini-2.5-pro");
        assert_eq!(config.api_url, "http://localhost:8080/v1beta");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(!config.structured_output);
    }

    #[test_case("LAZYRESIDENT_TIMEOUT_MS", "soon" ; "non numeric timeout")]
    #[test_case("LAZYRESIDENT_TIMEOUT_MS", "0" ; "zero timeout")]
    #[test_case("LAZYRESIDENT_STRUCTURED_OUTPUT", "maybe" ; "bad bool")]
    #[test_case("LAZYRESIDENT_API_URL", "ftp://example.com" ; "bad url")]
    #[test_case("LAZYRESIDENT_MODEL", "gemini 2.5" ; "model with space")]
    fn test_invalid_values(key: &str, value: &str) {
        assert!(matches!(
            load(&[(key, value)]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = Config::default().with_api_key(Some("secret".to_string()));
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
