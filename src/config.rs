//! Flow configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! environment overrides (`JINGLE_MODEL`, `JINGLE_BASE_URL`,
//! `JINGLE_TIMEOUT_SECS`, `JINGLE_TEMPERATURE`).

use crate::error::{Error, ErrorContext};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Provider id; also the keyring user name for API key lookup.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Explicit API key. Prefer the keyring or `api_key_env` outside tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    /// Whole-request timeout. There is no automatic retry.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl FlowConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid config file: {}", e),
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(model) = env::var("JINGLE_MODEL") {
            self.model = model;
        }
        if let Ok(base_url) = env::var("JINGLE_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(secs) = env::var("JINGLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
        if let Some(t) = env::var("JINGLE_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
        {
            self.temperature = Some(t);
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model must not be empty",
                ErrorContext::new().with_field_path("model"),
            ));
        }
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base_url: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone()),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported base_url scheme '{}'", parsed.scheme()),
                ErrorContext::new().with_field_path("base_url"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout_secs must be greater than zero",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = FlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_yaml_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model: gemini-1.5-pro\ntimeout_secs: 12\ntemperature: 0.9").unwrap();

        let config = FlowConfig::load(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.temperature, Some(0.9));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = FlowConfig {
            base_url: "not a url".into(),
            ..FlowConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("base_url")
        );

        let config = FlowConfig {
            timeout_secs: 0,
            ..FlowConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FlowConfig {
            base_url: "ftp://example.com".into(),
            ..FlowConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = FlowConfig {
            base_url: "http://localhost:8080/".into(),
            ..FlowConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080");
    }
}
