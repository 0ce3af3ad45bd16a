//! Gemini configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use pmi_core::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Configuration for the Gemini client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Create configuration from environment variables, reading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("GOOGLE_API_KEY"))
            .ok_or_else(|| Error::Configuration(
                "GEMINI_API_KEY environment variable not found. Add it to a .env file or export it in your shell".to_string()
            ))?;

        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_url = non_empty("GEMINI_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match non_empty("GEMINI_TIMEOUT_SECS") {
            Some(raw) => parse_number(&raw, "GEMINI_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let max_output_tokens = match non_empty("GEMINI_MAX_OUTPUT_TOKENS") {
            Some(raw) => parse_number(&raw, "GEMINI_MAX_OUTPUT_TOKENS")?,
            None => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        let config = Self {
            api_key: api_key.trim().to_string(),
            model,
            api_url,
            timeout_secs,
            max_output_tokens,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject configurations that cannot possibly work
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration("Gemini API key is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("Gemini model name is empty".to_string()));
        }
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(Error::Configuration(format!(
                "GEMINI_API_URL must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration("GEMINI_TIMEOUT_SECS must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} must be a positive integer, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = GeminiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_defaults_and_fallback_key() {
        let config = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_overrides() {
        let config = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", " key "),
            ("GOOGLE_API_KEY", "ignored"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_URL", "http://localhost:8080/"),
            ("GEMINI_TIMEOUT_SECS", "15"),
            ("GEMINI_MAX_OUTPUT_TOKENS", "2048"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_output_tokens, 2048);
    }

    #[test]
    fn test_invalid_numbers_and_urls() {
        let err = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GEMINI_TIMEOUT_SECS"));

        let err = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_API_URL", "generativelanguage.googleapis.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        assert!(GeminiConfig::new("key").with_timeout_secs(0).validate().is_err());
    }
}
