//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Output shape requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Plain text with one heading per section
    #[default]
    Sections,
    /// A single JSON object keyed by section
    Json,
}

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gemini-2.5-flash-lite".to_string(),
            max_tokens: 8192,
            temperature: None,
            response_format: ResponseFormat::Sections,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
    /// The provider stopped because the output token budget ran out
    pub truncated: bool,
}

/// Trait for hosted text-generation providers
///
/// One call per prompt, no streaming. Implementations map transport and
/// provider failures onto [`crate::Error`] so the caller can tell a bad
/// credential from a flaky connection.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text using the provider's default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Generate text with custom configuration
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
