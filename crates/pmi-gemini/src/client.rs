//! Gemini client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use pmi_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, ResponseFormat, Result,
};

use crate::config::GeminiConfig;

/// Gemini `generateContent` client
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationParams,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationParams {
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    pub total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_2_5_FLASH_LITE: &'static str = "gemini-2.5-flash-lite";
    pub const GEMINI_2_5_FLASH: &'static str = "gemini-2.5-flash";
    pub const GEMINI_2_5_PRO: &'static str = "gemini-2.5-pro";

    /// Create a new Gemini client from configuration.
    ///
    /// The configuration is validated first, so a missing key is reported
    /// before any connection is attempted.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.model = model_id.into();
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Generation settings derived from the client configuration
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.config.model.clone(),
            max_tokens: self.config.max_output_tokens,
            timeout: self.config.timeout(),
            ..Default::default()
        }
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url, model_id
        )
    }

    /// Perform the actual generation request
    async fn perform_generation(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request_body = build_request(prompt, config);
        let url = self.endpoint(&config.model_id);
        debug!(%url, model = %config.model_id, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!(
                        "Gemini did not answer within {}s",
                        config.timeout.as_secs()
                    ))
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_status(status.as_u16(), &body));
        }

        let mut result = completion_from_body(&body)?;
        result.model_id = config.model_id.clone();
        if result.truncated {
            warn!(model = %config.model_id, "Gemini stopped at the output token limit");
        }
        Ok(result)
    }
}

pub(crate) fn build_request(prompt: &str, config: &GenerationConfig) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: GenerationParams {
            max_output_tokens: config.max_tokens,
            temperature: config.temperature,
            response_mime_type: match config.response_format {
                ResponseFormat::Sections => "text/plain",
                ResponseFormat::Json => "application/json",
            },
        },
    }
}

/// Map a non-success HTTP answer onto the error taxonomy, keeping the
/// provider's own message when there is one.
pub(crate) fn error_from_status(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = parsed
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error details returned".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        });

    let invalid_key = parsed.as_ref().is_some_and(|e| {
        e.details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"))
    });
    let exhausted = parsed
        .as_ref()
        .is_some_and(|e| e.status == "RESOURCE_EXHAUSTED");

    match status {
        401 | 403 => Error::Authentication(message),
        400 if invalid_key => Error::Authentication(message),
        429 => Error::RateLimited(message),
        _ if exhausted => Error::RateLimited(message),
        _ => Error::Provider {
            status: Some(status),
            message,
        },
    }
}

/// Parse a 200 body. A body Gemini should never send is still Gemini's fault,
/// so it is reported as a provider error.
pub(crate) fn completion_from_body(body: &str) -> Result<GenerationResult> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| Error::Provider {
        status: Some(200),
        message: format!("Unexpected Gemini response: {}", e),
    })?;
    completion_from_response(parsed)
}

/// Pull the completion text out of a successful response
pub(crate) fn completion_from_response(response: GenerateContentResponse) -> Result<GenerationResult> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(Error::provider(format!("Prompt was blocked by Gemini ({})", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::provider("Gemini returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(Error::provider(format!(
            "Empty response from Gemini (finish reason: {})",
            if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
        )));
    }

    Ok(GenerationResult {
        text,
        model_id: String::new(),
        tokens_used: response.usage_metadata.and_then(|u| u.total_token_count),
        truncated: finish_reason == "MAX_TOKENS",
    })
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = self.generation_config();
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        match timeout(config.timeout, generation_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Gemini did not answer within {}s",
                config.timeout.as_secs()
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_fails_before_any_request() {
        let err = GeminiClient::new(GeminiConfig::new("")).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(
            GeminiConfig::new("key").with_api_url("http://localhost:9000/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-pro"),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model_id(), GeminiClient::GEMINI_2_5_FLASH_LITE);
    }

    #[test]
    fn test_error_mapping() {
        let invalid_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT", "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            error_from_status(400, invalid_key),
            Error::Authentication(m) if m.starts_with("API key not valid")
        ));

        let quota = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(error_from_status(429, quota), Error::RateLimited(m) if m == "Quota exceeded"));

        let bad_request = r#"{"error": {"code": 400, "message": "Invalid JSON payload", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            error_from_status(400, bad_request),
            Error::Provider { status: Some(400), message } if message == "Invalid JSON payload"
        ));

        assert!(matches!(error_from_status(403, ""), Error::Authentication(_)));
        assert!(matches!(
            error_from_status(503, "upstream unavailable"),
            Error::Provider { status: Some(503), message } if message == "upstream unavailable"
        ));
    }

    #[test]
    fn test_completion_from_response() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "MODEL STACK: a\n"}, {"text": "SCENE-FIT: b"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }"#;
        let result = completion_from_response(serde_json::from_str(body).unwrap()).unwrap();

        assert_eq!(result.text, "MODEL STACK: a\nSCENE-FIT: b");
        assert_eq!(result.tokens_used, Some(15));
        assert!(!result.truncated);
    }

    #[test]
    fn test_truncated_and_blocked_responses() {
        let truncated = r#"{"candidates": [{"content": {"parts": [{"text": "MODEL STACK: a"}]}, "finishReason": "MAX_TOKENS"}]}"#;
        let result = completion_from_response(serde_json::from_str(truncated).unwrap()).unwrap();
        assert!(result.truncated);

        let blocked = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = completion_from_response(serde_json::from_str(blocked).unwrap()).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("SAFETY"));

        let empty = r#"{"candidates": [{"finishReason": "RECITATION"}]}"#;
        let err = completion_from_response(serde_json::from_str(empty).unwrap()).unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn test_unparseable_success_body_is_provider_error() {
        let err = completion_from_body("<html>upstream hiccup</html>").unwrap_err();
        assert!(matches!(err, Error::Provider { status: Some(200), .. }));
        assert_eq!(err.category(), pmi_core::ErrorCategory::Provider);

        let ok = completion_from_body(
            r#"{"candidates": [{"content": {"parts": [{"text": "MODEL STACK: a"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.text, "MODEL STACK: a");
    }

    #[test]
    fn test_request_mime_type_follows_format() {
        let mut config = GenerationConfig::default();
        let body = serde_json::to_value(build_request("hi", &config)).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");

        config.response_format = ResponseFormat::Json;
        let body = serde_json::to_value(build_request("hi", &config)).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Nothing listens on port 9 on loopback
        let client = GeminiClient::new(
            GeminiConfig::new("key")
                .with_api_url("http://127.0.0.1:9")
                .with_timeout_secs(5),
        )
        .unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }
}
