//! Error types for PM Insight Copilot

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the analysis pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Provider error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// User-visible error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential missing or rejected. Nothing is sent until it is fixed.
    Configuration,
    /// Connectivity problem or timeout.
    Network,
    /// Provider quota or rate limit.
    RateLimit,
    /// Non-success answer from the inference endpoint.
    Provider,
    /// The user's input was rejected before building a prompt.
    Input,
    /// Everything else.
    Internal,
}

impl Error {
    /// Shorthand for a provider error without an HTTP status
    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Map the error onto the category shown to the user
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration(_) | Error::Authentication(_) => ErrorCategory::Configuration,
            Error::Network(_) | Error::Timeout(_) => ErrorCategory::Network,
            Error::RateLimited(_) => ErrorCategory::RateLimit,
            Error::Provider { .. } => ErrorCategory::Provider,
            Error::InvalidInput(_) => ErrorCategory::Input,
            Error::Serialization(_) | Error::Io(_) | Error::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a single automatic retry is worth attempting
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }

    /// Whether the user should be offered to try again manually
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
