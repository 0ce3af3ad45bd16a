//! Gemini integration for PM Insight Copilot
//!
//! This crate provides the Gemini implementation of the LLMProvider trait.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::{
    GeminiConfig, DEFAULT_API_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};

// Re-export core types for convenience
pub use pmi_core::{
    LLMProvider, GenerationConfig, GenerationResult, ResponseFormat, Error, Result,
};
