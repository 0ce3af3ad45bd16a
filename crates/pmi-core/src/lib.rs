//! Core traits and types for PM Insight Copilot
//!
//! This crate holds everything that does not touch the network: the
//! [`LLMProvider`] seam, prompt construction, splitting completions into the
//! five analysis dimensions plus the suggestion block, and report rendering.

pub mod analysis;
pub mod analyzer;
pub mod error;
pub mod json_response;
pub mod llm;
pub mod prompt;
pub mod report;
pub mod section;
pub mod splitter;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

pub use analysis::{
    AnalysisOutcome, AnalysisRequest, AnalysisResponse, SplitOutcome, StructuralWarning,
};
pub use analyzer::Analyzer;
pub use error::{Error, ErrorCategory, Result};
pub use json_response::JsonResponseParser;
pub use llm::{GenerationConfig, GenerationResult, LLMProvider, ResponseFormat};
pub use prompt::PromptBuilder;
pub use section::{Section, SectionHeadings, DEFAULT_HEADINGS};
pub use splitter::{split_sections, ResponseSplitter};
pub use types::*;
