//! Request and response types for one competitive analysis

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::section::Section;
use crate::{Error, Result};

/// A validated product to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    product_description: String,
}

impl AnalysisRequest {
    /// Create a request, rejecting empty or whitespace-only input
    pub fn new(product_description: impl AsRef<str>) -> Result<Self> {
        let trimmed = product_description.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "Please enter a competitor name or product description".to_string(),
            ));
        }
        Ok(Self {
            product_description: trimmed.to_string(),
        })
    }

    pub fn product_description(&self) -> &str {
        &self.product_description
    }
}

/// Section texts extracted from one completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub model_stack: String,
    pub scene_fit: String,
    pub data_moat: String,
    pub ux_friction: String,
    pub commercial_roi: String,
    pub suggestion: String,
}

impl AnalysisResponse {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::ModelStack => &self.model_stack,
            Section::SceneFit => &self.scene_fit,
            Section::DataMoat => &self.data_moat,
            Section::UxFriction => &self.ux_friction,
            Section::CommercialRoi => &self.commercial_roi,
            Section::Suggestion => &self.suggestion,
        }
    }

    pub fn set(&mut self, section: Section, text: impl Into<String>) {
        let slot = match section {
            Section::ModelStack => &mut self.model_stack,
            Section::SceneFit => &mut self.scene_fit,
            Section::DataMoat => &mut self.data_moat,
            Section::UxFriction => &mut self.ux_friction,
            Section::CommercialRoi => &mut self.commercial_roi,
            Section::Suggestion => &mut self.suggestion,
        };
        *slot = text.into();
    }

    /// Sections paired with their text, in canonical order
    pub fn sections(&self) -> impl Iterator<Item = (Section, &str)> {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// True when every section has content
    pub fn is_complete(&self) -> bool {
        self.sections().all(|(_, text)| !text.trim().is_empty())
    }

    /// Write the sections back out as `HEADING: text` lines
    pub fn to_sections_text(&self) -> String {
        self.sections()
            .map(|(section, text)| format!("{}: {}", section.heading(), text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Non-fatal notice that the completion did not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StructuralWarning {
    /// No heading for this section was found
    MissingSection(Section),
    /// The heading only appeared before an earlier section
    OutOfOrder(Section),
    /// The provider stopped at the output token limit
    TruncatedCompletion,
    /// JSON output was cut off and had to be patched before parsing
    RepairedJson,
    /// JSON output could not be parsed; headings were used instead
    MalformedJson(String),
}

impl StructuralWarning {
    /// The section this warning refers to, if any
    pub fn section(&self) -> Option<Section> {
        match self {
            StructuralWarning::MissingSection(s) | StructuralWarning::OutOfOrder(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralWarning::MissingSection(s) => {
                write!(f, "section '{}' was not found in the response", s.heading())
            }
            StructuralWarning::OutOfOrder(s) => {
                write!(f, "section '{}' appeared out of order and was skipped", s.heading())
            }
            StructuralWarning::TruncatedCompletion => {
                f.write_str("the response hit the output token limit and may be incomplete")
            }
            StructuralWarning::RepairedJson => {
                f.write_str("the JSON response was truncated and has been repaired")
            }
            StructuralWarning::MalformedJson(reason) => {
                write!(f, "the JSON response could not be parsed ({reason}); fell back to headings")
            }
        }
    }
}

/// Parsed response plus whatever went wrong structurally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub response: AnalysisResponse,
    pub warnings: Vec<StructuralWarning>,
}

/// Result of one run of the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub request: AnalysisRequest,
    pub response: AnalysisResponse,
    pub warnings: Vec<StructuralWarning>,
    pub model_id: String,
    pub attempts: u32,
}

impl AnalysisOutcome {
    pub fn product(&self) -> &str {
        self.request.product_description()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
