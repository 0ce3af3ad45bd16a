//! Report sections and the heading strings used to find them

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six sections of a competitive analysis, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ModelStack,
    SceneFit,
    DataMoat,
    UxFriction,
    CommercialRoi,
    Suggestion,
}

impl Section {
    /// All sections in the order the model is asked to produce them
    pub const ALL: [Section; 6] = [
        Section::ModelStack,
        Section::SceneFit,
        Section::DataMoat,
        Section::UxFriction,
        Section::CommercialRoi,
        Section::Suggestion,
    ];

    /// The five analytical dimensions, without the suggestion block
    pub const DIMENSIONS: [Section; 5] = [
        Section::ModelStack,
        Section::SceneFit,
        Section::DataMoat,
        Section::UxFriction,
        Section::CommercialRoi,
    ];

    /// Heading written by the model in sections mode
    pub fn heading(self) -> &'static str {
        match self {
            Section::ModelStack => "MODEL STACK",
            Section::SceneFit => "SCENE-FIT",
            Section::DataMoat => "DATA MOAT",
            Section::UxFriction => "UX FRICTION",
            Section::CommercialRoi => "COMMERCIAL ROI",
            Section::Suggestion => "SUGGESTION",
        }
    }

    /// Key used in JSON mode
    pub fn json_key(self) -> &'static str {
        match self {
            Section::ModelStack => "model_stack",
            Section::SceneFit => "scene_fit",
            Section::DataMoat => "data_moat",
            Section::UxFriction => "ux_friction",
            Section::CommercialRoi => "commercial_roi",
            Section::Suggestion => "strategy_advice",
        }
    }

    /// Human-readable panel title
    pub fn title(self) -> &'static str {
        match self {
            Section::ModelStack => "Model Stack (technology & model dependencies)",
            Section::SceneFit => "Scene-Fit (core use cases served)",
            Section::DataMoat => "Data Moat (data flywheel & defensibility)",
            Section::UxFriction => "UX Friction (interaction pain points)",
            Section::CommercialRoi => "Commercial ROI (monetization value)",
            Section::Suggestion => "Asymmetric Competition Suggestion",
        }
    }

    pub fn is_dimension(self) -> bool {
        self != Section::Suggestion
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Heading aliases accepted for each section, in canonical order.
///
/// Matching against these is case-insensitive and ignores whitespace and
/// punctuation, so `Scene Fit`, `scene_fit` and `SCENE-FIT` are equivalent.
pub const DEFAULT_HEADINGS: [(Section, &[&str]); 6] = [
    (Section::ModelStack, &["MODEL STACK"]),
    (Section::SceneFit, &["SCENE-FIT"]),
    (Section::DataMoat, &["DATA MOAT"]),
    (Section::UxFriction, &["UX FRICTION"]),
    (Section::CommercialRoi, &["COMMERCIAL ROI"]),
    (
        Section::Suggestion,
        &["SUGGESTION", "ASYMMETRIC COMPETITION", "STRATEGY ADVICE"],
    ),
];

/// Heading strings the splitter looks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeadings {
    entries: Vec<(Section, Vec<String>)>,
}

impl SectionHeadings {
    /// Replace the aliases for one section
    pub fn with_aliases<I, S>(mut self, section: Section, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        if let Some(entry) = self.entries.iter_mut().find(|(s, _)| *s == section) {
            entry.1 = aliases;
        }
        self
    }

    /// Aliases for a section
    pub fn aliases(&self, section: Section) -> &[String] {
        self.entries
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Sections with their aliases, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[String])> {
        self.entries.iter().map(|(s, a)| (*s, a.as_slice()))
    }
}

impl Default for SectionHeadings {
    fn default() -> Self {
        Self {
            entries: DEFAULT_HEADINGS
                .iter()
                .map(|(section, aliases)| {
                    (*section, aliases.iter().map(|a| a.to_string()).collect())
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headings_follow_canonical_order() {
        let headings = SectionHeadings::default();
        let order: Vec<Section> = headings.iter().map(|(s, _)| s).collect();
        assert_eq!(order, Section::ALL.to_vec());

        for section in Section::ALL {
            assert_eq!(headings.aliases(section)[0], section.heading());
        }
    }

    #[test]
    fn test_with_aliases_replaces_one_section() {
        let headings = SectionHeadings::default()
            .with_aliases(Section::Suggestion, ["RECOMMENDATION"]);
        assert_eq!(headings.aliases(Section::Suggestion), ["RECOMMENDATION"]);
        assert_eq!(headings.aliases(Section::DataMoat), ["DATA MOAT"]);
    }

    #[test]
    fn test_dimensions_exclude_suggestion() {
        assert!(Section::DIMENSIONS.iter().all(|s| s.is_dimension()));
        assert!(!Section::Suggestion.is_dimension());
    }
}
