//! Prompt construction for competitive analysis

use crate::analysis::AnalysisRequest;
use crate::llm::ResponseFormat;
use crate::section::Section;

/// What the model should cover under each section
fn checklist(section: Section) -> &'static [&'static str] {
    match section {
        Section::ModelStack => &[
            "Core technology stack the product is built on",
            "AI models or frameworks it depends on",
            "How modern and scalable the architecture is",
            "Technical risks and third-party dependencies",
        ],
        Section::SceneFit => &[
            "The concrete usage scenarios the product targets",
            "How narrowly and precisely those scenarios are segmented",
            "Completeness and depth of scenario coverage",
            "Scenario needs that remain underserved",
        ],
        Section::DataMoat => &[
            "Where and how the product acquires data",
            "Data quality and volume",
            "How the data feedback loop is formed",
            "Strength and durability of the data moat",
        ],
        Section::UxFriction => &[
            "Main pain points users hit while using the product",
            "Friction points in the interaction flow",
            "Overall fluency and ease of use",
            "Interaction steps that need improvement",
        ],
        Section::CommercialRoi => &[
            "Business model and revenue drivers",
            "Whether the pricing strategy is reasonable",
            "Willingness to pay of the target users",
            "Sustainability and growth potential of monetization",
        ],
        Section::Suggestion => &[
            "Based on the analysis above, give 1-2 concrete asymmetric competition strategies",
            "Each strategy must be actionable and offer a differentiated advantage",
        ],
    }
}

/// Builds the instruction sent to the model
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    format: ResponseFormat,
    language: Option<String>,
}

impl PromptBuilder {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            language: None,
        }
    }

    /// Ask the model to answer in a specific language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = (!language.trim().is_empty()).then(|| language.trim().to_string());
        self
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Build the full prompt for a validated request
    pub fn build(&self, request: &AnalysisRequest) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are a senior product manager and competitive analysis expert. \
             Perform an in-depth analysis of the following competitor or product.\n\n",
        );
        prompt.push_str(&format!(
            "Product under analysis: {}\n\n",
            request.product_description()
        ));
        prompt.push_str(
            "Analyze it strictly along the following dimensions. Every dimension needs a \
             detailed, professional assessment.\n\n",
        );

        for (idx, section) in Section::ALL.into_iter().enumerate() {
            prompt.push_str(&format!("{}. {} ({})\n", idx + 1, section.heading(), section.title()));
            for item in checklist(section) {
                prompt.push_str(&format!("- {}\n", item));
            }
            prompt.push('\n');
        }

        match self.format {
            ResponseFormat::Sections => self.push_sections_format(&mut prompt),
            ResponseFormat::Json => self.push_json_format(&mut prompt),
        }

        if let Some(language) = &self.language {
            prompt.push_str(&format!("\nWrite the analysis in {}.\n", language));
        }

        prompt
    }

    fn push_sections_format(&self, prompt: &mut String) {
        prompt.push_str("Output format:\n");
        prompt.push_str(
            "Start each section on its own line with its heading in capitals followed by a colon, \
             in exactly this order, and do not add any other headings:\n",
        );
        for section in Section::ALL {
            prompt.push_str(&format!("{}: <analysis>\n", section.heading()));
        }
        prompt.push_str(
            "\nEnsure the analysis is thorough and grounded in a realistic understanding \
             of the product.\n",
        );
    }

    fn push_json_format(&self, prompt: &mut String) {
        prompt.push_str("Output format:\n");
        prompt.push_str(
            "Return a single JSON object containing exactly these 6 keys, no more and no fewer:\n{\n",
        );
        let keys: Vec<String> = Section::ALL
            .into_iter()
            .map(|section| format!("    \"{}\": \"<{} analysis>\"", section.json_key(), section.heading()))
            .collect();
        prompt.push_str(&keys.join(",\n"));
        prompt.push_str("\n}\n\n");
        prompt.push_str(
            "Requirements:\n\
             1. Return valid, complete JSON; do not truncate it\n\
             2. Key names must match the 6 keys above exactly\n\
             3. Keep each value complete; condense long content rather than cutting it off\n\
             4. Escape quotes inside JSON strings correctly\n",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> AnalysisRequest {
        AnalysisRequest::new(text).unwrap()
    }

    #[test]
    fn test_prompt_contains_all_dimension_labels() {
        for input in ["Notion AI", "a", "Midjourney: image generation for designers"] {
            for format in [ResponseFormat::Sections, ResponseFormat::Json] {
                let prompt = PromptBuilder::new(format).build(&request(input));
                for section in Section::DIMENSIONS {
                    assert!(prompt.contains(section.heading()), "{section} missing for {input}");
                }
                assert!(prompt.contains(input.trim()));
            }
        }
    }

    #[test]
    fn test_sections_format_lists_headings_in_order() {
        let prompt = PromptBuilder::default().build(&request("ChatGPT"));
        let positions: Vec<usize> = Section::ALL
            .iter()
            .map(|s| prompt.find(&format!("{}: <analysis>", s.heading())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!prompt.contains("JSON object"));
    }

    #[test]
    fn test_json_format_lists_keys() {
        let prompt = PromptBuilder::new(ResponseFormat::Json).build(&request("ChatGPT"));
        for section in Section::ALL {
            assert!(prompt.contains(&format!("\"{}\"", section.json_key())));
        }
    }

    #[test]
    fn test_language_instruction() {
        let prompt = PromptBuilder::default()
            .with_language("Chinese")
            .build(&request("Kimi"));
        assert!(prompt.trim_end().ends_with("Write the analysis in Chinese."));

        let prompt = PromptBuilder::default().with_language("  ").build(&request("Kimi"));
        assert!(!prompt.contains("Write the analysis in"));
    }
}
