//! Parse JSON-mode completions
//!
//! The model is asked for a single object with one key per section. Output is
//! frequently wrapped in a Markdown fence and, when the token budget runs out,
//! cut off mid-string. Both are handled here before giving up and handing the
//! raw text to the heading splitter.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::{AnalysisResponse, SplitOutcome, StructuralWarning};
use crate::section::Section;
use crate::splitter::ResponseSplitter;
use crate::text::{clean_text, format_suggestion};

/// Alternative keys accepted for a section
fn keys_for(section: Section) -> &'static [&'static str] {
    match section {
        Section::ModelStack => &["model_stack"],
        Section::SceneFit => &["scene_fit"],
        Section::DataMoat => &["data_moat"],
        Section::UxFriction => &["ux_friction"],
        Section::CommercialRoi => &["commercial_roi"],
        Section::Suggestion => &["strategy_advice", "suggestion"],
    }
}

/// Remove a surrounding ```json fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Best-effort completion of a JSON document that was cut off.
///
/// Closes an unterminated string, drops a dangling `,` or a key without a
/// value, then closes every open object and array in reverse order.
pub fn repair_truncated_json(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    if out.is_empty() {
        return "{}".to_string();
    }

    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in out.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => stack.push(c),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    loop {
        let trimmed = out.trim_end();
        if let Some(rest) = trimmed.strip_suffix(',') {
            out = rest.to_string();
        } else if let Some(rest) = trimmed.strip_suffix(':') {
            // key without a value: drop the key as well
            let rest = rest.trim_end();
            let key_start = rest
                .strip_suffix('"')
                .and_then(|r| r.rfind('"'))
                .unwrap_or(rest.len());
            out = rest[..key_start].to_string();
        } else {
            out = trimmed.to_string();
            break;
        }
    }

    while let Some(open) = stack.pop() {
        out.push(if open == '{' { '}' } else { ']' });
    }
    out
}

/// Parses JSON completions into an [`AnalysisResponse`]
#[derive(Debug, Clone, Default)]
pub struct JsonResponseParser {
    fallback: ResponseSplitter,
}

impl JsonResponseParser {
    pub fn new(fallback: ResponseSplitter) -> Self {
        Self { fallback }
    }

    pub fn parse(&self, raw: &str) -> SplitOutcome {
        let body = strip_code_fence(raw);
        let mut warnings = Vec::new();

        let object = match serde_json::from_str::<Map<String, Value>>(body) {
            Ok(object) => object,
            Err(first_error) => {
                let repaired = repair_truncated_json(body);
                match serde_json::from_str::<Map<String, Value>>(&repaired) {
                    Ok(object) => {
                        warn!(error = %first_error, "repaired truncated JSON response");
                        warnings.push(StructuralWarning::RepairedJson);
                        object
                    }
                    Err(_) => {
                        warn!(error = %first_error, "JSON response unusable, splitting on headings");
                        let mut outcome = self.fallback.split(raw);
                        outcome
                            .warnings
                            .insert(0, StructuralWarning::MalformedJson(first_error.to_string()));
                        return outcome;
                    }
                }
            }
        };

        let mut response = AnalysisResponse::default();
        for section in Section::ALL {
            let value = keys_for(section).iter().find_map(|key| object.get(*key));
            match value {
                Some(value) => {
                    let text = match (section, value) {
                        (Section::Suggestion, _) => format_suggestion(value),
                        (_, Value::String(s)) => s.trim().to_string(),
                        (_, other) => format_suggestion(other),
                    };
                    response.set(section, clean_text(&text));
                }
                None => warnings.push(StructuralWarning::MissingSection(section)),
            }
        }

        debug!(keys = object.len(), warnings = warnings.len(), "parsed JSON response");
        SplitOutcome { response, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"{
        "model_stack": "Gemini plus retrieval",
        "scene_fit": "Meeting notes",
        "data_moat": "Usage logs",
        "ux_friction": "Slow onboarding",
        "commercial_roi": "Per-seat pricing",
        "strategy_advice": [{"strategy": "Go vertical", "description": "Legal teams first."}]
    }"#;

    #[test]
    fn test_parse_complete_object() {
        let outcome = JsonResponseParser::default().parse(COMPLETE);

        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.response.model_stack, "Gemini plus retrieval");
        assert_eq!(outcome.response.commercial_roi, "Per-seat pricing");
        assert_eq!(
            outcome.response.suggestion,
            "**Strategy 1: Go vertical**\n\nLegal teams first."
        );
    }

    #[test]
    fn test_parse_fenced_object_with_escapes() {
        let raw = "```json\n{\"model_stack\": \"line one\\\\nline two\", \"suggestion\": \"Niche down\"}\n```";
        let outcome = JsonResponseParser::default().parse(raw);

        assert_eq!(outcome.response.model_stack, "line one\nline two");
        assert_eq!(outcome.response.suggestion, "Niche down");
        assert_eq!(
            outcome.warnings,
            vec![
                StructuralWarning::MissingSection(Section::SceneFit),
                StructuralWarning::MissingSection(Section::DataMoat),
                StructuralWarning::MissingSection(Section::UxFriction),
                StructuralWarning::MissingSection(Section::CommercialRoi),
            ]
        );
    }

    #[test]
    fn test_repair_truncated_string() {
        let raw = r#"{"model_stack": "Gemini", "scene_fit": "Meeting no"#;
        let outcome = JsonResponseParser::default().parse(raw);

        assert_eq!(outcome.warnings[0], StructuralWarning::RepairedJson);
        assert_eq!(outcome.response.model_stack, "Gemini");
        assert_eq!(outcome.response.scene_fit, "Meeting no");
        assert!(outcome
            .warnings
            .contains(&StructuralWarning::MissingSection(Section::Suggestion)));
    }

    #[test]
    fn test_repair_drops_dangling_key() {
        assert_eq!(
            repair_truncated_json(r#"{"a": "x", "b":"#),
            r#"{"a": "x"}"#
        );
        assert_eq!(repair_truncated_json(r#"{"a": ["x", "y","#), r#"{"a": ["x", "y"]}"#);
        assert_eq!(repair_truncated_json(""), "{}");
        assert_eq!(repair_truncated_json("{"), "{}");
    }

    #[test]
    fn test_unparseable_json_falls_back_to_headings() {
        let raw = "MODEL STACK: a\nSCENE-FIT: b\nDATA MOAT: c\nUX FRICTION: d\nCOMMERCIAL ROI: e\nSUGGESTION: f";
        let outcome = JsonResponseParser::default().parse(raw);

        assert!(matches!(outcome.warnings[0], StructuralWarning::MalformedJson(_)));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.response.data_moat, "c");
        assert_eq!(outcome.response.suggestion, "f");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }
}
