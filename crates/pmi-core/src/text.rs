//! Text cleanup for model output

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn blank_runs() -> &'static Regex {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Turn literal escape sequences left in model output into real whitespace
/// and collapse runs of blank lines.
pub fn clean_text(text: &str) -> String {
    let unescaped = text
        .replace("\\\\n", "\n")
        .replace("\\\\t", "\t")
        .replace("\\\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r");

    blank_runs().replace_all(&unescaped, "\n\n").into_owned()
}

/// Render a suggestion value into readable text.
///
/// Models sometimes answer the suggestion block with a list of
/// `{"strategy": .., "description": ..}` objects, or a string that embeds
/// such a list. Those are flattened into numbered paragraphs; anything else
/// is returned as-is.
pub fn format_suggestion(value: &Value) -> String {
    match value {
        Value::String(s) => match embedded_json(s) {
            // only when the string ends with a block of strategies
            Some((parsed, end)) if s[end..].trim().is_empty() && is_strategies(&parsed) => {
                format_suggestion(&parsed)
            }
            _ => s.trim().to_string(),
        },
        Value::Array(items) => {
            let blocks: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Object(_) => format_strategy(item, Some(idx + 1)),
                    Value::String(s) => format!("**Suggestion {}:** {}", idx + 1, s.trim()),
                    other => other.to_string(),
                })
                .filter(|block| !block.is_empty())
                .collect();
            blocks.join("\n\n---\n\n")
        }
        Value::Object(_) => format_strategy(value, None),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_strategy(item: &Value) -> bool {
    item.get("strategy").is_some() || item.get("description").is_some()
}

fn is_strategies(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(is_strategy),
        other => is_strategy(other),
    }
}

fn format_strategy(item: &Value, index: Option<usize>) -> String {
    let strategy = item.get("strategy").and_then(Value::as_str).unwrap_or("").trim();
    let description = item
        .get("description")
        .and_then(Value::as_str)
        .map(|d| {
            d.replace("\\n", "\n")
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if strategy.is_empty() && description.is_empty() {
        return item.to_string();
    }

    let mut out = String::new();
    if !strategy.is_empty() {
        match index {
            Some(n) => out.push_str(&format!("**Strategy {n}: {strategy}**")),
            None => out.push_str(&format!("**Strategy: {strategy}**")),
        }
    }
    if !description.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&description);
    }
    out
}

/// Parse the first balanced `[..]` or `{..}` block inside a string,
/// returning it with the byte offset just past the block
fn embedded_json(s: &str) -> Option<(Value, usize)> {
    let start = s.find(['[', '{'])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in s[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '[' | '{' if !in_string => depth += 1,
            ']' | '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return serde_json::from_str(&s[start..end]).ok().map(|v| (v, end));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_text_unescapes_and_collapses() {
        assert_eq!(clean_text("a\\nb\\tc"), "a\nb\tc");
        assert_eq!(clean_text("a\\\\nb"), "a\nb");
        assert_eq!(clean_text("one\n\n\n\n\ntwo"), "one\n\ntwo");
        assert_eq!(clean_text("plain"), "plain");
    }

    #[test]
    fn test_format_suggestion_list_of_strategies() {
        let value = json!([
            {"strategy": "Go vertical", "description": "Target legal teams.\\n  Ship templates."},
            {"strategy": "Undercut", "description": "Free tier for students."}
        ]);

        assert_eq!(
            format_suggestion(&value),
            "**Strategy 1: Go vertical**\n\nTarget legal teams.\nShip templates.\n\n---\n\n**Strategy 2: Undercut**\n\nFree tier for students."
        );
    }

    #[test]
    fn test_format_suggestion_embedded_in_string() {
        let value = json!("Here you go: {\"strategy\": \"Local first\", \"description\": \"Offline mode.\"}");
        assert_eq!(
            format_suggestion(&value),
            "**Strategy: Local first**\n\nOffline mode."
        );
    }

    #[test]
    fn test_format_suggestion_plain_values() {
        assert_eq!(format_suggestion(&json!("  Focus on SMBs. ")), "Focus on SMBs.");
        assert_eq!(
            format_suggestion(&json!(["Bundle", "Partner"])),
            "**Suggestion 1:** Bundle\n\n---\n\n**Suggestion 2:** Partner"
        );
        assert_eq!(format_suggestion(&json!(null)), "");
        assert_eq!(format_suggestion(&json!("use [brackets] wisely")), "use [brackets] wisely");
    }

    #[test]
    fn test_format_suggestion_keeps_prose_with_bracketed_json() {
        let prose = "Target the top [3] verticals: legal and medical.";
        assert_eq!(format_suggestion(&json!(prose)), prose);

        let trailing = "Try {\"strategy\": \"Bundle\"} and then expand to EU.";
        assert_eq!(format_suggestion(&json!(trailing)), trailing);

        assert_eq!(format_suggestion(&json!("Focus on [\"a\", \"b\"]")), "Focus on [\"a\", \"b\"]");
    }
}
