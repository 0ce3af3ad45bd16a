//! Markdown report rendering

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::analysis::AnalysisResponse;
use crate::section::Section;

const NO_DATA: &str = "_No data_";

/// Render a full Markdown report for one analysis
pub fn render_markdown<Tz>(product: &str, response: &AnalysisResponse, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();

    out.push_str(&format!("# Competitive Analysis Report: {}\n\n", product));
    out.push_str(&format!(
        "**Generated:** {}\n\n---\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "This report analyzes **{}** across five dimensions: technology stack, scene fit, \
         data moat, user experience friction and commercial value.\n\n---\n\n",
        product
    ));

    for (idx, section) in Section::DIMENSIONS.into_iter().enumerate() {
        out.push_str(&format!("## {}. {}\n\n", idx + 1, section.title()));
        out.push_str(body_or_placeholder(response.get(section)));
        out.push_str("\n\n---\n\n");
    }

    out.push_str(&format!("## {}\n\n", Section::Suggestion.title()));
    out.push_str(body_or_placeholder(&response.suggestion));
    out.push_str("\n\n---\n\n");
    out.push_str("*Generated by PM Insight Copilot*\n");

    out
}

fn body_or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        NO_DATA
    } else {
        text.trim()
    }
}

/// File name for an exported report. Only alphanumerics, space, `-` and `_`
/// survive from the product name.
pub fn report_file_name<Tz>(product: &str, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let safe: String = product
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim();
    let safe = if safe.is_empty() { "product" } else { safe };

    format!(
        "competitive-analysis_{}_{}.md",
        safe,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_report_file_name_sanitizes_product() {
        assert_eq!(
            report_file_name("Notion AI / v2!", &fixed_time()),
            "competitive-analysis_Notion AI  v2_20250314_092653.md"
        );
        assert_eq!(
            report_file_name("???", &fixed_time()),
            "competitive-analysis_product_20250314_092653.md"
        );
    }

    #[test]
    fn test_render_markdown_has_every_section() {
        let mut response = AnalysisResponse::default();
        response.model_stack = "Gemini".to_string();
        response.suggestion = "Go vertical".to_string();

        let report = render_markdown("Notion AI", &response, &fixed_time());

        assert!(report.starts_with("# Competitive Analysis Report: Notion AI\n\n**Generated:** 2025-03-14 09:26:53"));
        for section in Section::ALL {
            assert!(report.contains(section.title()));
        }
        assert!(report.contains("## 1. Model Stack (technology & model dependencies)\n\nGemini\n"));
        assert!(report.contains("## 2. Scene-Fit (core use cases served)\n\n_No data_\n"));
        assert!(report.contains("## Asymmetric Competition Suggestion\n\nGo vertical\n"));
        assert!(report.ends_with("*Generated by PM Insight Copilot*\n"));
    }
}
