//! Formatted terminal output.
//!
//! We keep formatting code in one place so the pipelines only produce data and
//! output changes stay localized.

use crossterm::style::{StyledContent, Stylize};

use crate::domain::{ConfidenceTier, ModelVariant, Progress};
use crate::report::{ExtractionSummary, KeywordSummary};

/// `"Processing memo 3 of 10... (30%)"`
pub fn format_progress<T>(progress: &Progress<T>, verb: &str, noun: &str) -> String {
    format!(
        "{verb} {noun} {} of {}... ({}%)",
        progress.index,
        progress.total,
        progress.percent()
    )
}

/// Tier name coloured like the spreadsheet fill it stands for.
pub fn styled_tier(tier: ConfidenceTier) -> StyledContent<&'static str> {
    let name = tier.display_name();
    match tier {
        ConfidenceTier::Success => name.green(),
        ConfidenceTier::Warning => name.yellow(),
        ConfidenceTier::Failure => name.red(),
    }
}

pub fn format_extraction_summary(summary: &ExtractionSummary, variant: ModelVariant) -> String {
    let mut out = String::new();
    out.push_str("=== bids - Memo Extraction ===\n");
    out.push_str(&format!(
        "Model: {} ({})\n",
        variant.display_name(),
        variant.model_id()
    ));
    out.push_str(&format!("Rows: {}\n", summary.rows));
    out.push_str(&format!("- extracted: {}\n", summary.extracted));
    out.push_str(&format!("- blank memo: {}\n", summary.blank));
    out.push_str(&format!("- failed (left blank): {}\n", summary.failed));
    out
}

pub fn format_keyword_summary(summary: &KeywordSummary, threshold: f32) -> String {
    let mut out = String::new();
    out.push_str("=== bids - Keyword Tagging ===\n");
    out.push_str(&format!("Threshold: {threshold:.2}\n"));
    out.push_str(&format!("Rows: {}\n", summary.rows));
    out.push_str(&format!("- blank title: {}\n", summary.blank));
    out.push_str(&format!("- fallback: {}\n", summary.fallbacks));
    if summary.errors > 0 {
        out.push_str(&format!("- classifier errors: {}\n", summary.errors));
    }

    out.push_str("\nConfidence:\n");
    for tier in ConfidenceTier::ALL {
        let bound = match tier {
            ConfidenceTier::Success => format!(">= {:.2}", ConfidenceTier::SUCCESS_MIN),
            ConfidenceTier::Warning => format!(">= {:.2}", ConfidenceTier::WARNING_MIN),
            ConfidenceTier::Failure => format!("< {:.2} or fallback", ConfidenceTier::WARNING_MIN),
        };
        out.push_str(&format!(
            "  {:<14} {:>6}  ({bound})\n",
            styled_tier(tier).to_string(),
            summary.tier_count(tier)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_reports_position_and_percent() {
        let progress = Progress {
            index: 3,
            total: 12,
            item: (),
        };
        assert_eq!(format_progress(&progress, "Processing", "memo"), "Processing memo 3 of 12... (25%)");
    }

    #[test]
    fn extraction_summary_names_variant() {
        let summary = ExtractionSummary {
            rows: 5,
            extracted: 3,
            blank: 1,
            failed: 1,
        };
        let text = format_extraction_summary(&summary, ModelVariant::V2);
        assert!(text.contains("Version 2"));
        assert!(text.contains("failed (left blank): 1"));
    }

    #[test]
    fn keyword_summary_lists_every_tier() {
        let text = format_keyword_summary(&KeywordSummary::default(), 0.4);
        assert!(text.contains("Threshold: 0.40"));
        for tier in ConfidenceTier::ALL {
            assert!(text.contains(tier.display_name()));
        }
    }
}
