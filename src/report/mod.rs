//! Reporting utilities: run summaries and formatted terminal output.

use std::collections::HashMap;

use crate::domain::ConfidenceTier;
use crate::stream::{MemoOutcome, MemoStatus, TaggedRow};

pub mod format;

pub use format::*;

/// Counts for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub rows: usize,
    pub extracted: usize,
    pub blank: usize,
    pub failed: usize,
}

impl ExtractionSummary {
    pub fn from_outcomes(outcomes: &[MemoOutcome]) -> Self {
        let mut summary = Self {
            rows: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                MemoStatus::Extracted => summary.extracted += 1,
                MemoStatus::Blank => summary.blank += 1,
                MemoStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Counts for one keyword tagging run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSummary {
    pub rows: usize,
    pub blank: usize,
    pub errors: usize,
    pub fallbacks: usize,
    pub tiers: HashMap<ConfidenceTier, usize>,
}

impl KeywordSummary {
    pub fn from_rows(rows: &[TaggedRow]) -> Self {
        let mut summary = Self {
            rows: rows.len(),
            ..Self::default()
        };
        for row in rows {
            if row.error.is_some() {
                summary.errors += 1;
            } else if row.prediction.keywords.is_empty() {
                summary.blank += 1;
            }
            if row.prediction.fallback_used {
                summary.fallbacks += 1;
            }
            *summary.tiers.entry(row.prediction.tier()).or_insert(0) += 1;
        }
        summary
    }

    pub fn tier_count(&self, tier: ConfidenceTier) -> usize {
        self.tiers.get(&tier).copied().unwrap_or(0)
    }
}
