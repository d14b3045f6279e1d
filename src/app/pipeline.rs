//! Shared "stream and collect" logic for both pipelines.
//!
//! The front-end passes a progress callback; this module drives the stream to
//! completion and hands back everything accumulated, in input order.

use crate::domain::{ModelVariant, Progress};
use crate::error::AppError;
use crate::io::ingest::Table;
use crate::keywords::{KeywordEngine, LabelScorer};
use crate::memo::{CompletionService, MemoExtractor};
use crate::stream::{MemoOutcome, TaggedRow, keyword_stream, memo_stream};

/// Run memo extraction over every row.
pub fn extract_table<C: CompletionService>(
    table: &Table,
    extractor: &MemoExtractor<C>,
    variant: ModelVariant,
    mut on_progress: impl FnMut(&Progress<MemoOutcome>),
) -> Result<Vec<MemoOutcome>, AppError> {
    let stream = memo_stream(table, extractor, variant)?;
    tracing::info!(rows = table.len(), variant = variant.display_name(), "Starting memo extraction");

    let mut outcomes = Vec::with_capacity(table.len());
    for progress in stream {
        on_progress(&progress);
        outcomes.push(progress.item);
    }
    tracing::info!(rows = outcomes.len(), "Memo extraction finished");
    Ok(outcomes)
}

/// Run keyword tagging over every row.
pub fn tag_table<S: LabelScorer>(
    table: &Table,
    engine: &KeywordEngine<S>,
    threshold: f32,
    mut on_progress: impl FnMut(&Progress<TaggedRow>),
) -> Result<Vec<TaggedRow>, AppError> {
    let stream = keyword_stream(table, engine, threshold)?;
    tracing::info!(rows = table.len(), threshold, "Starting keyword tagging");

    let mut tagged = Vec::with_capacity(table.len());
    for progress in stream {
        on_progress(&progress);
        tagged.push(progress.item);
    }
    tracing::info!(rows = tagged.len(), "Keyword tagging finished");
    Ok(tagged)
}
