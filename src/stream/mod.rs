//! Row-by-row processing with progress.
//!
//! A `RowStream` walks a `Table` once, in order, applying a per-row transform
//! and yielding one `Progress` per row: 1-based index, constant total, and the
//! row's result. The consumer owns accumulation; the stream keeps nothing.
//!
//! Constructors validate the column contract up front, so a missing column
//! fails before any row is touched. After that nothing aborts the stream:
//! blank cells and per-row failures turn into blank results.

use std::iter::FusedIterator;

use crate::domain::{ExtractionRow, MemoRow, ModelVariant, PredictionResult, Progress};
use crate::error::AppError;
use crate::io::ingest::{KEYWORD_COLUMNS, MEMO_COLUMNS, Table, cell};
use crate::keywords::{KeywordEngine, LabelScorer};
use crate::memo::{CompletionService, ExtractionFailure, MemoExtractor};

/// Lazy, finite, single-pass sequence of per-row results.
pub struct RowStream<'a, F> {
    rows: std::slice::Iter<'a, Vec<String>>,
    index: usize,
    total: usize,
    transform: F,
}

impl<'a, F> RowStream<'a, F> {
    pub fn new(table: &'a Table, transform: F) -> Self {
        Self {
            rows: table.rows().iter(),
            index: 0,
            total: table.len(),
            transform,
        }
    }
}

impl<'a, T, F> Iterator for RowStream<'a, F>
where
    F: FnMut(&'a [String]) -> T,
{
    type Item = Progress<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.index += 1;
        Some(Progress {
            index: self.index,
            total: self.total,
            item: (self.transform)(row.as_slice()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<'a, T, F> ExactSizeIterator for RowStream<'a, F> where F: FnMut(&'a [String]) -> T {}

impl<'a, T, F> FusedIterator for RowStream<'a, F> where F: FnMut(&'a [String]) -> T {}

/// How a memo row came out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoStatus {
    Extracted,
    /// Memo cell was empty; no completion call was made.
    Blank,
    Failed(ExtractionFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoOutcome {
    pub row: ExtractionRow,
    pub status: MemoStatus,
}

/// Stream memo extraction over a table with `MEMO_COLUMNS`.
pub fn memo_stream<'a, C: CompletionService>(
    table: &'a Table,
    extractor: &'a MemoExtractor<C>,
    variant: ModelVariant,
) -> Result<RowStream<'a, impl FnMut(&'a [String]) -> MemoOutcome>, AppError> {
    let [uid, state, doc_url, bid_url, memo] = table.require_columns(&MEMO_COLUMNS)?;

    Ok(RowStream::new(table, move |row: &'a [String]| {
        let input = MemoRow {
            uid: cell(row, uid).to_string(),
            state: cell(row, state).to_string(),
            bid_document_url: cell(row, doc_url).to_string(),
            bid_url: cell(row, bid_url).to_string(),
            memo: cell(row, memo).to_string(),
        };
        extract_row(&input, extractor, variant)
    }))
}

fn extract_row<C: CompletionService>(input: &MemoRow, extractor: &MemoExtractor<C>, variant: ModelVariant) -> MemoOutcome {
    if input.memo.trim().is_empty() {
        return MemoOutcome {
            row: ExtractionRow::blank(input),
            status: MemoStatus::Blank,
        };
    }

    match extractor.extract(&input.uid, &input.memo, variant) {
        Ok(fields) => MemoOutcome {
            row: ExtractionRow::from_fields(input, &fields),
            status: MemoStatus::Extracted,
        },
        Err(failure) => {
            tracing::warn!(uid = %failure.uid, cause = %failure.cause, "Memo extraction failed; emitting blank row");
            MemoOutcome {
                row: ExtractionRow::blank(input),
                status: MemoStatus::Failed(failure),
            }
        }
    }
}

/// Keyword result for one row. A classifier error leaves an empty prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub prediction: PredictionResult,
    pub error: Option<String>,
}

/// Stream keyword tagging over a table with `KEYWORD_COLUMNS`.
pub fn keyword_stream<'a, S: LabelScorer>(
    table: &'a Table,
    engine: &'a KeywordEngine<S>,
    threshold: f32,
) -> Result<RowStream<'a, impl FnMut(&'a [String]) -> TaggedRow>, AppError> {
    let [title, _, _] = table.require_columns(&KEYWORD_COLUMNS)?;

    Ok(RowStream::new(table, move |row: &'a [String]| {
        match engine.infer(cell(row, title), threshold) {
            Ok(prediction) => TaggedRow {
                prediction,
                error: None,
            },
            Err(e) => {
                tracing::warn!(title = cell(row, title), error = %e, "Keyword inference failed; leaving row untagged");
                TaggedRow {
                    prediction: PredictionResult::empty(),
                    error: Some(e.to_string()),
                }
            }
        }
    }))
}
