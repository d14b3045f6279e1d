//! Write pipeline results.
//!
//! - extraction output: fixed 14-column CSV (`EXTRACTION_COLUMNS`)
//! - keyword output: the input sheet with `AI Keywords` inserted after
//!   `Data Miner Keywords`
//! - tier report: per-row confidence tier and fill colour as JSON, standing in
//!   for spreadsheet cell colouring

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ConfidenceTier, EXTRACTION_COLUMNS, ExtractionRow};
use crate::error::{AppError, EXIT_OUTPUT};
use crate::io::ingest::{Table, cell};
use crate::stream::TaggedRow;

pub const AI_KEYWORDS_COLUMN: &str = "AI Keywords";

/// Column the AI keywords are inserted after.
const ANCHOR_COLUMN: &str = "Data Miner Keywords";

/// Write the extraction output CSV.
pub fn write_extraction_csv(path: &Path, rows: &[ExtractionRow]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record(EXTRACTION_COLUMNS)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write CSV header: {e}")))?;
    for row in rows {
        writer
            .write_record(row.to_record())
            .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write CSV row for UID {}: {e}", row.uid)))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to flush '{}': {e}", path.display())))
}

/// Build the keyword output sheet in memory: headers and rows with `AI Keywords` inserted.
///
/// The sheet is rectangular: short rows are padded, and cells past the last
/// header are kept under blank header names.
pub fn keyword_output(table: &Table, tagged: &[TaggedRow]) -> Result<(Vec<String>, Vec<Vec<String>>), AppError> {
    let anchor = table
        .column_index(ANCHOR_COLUMN)
        .ok_or_else(|| AppError::missing_column(ANCHOR_COLUMN))?;
    let insert_at = anchor + 1;
    let width = table
        .rows()
        .iter()
        .map(Vec::len)
        .fold(table.headers().len(), usize::max);

    let mut headers = table.headers().to_vec();
    headers.resize(width, String::new());
    headers.insert(insert_at, AI_KEYWORDS_COLUMN.to_string());

    let rows = table
        .rows()
        .iter()
        .zip(tagged)
        .map(|(row, tag)| {
            let mut out: Vec<String> = (0..width).map(|i| cell(row, i).to_string()).collect();
            out.insert(insert_at, tag.prediction.joined());
            out
        })
        .collect();

    Ok((headers, rows))
}

/// Write the keyword output CSV.
pub fn write_keyword_csv(path: &Path, table: &Table, tagged: &[TaggedRow]) -> Result<(), AppError> {
    let (headers, rows) = keyword_output(table, tagged)?;
    let mut writer = create_writer(path)?;
    writer
        .write_record(&headers)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write CSV header: {e}")))?;
    for row in &rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to flush '{}': {e}", path.display())))
}

#[derive(Debug, Serialize)]
pub struct TierEntry<'a> {
    /// 1-based data row.
    pub row: usize,
    pub keywords: &'a [String],
    pub fallback_used: bool,
    pub max_probability: f32,
    pub tier: ConfidenceTier,
    pub fill: &'static str,
}

pub fn tier_entries(tagged: &[TaggedRow]) -> Vec<TierEntry<'_>> {
    tagged
        .iter()
        .enumerate()
        .map(|(i, tag)| {
            let tier = tag.prediction.tier();
            TierEntry {
                row: i + 1,
                keywords: &tag.prediction.keywords,
                fallback_used: tag.prediction.fallback_used,
                max_probability: tag.prediction.max_probability,
                tier,
                fill: tier.fill_hex(),
            }
        })
        .collect()
}

/// Write the per-row confidence tier report.
pub fn write_tier_report(path: &Path, tagged: &[TaggedRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to create tier report '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &tier_entries(tagged))
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write tier report: {e}")))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to create output CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}
