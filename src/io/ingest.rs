//! CSV ingest with column contracts.
//!
//! Both pipelines read a spreadsheet exported to CSV:
//!
//! - memo extraction: header on the first line, required columns `MEMO_COLUMNS`
//! - keyword tagging: header on a fixed line with a fixed number of lines
//!   skipped beneath it (`KeywordLayout`), required columns `KEYWORD_COLUMNS`
//!
//! Column names are matched exactly after trimming whitespace and a leading
//! BOM. Extra columns are kept and ignored. Missing required columns are
//! reported before any row is processed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, EXIT_INPUT};

/// Required columns of the memo extraction input.
pub const MEMO_COLUMNS: [&str; 5] = ["UID", "State", "Bid Document Url", "Bid Url", "Memo"];

/// Required columns of the keyword tagging input.
pub const KEYWORD_COLUMNS: [&str; 3] = ["Bid Title", "Data Miner Keywords", "QC Keywords"];

/// Positional layout of the keyword tagging sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordLayout {
    /// Zero-based line holding the column names.
    pub header_row: usize,
    /// Lines directly beneath the header that are not data.
    pub skip_rows: usize,
}

impl Default for KeywordLayout {
    fn default() -> Self {
        Self {
            header_row: 2,
            skip_rows: 2,
        }
    }
}

/// Header plus string cells. Rows may be shorter than the header; missing
/// cells read as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.iter().map(|h| normalize_header_name(h)).collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every required column, failing on the first one missing.
    pub fn require_columns<const N: usize>(&self, names: &[&str; N]) -> Result<[usize; N], AppError> {
        let mut out = [0usize; N];
        for (slot, name) in out.iter_mut().zip(names.iter()) {
            *slot = self
                .column_index(name)
                .ok_or_else(|| AppError::missing_column(name))?;
        }
        Ok(out)
    }
}

/// Cell value, or `""` when the row is short.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Read a CSV whose first line is the header.
pub fn read_table(path: &Path) -> Result<Table, AppError> {
    read_table_with_layout(path, 0, 0)
}

/// Read the keyword tagging sheet using its positional layout.
pub fn read_keyword_table(path: &Path, layout: KeywordLayout) -> Result<Table, AppError> {
    read_table_with_layout(path, layout.header_row, layout.skip_rows)
}

fn read_table_with_layout(path: &Path, header_row: usize, skip_rows: usize) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_table(file, header_row, skip_rows)
}

/// Parse CSV text by sheet row: rows before `header_row` and `skip_rows` rows
/// after the header are dropped.
///
/// Row numbers count blank lines too, the way a spreadsheet does, and a quoted
/// cell spanning several lines is one row. Cells are kept verbatim; only the
/// header names are normalized.
pub fn parse_table<R: Read>(mut source: R, header_row: usize, skip_rows: usize) -> Result<Table, AppError> {
    let mut text = String::new();
    source
        .read_to_string(&mut text)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV: {e}")))?;
    let bytes = text.strip_prefix('\u{feff}').unwrap_or(text.as_str()).as_bytes();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut header_at: Option<usize> = None;
    let mut headers = Vec::new();
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut consumed = 0usize;
    let mut sheet_row = 0usize;

    while reader
        .read_record(&mut record)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("CSV parse error after sheet row {sheet_row}: {e}")))?
    {
        // The reader swallows empty lines ahead of a record; count them from the consumed bytes.
        let end = usize::try_from(reader.position().byte()).map_or(bytes.len(), |b| b.min(bytes.len()));
        let after_cr = consumed.checked_sub(1).and_then(|i| bytes.get(i)) == Some(&b'\r');
        sheet_row += leading_blank_lines(bytes.get(consumed..end).unwrap_or_default(), after_cr);
        consumed = end;

        let row = sheet_row;
        sheet_row += 1;
        if row < header_row {
            continue;
        }

        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        match header_at {
            None => {
                header_at = Some(row);
                headers = cells;
            }
            Some(at) if row <= at + skip_rows => {}
            Some(_) => rows.push(cells),
        }
    }

    if header_at.is_none() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("CSV has no header row (expected column names on line {}).", header_row + 1),
        ));
    }

    Ok(Table::new(headers, rows))
}

/// Empty lines at the start of `span`. A `\n` directly after the previous
/// record's `\r` finishes that terminator and is not a line of its own.
fn leading_blank_lines(span: &[u8], after_cr: bool) -> usize {
    let mut i = usize::from(after_cr && span.first() == Some(&b'\n'));
    let mut count = 0;
    while let Some(&b) = span.get(i) {
        match b {
            b'\n' => i += 1,
            b'\r' if span.get(i + 1) == Some(&b'\n') => i += 2,
            b'\r' => i += 1,
            _ => break,
        }
        count += 1;
    }
    count
}

fn normalize_header_name(name: &str) -> String {
    // Excel-exported CSVs often carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memo_sheet_reads_header_from_first_line() {
        let csv = "\u{feff}UID,State,Bid Document Url,Bid Url,Memo,Extra\n\
                   1,TX,https://d/1,https://b/1,\"Sealed bids, due soon\",x\n\
                   2,CA,https://d/2,https://b/2,,y\n";
        let table = parse_table(csv.as_bytes(), 0, 0).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("UID"), Some(0));
        let [uid, _, _, _, memo] = table.require_columns(&MEMO_COLUMNS).unwrap();
        assert_eq!(cell(&table.rows()[0], uid), "1");
        assert_eq!(cell(&table.rows()[0], memo), "Sealed bids, due soon");
        assert_eq!(cell(&table.rows()[1], memo), "");
    }

    #[test]
    fn keyword_sheet_skips_preamble_and_sub_header_rows() {
        let csv = "Report,,\n\
                   Generated,,\n\
                   Bid Title,Data Miner Keywords,QC Keywords\n\
                   (notes),,\n\
                   (units),,\n\
                   Classroom chairs,furniture,furniture\n\
                   Roof repair,,\n";
        let table = parse_table(csv.as_bytes(), 2, 2).unwrap();

        assert_eq!(table.headers(), &["Bid Title", "Data Miner Keywords", "QC Keywords"]);
        assert_eq!(table.len(), 2);
        assert_eq!(cell(&table.rows()[0], 0), "Classroom chairs");
        assert_eq!(cell(&table.rows()[1], 0), "Roof repair");
    }

    #[test]
    fn blank_preamble_lines_count_as_sheet_rows() {
        let csv = "Report\n\nBid Title,Data Miner Keywords,QC Keywords\n(notes),,\n(units),,\nChairs,,\n";
        let table = parse_table(csv.as_bytes(), 2, 2).unwrap();

        assert_eq!(table.headers(), &["Bid Title", "Data Miner Keywords", "QC Keywords"]);
        assert_eq!(table.len(), 1);
        assert_eq!(cell(&table.rows()[0], 0), "Chairs");
    }

    #[test]
    fn multi_line_cell_is_one_sheet_row() {
        let csv = "\"Bid report\nspanning lines\",,\nGenerated,,\nBid Title,Data Miner Keywords,QC Keywords\nskip,,\nskip,,\nDesks,,\n";
        let table = parse_table(csv.as_bytes(), 2, 2).unwrap();

        assert_eq!(table.headers(), &["Bid Title", "Data Miner Keywords", "QC Keywords"]);
        assert_eq!(table.len(), 1);
        assert_eq!(cell(&table.rows()[0], 0), "Desks");
    }

    #[test]
    fn crlf_terminators_are_not_blank_rows() {
        let csv = "Report\r\n\r\nBid Title,Data Miner Keywords,QC Keywords\r\nskip,,\r\nskip,,\r\nDesks,,\r\n";
        let table = parse_table(csv.as_bytes(), 2, 2).unwrap();

        assert_eq!(table.headers(), &["Bid Title", "Data Miner Keywords", "QC Keywords"]);
        assert_eq!(table.len(), 1);
        assert_eq!(cell(&table.rows()[0], 0), "Desks");
    }

    #[test]
    fn blank_line_counting() {
        assert_eq!(leading_blank_lines(b"\n\nabc", false), 2);
        assert_eq!(leading_blank_lines(b"\nabc", true), 0);
        assert_eq!(leading_blank_lines(b"\n\r\nabc", true), 1);
        assert_eq!(leading_blank_lines(b"abc\n", false), 0);
    }

    #[test]
    fn data_cells_are_kept_verbatim() {
        let csv = " UID ,State,Bid Document Url,Bid Url,Memo\n 7 ,TX,d,b,\"  Line one\nLine two\n\"\n";
        let table = parse_table(csv.as_bytes(), 0, 0).unwrap();

        let [uid, _, _, _, memo] = table.require_columns(&MEMO_COLUMNS).unwrap();
        assert_eq!(cell(&table.rows()[0], uid), " 7 ");
        assert_eq!(cell(&table.rows()[0], memo), "  Line one\nLine two\n");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let table = parse_table("UID,State,Bid Url,Memo\n1,TX,u,m\n".as_bytes(), 0, 0).unwrap();
        let err = table.require_columns(&MEMO_COLUMNS).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.message().contains("Bid Document Url"));
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let table = parse_table("bid title,Data Miner Keywords,QC Keywords\n".as_bytes(), 0, 0).unwrap();
        assert!(table.require_columns(&KEYWORD_COLUMNS).is_err());
    }

    #[test]
    fn short_rows_read_as_blank_cells() {
        let table = parse_table("a,b,c\n1\n".as_bytes(), 0, 0).unwrap();
        assert_eq!(cell(&table.rows()[0], 2), "");
    }

    #[test]
    fn empty_file_has_no_header() {
        let err = parse_table("".as_bytes(), 0, 0).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn reads_keyword_table_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "x\ny\nBid Title,Data Miner Keywords,QC Keywords\nskip\nskip\nDesks,,\n"
        )
        .unwrap();

        let table = read_keyword_table(file.path(), KeywordLayout::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.require_columns(&KEYWORD_COLUMNS).is_ok());
    }
}
