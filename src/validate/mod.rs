//! Field normalization for model-extracted values.
//!
//! Nothing here fails. Values outside an allow-list are replaced by a default,
//! and dates that cannot be parsed are passed through untouched, so a sloppy
//! completion degrades a cell instead of losing a row.

use chrono::NaiveDate;

/// Date format the completion model is asked to emit.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format written to the output table.
pub const OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Literal the model sometimes emits instead of a JSON null.
const ABSENT_MARKER: &str = "null";

/// Return the allow-list entry equal to `value`, or `default`.
///
/// Matching is exact: `"rfp"` is not `"RFP"`.
pub fn validate_enum<'a>(value: &str, allowlist: &[&'a str], default: &'a str) -> &'a str {
    allowlist
        .iter()
        .copied()
        .find(|allowed| *allowed == value)
        .unwrap_or(default)
}

/// Reformat a date string from `from_format` to `to_format`.
///
/// Empty input stays empty. Anything that does not parse is returned as-is.
pub fn reformat_date(value: &str, from_format: &str, to_format: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(trimmed, from_format) {
        Ok(date) => date.format(to_format).to_string(),
        Err(_) => value.to_string(),
    }
}

/// Normalize an optional `YYYY-MM-DD` date from a completion into `DD/MM/YYYY`.
///
/// `None`, `""`, and the `"null"` marker all become `""`.
pub fn normalize_memo_date(value: Option<&str>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.trim().is_empty() || v.trim().eq_ignore_ascii_case(ABSENT_MARKER) => String::new(),
        Some(v) => reformat_date(v, INPUT_DATE_FORMAT, OUTPUT_DATE_FORMAT),
    }
}
