//! Finish-date parsing and formatting
//!
//! Exactly two input formats are accepted: strict ISO `YYYY-MM-DD`, then
//! `M/D/YYYY` as a fallback. The fallback exists for compatibility with
//! previously exported CSV files and must not be extended. Output is always
//! ISO, regardless of how the date was entered.

use chrono::NaiveDate;

/// Parse a finish date, trying ISO first and the US slash format second.
///
/// Returns `None` when both formats fail; callers record the failure as a
/// validation error on the `finishDate` field.
pub fn parse_finish_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

/// Serialize a finish date in the ISO form used by exports and edit forms.
pub fn format_finish_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
