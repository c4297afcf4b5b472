//! # Calendar Helpers
//!
//! Lenient date parsing for records coming out of forms and spreadsheets,
//! plus the month/quarter arithmetic shared by scoring and reporting.
//!
//! ## Accepted Formats
//! ```text
//! 2026-03-31                    ISO date (preferred)
//! 2026-03-31T10:15:00+05:30     RFC 3339 timestamp (date part kept)
//! 2026-03-31 10:15:00           naive timestamp
//! 31/03/2026  31-03-2026        day first
//! 03/31/2026                    month first, only when day first cannot parse
//! 2026/03/31
//! 31 Mar 2026  Mar 31, 2026     display formats
//! ```

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Three-letter English month labels, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d %b %Y", "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// =============================================================================
// Parsing
// =============================================================================

/// Parses a calendar date, trying each accepted format in turn.
///
/// ## Example
/// ```rust
/// use billbook_core::dates::parse_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2026, 3, 31);
/// assert_eq!(parse_date("2026-03-31"), expected);
/// assert_eq!(parse_date("31/03/2026"), expected);
/// assert_eq!(parse_date("Mar 31, 2026"), expected);
/// assert_eq!(parse_date("soon"), None);
/// ```
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(input, format) {
            return Some(timestamp.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}

/// Serde helper for required date fields.
///
/// Unrecognized input fails deserialization of the record.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized date: '{}'", raw)))
}

/// Serde helper for optional date fields.
///
/// Unrecognized input is treated as absent rather than failing the record.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let parsed = parse_date(&raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            warn!(value = %raw, "Unrecognized optional date, treating as absent");
        }
        parsed
    }))
}

// =============================================================================
// Calendar Arithmetic
// =============================================================================

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Last day of the month `months` calendar months before the one containing `date`.
pub fn end_of_month_before(date: NaiveDate, months: u32) -> NaiveDate {
    start_of_month(date)
        .checked_sub_months(Months::new(months))
        .map(end_of_month)
        .unwrap_or(date)
}

/// Calendar quarter (1-4) of `date`.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month0() / 3) + 1
}

/// Whole days from `earlier` to `later` (negative when `later` is earlier).
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Label for a 1-based month number (`1` → `"Jan"`).
pub fn month_label(month: u32) -> &'static str {
    let index = (month.clamp(1, 12) - 1) as usize;
    MONTH_ABBREVIATIONS[index]
}

// =============================================================================
// Unit Tests
// =============================================================================
