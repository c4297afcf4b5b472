//! # CSV Export
//!
//! The monthly series as a spreadsheet-friendly CSV file.
//!
//! ## Format
//! ```text
//! Month,Revenue,Expenses,Profit
//! Jan,1200.00,300.00,900.00
//! Feb,0.00,450.50,-450.50
//! ...
//! Dec,0.00,0.00,0.00
//! ```
//!
//! - one row per month, three-letter English month names
//! - exactly two decimals, no thousands separators, `-` for negatives
//! - `\n` line endings, including after the last row
//!
//! Files are named `financial-report-<period>-<YYYY-MM-DD>.csv`.

use std::io;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::CoreResult;
use crate::report::{MonthlyFigures, ReportPeriod};

/// Column headers of the export.
pub const CSV_HEADER: [&str; 4] = ["Month", "Revenue", "Expenses", "Profit"];

/// Writes the series as CSV to any writer.
pub fn write_csv<W: io::Write>(writer: W, series: &[MonthlyFigures]) -> CoreResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for figures in series {
        csv_writer.write_record([
            figures.label().to_string(),
            figures.revenue.to_decimal_string(),
            figures.expenses.to_decimal_string(),
            figures.profit.to_decimal_string(),
        ])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;

    debug!(rows = series.len(), "CSV export written");
    Ok(())
}

/// Renders the series as a CSV string.
///
/// ## Example
/// ```rust
/// use billbook_core::export::render_csv;
/// use billbook_core::report::MonthlyFigures;
/// use billbook_core::Money;
///
/// let series = [MonthlyFigures {
///     month: 2,
///     revenue: Money::from_minor(0),
///     expenses: Money::from_minor(45050),
///     profit: Money::from_minor(-45050),
/// }];
/// let csv = render_csv(&series).unwrap();
/// assert_eq!(csv, "Month,Revenue,Expenses,Profit\nFeb,0.00,450.50,-450.50\n");
/// ```
pub fn render_csv(series: &[MonthlyFigures]) -> CoreResult<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, series)?;
    String::from_utf8(buffer)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)).into())
}

/// `financial-report-<period>-<YYYY-MM-DD>.csv`.
pub fn export_filename(period: ReportPeriod, date: NaiveDate) -> String {
    format!("financial-report-{}-{}.csv", period.as_str(), date.format("%Y-%m-%d"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::report::monthly_series;

    #[test]
    fn test_full_year_layout() {
        let series = monthly_series(&[], &[], 2026);
        let csv = render_csv(&series).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();

        // header + 12 rows + empty string after the trailing newline
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[0], "Month,Revenue,Expenses,Profit");
        assert_eq!(lines[1], "Jan,0.00,0.00,0.00");
        assert_eq!(lines[12], "Dec,0.00,0.00,0.00");
        assert_eq!(lines[13], "");
        assert!(!csv.contains('\r'));
    }

    #[test]
    fn test_values_use_two_decimals_without_separators() {
        let series = [MonthlyFigures {
            month: 7,
            revenue: Money::from_minor(123456789),
            expenses: Money::from_minor(5),
            profit: Money::from_minor(123456784),
        }];
        let csv = render_csv(&series).unwrap();
        assert!(csv.ends_with("Jul,1234567.89,0.05,1234567.84\n"));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            export_filename(ReportPeriod::Quarterly, date),
            "financial-report-quarterly-2026-03-09.csv"
        );
    }
}
