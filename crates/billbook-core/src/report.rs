//! # Report Aggregation Engine
//!
//! Revenue, expenses, profit and margin over a reporting window.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Financial Report (period, today)                     │
//! │                                                                         │
//! │  invoices ──► in window (issue_date)? ──► paid? ──► revenue             │
//! │                          │                                              │
//! │                          └──────────────────────► invoice count         │
//! │                                                                         │
//! │  payables ──► in window (bill_date)?  ──► paid? ──► expenses            │
//! │                                                                         │
//! │  profit  = revenue − expenses                                           │
//! │  margin  = profit / revenue × 100      (0 when revenue is 0)            │
//! │  average = revenue / invoice count     (0 when count is 0)              │
//! │                                                                         │
//! │  monthly series: Jan..Dec of today's year, regardless of period         │
//! │  top clients:    paid revenue in window by client name, top 5           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Windows
//! | Period    | Contains `date` when                          |
//! |-----------|-----------------------------------------------|
//! | weekly    | `today − 7 days ≤ date ≤ today`               |
//! | monthly   | same calendar month and year as `today`       |
//! | quarterly | same calendar quarter and year as `today`     |
//! | yearly    | same calendar year as `today`                 |

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::dates::{month_label, quarter_of};
use crate::error::ValidationError;
use crate::money::Money;
use crate::payables::PayablesSummary;
use crate::snapshot::BillingSnapshot;
use crate::types::{normalize_name, InvoiceRecord, InvoiceStatus, PayableRecord, PayableStatus};
use crate::TOP_CLIENTS_LIMIT;

/// Length of the trailing weekly window, in days.
const WEEKLY_WINDOW_DAYS: i64 = 7;

// =============================================================================
// Report Period
// =============================================================================

/// Window a report covers, relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 4] = [
        ReportPeriod::Weekly,
        ReportPeriod::Monthly,
        ReportPeriod::Quarterly,
        ReportPeriod::Yearly,
    ];

    /// Lowercase name, as used in export filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Quarterly => "quarterly",
            ReportPeriod::Yearly => "yearly",
        }
    }

    /// Returns true when `date` falls inside this period's window around `today`.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::report::ReportPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
    /// let date = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
    /// assert!(ReportPeriod::Quarterly.contains(date, today));
    /// assert!(!ReportPeriod::Monthly.contains(date, today));
    /// ```
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            ReportPeriod::Weekly => today - Duration::days(WEEKLY_WINDOW_DAYS) <= date && date <= today,
            ReportPeriod::Monthly => date.year() == today.year() && date.month() == today.month(),
            ReportPeriod::Quarterly => date.year() == today.year() && quarter_of(date) == quarter_of(today),
            ReportPeriod::Yearly => date.year() == today.year(),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ReportPeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: ReportPeriod::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Building Blocks
// =============================================================================

/// Revenue collected from paid invoices issued on days matching `in_window`.
fn revenue_where(invoices: &[InvoiceRecord], in_window: impl Fn(NaiveDate) -> bool) -> Money {
    invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid && in_window(invoice.issue_date))
        .map(InvoiceRecord::total)
        .sum()
}

/// Expenses from paid bills dated on days matching `in_window`.
fn expenses_where(payables: &[PayableRecord], in_window: impl Fn(NaiveDate) -> bool) -> Money {
    payables
        .iter()
        .filter(|bill| bill.status == PayableStatus::Paid && in_window(bill.bill_date))
        .map(|bill| bill.bill_amount)
        .sum()
}

/// `profit / revenue × 100`, exactly `0` when there is no revenue.
pub fn profit_margin(revenue: Money, profit: Money) -> f64 {
    profit.percent_of(revenue)
}

// =============================================================================
// Monthly Series
// =============================================================================

/// Revenue, expenses and profit of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyFigures {
    /// 1-based month number.
    pub month: u32,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
}

impl MonthlyFigures {
    /// Three-letter month label (`"Jan"`).
    pub fn label(&self) -> &'static str {
        month_label(self.month)
    }
}

/// Twelve points, January through December of `year`.
pub fn monthly_series(invoices: &[InvoiceRecord], payables: &[PayableRecord], year: i32) -> Vec<MonthlyFigures> {
    (1..=12)
        .map(|month| {
            let in_month = |date: NaiveDate| date.year() == year && date.month() == month;
            let revenue = revenue_where(invoices, in_month);
            let expenses = expenses_where(payables, in_month);
            MonthlyFigures {
                month,
                revenue,
                expenses,
                profit: revenue - expenses,
            }
        })
        .collect()
}

// =============================================================================
// Top Clients
// =============================================================================

/// Paid revenue attributed to one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientRevenue {
    /// Display name as first seen in the window.
    pub client_name: String,
    pub revenue: Money,
    pub invoice_count: usize,
}

/// Highest-revenue clients among paid invoices in the window.
///
/// Names are matched trimmed and case-insensitively. Ties keep the order the
/// clients first appear in.
pub fn top_clients(
    invoices: &[InvoiceRecord],
    period: ReportPeriod,
    today: NaiveDate,
    limit: usize,
) -> Vec<ClientRevenue> {
    let mut ranking: Vec<(String, ClientRevenue)> = Vec::new();

    for invoice in invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid && period.contains(invoice.issue_date, today))
    {
        let key = normalize_name(&invoice.client_name);
        match ranking.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, entry)) => {
                entry.revenue += invoice.total();
                entry.invoice_count += 1;
            }
            None => ranking.push((
                key,
                ClientRevenue {
                    client_name: invoice.client_name.trim().to_string(),
                    revenue: invoice.total(),
                    invoice_count: 1,
                },
            )),
        }
    }

    // Stable sort keeps first-seen order among equal totals
    ranking.sort_by(|(_, a), (_, b)| b.revenue.cmp(&a.revenue));
    ranking.into_iter().take(limit).map(|(_, entry)| entry).collect()
}

// =============================================================================
// Receivables
// =============================================================================

/// Money clients still owe as of a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceivablesSummary {
    pub outstanding_count: usize,
    pub outstanding: Money,
    pub overdue_count: usize,
    pub overdue_amount: Money,
}

impl ReceivablesSummary {
    pub fn compute(invoices: &[InvoiceRecord], as_of: NaiveDate) -> Self {
        invoices
            .iter()
            .filter(|invoice| invoice.status.is_outstanding())
            .fold(ReceivablesSummary::default(), |mut summary, invoice| {
                let balance = invoice.balance_due();
                summary.outstanding_count += 1;
                summary.outstanding += balance;
                if invoice.effective_status(as_of) == InvoiceStatus::Overdue {
                    summary.overdue_count += 1;
                    summary.overdue_amount += balance;
                }
                summary
            })
    }
}

// =============================================================================
// Financial Report
// =============================================================================

/// Everything the reports view shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialReport {
    pub period: ReportPeriod,
    #[ts(as = "String")]
    pub generated_on: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
    /// Percent; `0` when revenue is `0`.
    pub profit_margin: f64,
    /// Invoices issued in the window, whatever their status.
    pub invoice_count: usize,
    pub paid_invoice_count: usize,
    pub average_invoice_value: Money,
    pub monthly: Vec<MonthlyFigures>,
    pub top_clients: Vec<ClientRevenue>,
    pub receivables: ReceivablesSummary,
    pub payables: PayablesSummary,
}

impl FinancialReport {
    /// Builds the report for `period` around `today` from a snapshot.
    pub fn build(snapshot: &BillingSnapshot, period: ReportPeriod, today: NaiveDate) -> Self {
        Self::from_records(&snapshot.invoices, &snapshot.payables, period, today)
    }

    pub fn from_records(
        invoices: &[InvoiceRecord],
        payables: &[PayableRecord],
        period: ReportPeriod,
        today: NaiveDate,
    ) -> Self {
        let in_window = |date: NaiveDate| period.contains(date, today);

        let revenue = revenue_where(invoices, in_window);
        let expenses = expenses_where(payables, in_window);
        let profit = revenue - expenses;

        let windowed: Vec<&InvoiceRecord> = invoices
            .iter()
            .filter(|invoice| in_window(invoice.issue_date))
            .collect();
        let invoice_count = windowed.len();
        let paid_invoice_count = windowed
            .iter()
            .filter(|invoice| invoice.status == InvoiceStatus::Paid)
            .count();

        let report = FinancialReport {
            period,
            generated_on: today,
            revenue,
            expenses,
            profit,
            profit_margin: profit_margin(revenue, profit),
            invoice_count,
            paid_invoice_count,
            average_invoice_value: revenue.average_over(invoice_count),
            monthly: monthly_series(invoices, payables, today.year()),
            top_clients: top_clients(invoices, period, today, TOP_CLIENTS_LIMIT),
            receivables: ReceivablesSummary::compute(invoices, today),
            payables: PayablesSummary::compute(payables, today),
        };

        debug!(
            period = %period,
            %today,
            revenue = %report.revenue,
            expenses = %report.expenses,
            invoices = report.invoice_count,
            "Financial report assembled"
        );
        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(client: &str, status: InvoiceStatus, issued: NaiveDate, amount_minor: i64) -> InvoiceRecord {
        InvoiceRecord {
            id: format!("inv-{}-{}", client, issued),
            invoice_number: String::new(),
            client_id: None,
            client_name: client.to_string(),
            items: vec![],
            status,
            issue_date: issued,
            due_date: issued + Duration::days(30),
            payment_date: None,
            advance_payment: Money::zero(),
            amount: Money::from_minor(amount_minor),
        }
    }

    fn bill(status: PayableStatus, billed: NaiveDate, amount_minor: i64) -> PayableRecord {
        PayableRecord {
            id: format!("bill-{}", billed),
            vendor_name: "Paper Mill".to_string(),
            bill_number: None,
            bill_date: billed,
            due_date: billed + Duration::days(15),
            bill_amount: Money::from_minor(amount_minor),
            amount_paid: if status == PayableStatus::Paid {
                Money::from_minor(amount_minor)
            } else {
                Money::zero()
            },
            status,
        }
    }

    #[test]
    fn test_period_windows() {
        let today = date(2026, 5, 20);
        assert!(ReportPeriod::Weekly.contains(date(2026, 5, 13), today));
        assert!(ReportPeriod::Weekly.contains(today, today));
        assert!(!ReportPeriod::Weekly.contains(date(2026, 5, 12), today));
        assert!(!ReportPeriod::Weekly.contains(date(2026, 5, 21), today));

        assert!(ReportPeriod::Monthly.contains(date(2026, 5, 31), today));
        assert!(!ReportPeriod::Monthly.contains(date(2025, 5, 20), today));

        assert!(ReportPeriod::Quarterly.contains(date(2026, 6, 30), today));
        assert!(!ReportPeriod::Quarterly.contains(date(2026, 3, 31), today));

        assert!(ReportPeriod::Yearly.contains(date(2026, 1, 1), today));
        assert!(!ReportPeriod::Yearly.contains(date(2025, 12, 31), today));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("Quarterly".parse::<ReportPeriod>().unwrap(), ReportPeriod::Quarterly);
        assert_eq!(" weekly ".parse::<ReportPeriod>().unwrap(), ReportPeriod::Weekly);
        assert!("daily".parse::<ReportPeriod>().is_err());
        assert_eq!(ReportPeriod::default().to_string(), "monthly");
    }

    #[test]
    fn test_revenue_expenses_and_margin() {
        let today = date(2026, 5, 20);
        let invoices = vec![
            invoice("Acme", InvoiceStatus::Paid, date(2026, 5, 2), 100000),
            invoice("Acme", InvoiceStatus::Pending, date(2026, 5, 3), 50000),
            invoice("Globex", InvoiceStatus::Paid, date(2026, 4, 30), 70000),
        ];
        let payables = vec![
            bill(PayableStatus::Paid, date(2026, 5, 5), 25000),
            bill(PayableStatus::Pending, date(2026, 5, 6), 10000),
        ];

        let report = FinancialReport::from_records(&invoices, &payables, ReportPeriod::Monthly, today);
        assert_eq!(report.revenue, Money::from_minor(100000));
        assert_eq!(report.expenses, Money::from_minor(25000));
        assert_eq!(report.profit, Money::from_minor(75000));
        assert!((report.profit_margin - 75.0).abs() < 1e-9);
        assert_eq!(report.invoice_count, 2);
        assert_eq!(report.paid_invoice_count, 1);
        assert_eq!(report.average_invoice_value, Money::from_minor(50000));
    }

    #[test]
    fn test_margin_zero_without_revenue() {
        let today = date(2026, 5, 20);
        let payables = vec![bill(PayableStatus::Paid, date(2026, 5, 5), 25000)];

        let report = FinancialReport::from_records(&[], &payables, ReportPeriod::Monthly, today);
        assert_eq!(report.revenue, Money::zero());
        assert_eq!(report.profit, Money::from_minor(-25000));
        assert_eq!(report.profit_margin, 0.0);
        assert_eq!(report.average_invoice_value, Money::zero());
    }

    #[test]
    fn test_monthly_series_covers_calendar_year() {
        let invoices = vec![
            invoice("Acme", InvoiceStatus::Paid, date(2026, 1, 10), 100000),
            invoice("Acme", InvoiceStatus::Paid, date(2026, 1, 25), 20000),
            invoice("Acme", InvoiceStatus::Paid, date(2025, 1, 10), 999999),
            invoice("Acme", InvoiceStatus::Cancelled, date(2026, 2, 10), 50000),
        ];
        let payables = vec![bill(PayableStatus::Paid, date(2026, 3, 1), 30000)];

        let series = monthly_series(&invoices, &payables, 2026);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].label(), "Jan");
        assert_eq!(series[0].revenue, Money::from_minor(120000));
        assert_eq!(series[1].revenue, Money::zero());
        assert_eq!(series[2].profit, Money::from_minor(-30000));
        assert_eq!(series[11].label(), "Dec");
    }

    #[test]
    fn test_monthly_series_ignores_selected_period() {
        let today = date(2026, 5, 20);
        let invoices = vec![invoice("Acme", InvoiceStatus::Paid, date(2026, 2, 10), 100000)];

        let weekly = FinancialReport::from_records(&invoices, &[], ReportPeriod::Weekly, today);
        assert_eq!(weekly.revenue, Money::zero());
        assert_eq!(weekly.monthly[1].revenue, Money::from_minor(100000));
    }

    #[test]
    fn test_top_clients_grouped_and_limited() {
        let today = date(2026, 5, 20);
        let mut invoices = vec![
            invoice("Acme", InvoiceStatus::Paid, date(2026, 5, 1), 10000),
            invoice(" acme ", InvoiceStatus::Paid, date(2026, 5, 2), 30000),
            invoice("Globex", InvoiceStatus::Paid, date(2026, 5, 3), 35000),
            invoice("Initech", InvoiceStatus::Pending, date(2026, 5, 4), 900000),
        ];
        for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
            invoices.push(invoice(name, InvoiceStatus::Paid, date(2026, 5, 5), 1000 * (i as i64 + 1)));
        }

        let ranking = top_clients(&invoices, ReportPeriod::Monthly, today, TOP_CLIENTS_LIMIT);
        assert_eq!(ranking.len(), 5);
        assert_eq!(ranking[0].client_name, "Acme");
        assert_eq!(ranking[0].revenue, Money::from_minor(40000));
        assert_eq!(ranking[0].invoice_count, 2);
        assert_eq!(ranking[1].client_name, "Globex");
        assert!(ranking.iter().all(|entry| entry.client_name != "Initech"));
        assert_eq!(ranking[4].client_name, "B");
    }

    #[test]
    fn test_receivables_summary() {
        let today = date(2026, 5, 20);
        let mut partial = invoice("Acme", InvoiceStatus::Partial, date(2026, 3, 1), 100000);
        partial.advance_payment = Money::from_minor(40000);
        let invoices = vec![
            partial,
            invoice("Acme", InvoiceStatus::Pending, date(2026, 5, 1), 50000),
            invoice("Acme", InvoiceStatus::Paid, date(2026, 5, 1), 70000),
            invoice("Acme", InvoiceStatus::Draft, date(2026, 5, 1), 80000),
        ];

        let summary = ReceivablesSummary::compute(&invoices, today);
        assert_eq!(summary.outstanding_count, 2);
        assert_eq!(summary.outstanding, Money::from_minor(110000));
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.overdue_amount, Money::from_minor(60000));
    }
}
