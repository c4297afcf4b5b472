//! # Commands
//!
//! Each command reads the snapshot, calls into `billbook-core`, and renders
//! text (or JSON) for stdout. Rendering returns a `String` so tests can check
//! output without capturing the terminal.
//!
//! ```text
//! report    ──► FinancialReport::build ──► table / CSV export
//! score     ──► health_score / health_trend
//! clients   ──► client_summary + health_score per client
//! totals    ──► DocumentTotals for one invoice or quotation
//! payables  ──► PayablesSummary + overdue bills
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use billbook_core::export::{export_filename, write_csv};
use billbook_core::health::ClientSummary;
use billbook_core::payables::{overdue_payables, PayablesSummary};
use billbook_core::{BillingSnapshot, FinancialReport, ReportPeriod};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BillbookConfig;
use crate::error::{CliError, CliResult};

// =============================================================================
// Snapshot Loading
// =============================================================================

/// Reads and parses the snapshot JSON file.
pub fn load_snapshot(path: &Path) -> CliResult<BillingSnapshot> {
    if !path.exists() {
        return Err(CliError::SnapshotNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    let snapshot = BillingSnapshot::from_json(&contents)?;
    info!(?path, invoices = snapshot.invoices.len(), "Snapshot loaded");
    Ok(snapshot)
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// =============================================================================
// report
// =============================================================================

/// Renders the financial report for `period`.
pub fn report(
    config: &BillbookConfig,
    snapshot: &BillingSnapshot,
    period: ReportPeriod,
    today: NaiveDate,
    json: bool,
) -> CliResult<String> {
    let report = FinancialReport::build(snapshot, period, today);
    if json {
        return to_json(&report);
    }

    let money = |amount| config.money(amount);
    let mut out = String::new();
    writeln!(out, "{} - {} report ({})", config.business.name, period, today)?;
    writeln!(out)?;
    writeln!(out, "Revenue           {:>14}", money(report.revenue))?;
    writeln!(out, "Expenses          {:>14}", money(report.expenses))?;
    writeln!(out, "Profit            {:>14}", money(report.profit))?;
    writeln!(out, "Profit margin     {:>13.1}%", report.profit_margin)?;
    writeln!(
        out,
        "Invoices          {:>14}   ({} paid)",
        report.invoice_count, report.paid_invoice_count
    )?;
    writeln!(out, "Average invoice   {:>14}", money(report.average_invoice_value))?;
    writeln!(
        out,
        "Receivables       {:>14}   ({} overdue, {})",
        money(report.receivables.outstanding),
        report.receivables.overdue_count,
        money(report.receivables.overdue_amount)
    )?;
    writeln!(
        out,
        "Payables due      {:>14}   ({} overdue)",
        money(report.payables.total_due),
        report.payables.overdue_count
    )?;

    if !report.top_clients.is_empty() {
        writeln!(out)?;
        writeln!(out, "Top clients")?;
        for (rank, client) in report.top_clients.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<28} {:>14}  ({} invoices)",
                rank + 1,
                client.client_name,
                money(client.revenue),
                client.invoice_count
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Month        Revenue       Expenses         Profit")?;
    for month in &report.monthly {
        writeln!(
            out,
            "{:<5} {:>14} {:>14} {:>14}",
            month.label(),
            money(month.revenue),
            money(month.expenses),
            money(month.profit)
        )?;
    }

    Ok(out)
}

/// Writes the monthly series as CSV into `output_dir`, returning the file path.
pub fn export_report(
    snapshot: &BillingSnapshot,
    period: ReportPeriod,
    today: NaiveDate,
    output_dir: &Path,
) -> CliResult<PathBuf> {
    let report = FinancialReport::build(snapshot, period, today);

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(export_filename(period, today));
    let file = File::create(&path)?;
    write_csv(BufWriter::new(file), &report.monthly)?;

    info!(?path, "Report exported");
    Ok(path)
}

// =============================================================================
// score
// =============================================================================

/// Renders one client's health score, optionally with its six-month trend.
pub fn score(
    snapshot: &BillingSnapshot,
    client: &str,
    as_of: NaiveDate,
    trend: bool,
    json: bool,
) -> CliResult<String> {
    let client = snapshot.find_client(client)?;

    if trend {
        let points = snapshot.health_trend(client, as_of);
        if json {
            return to_json(&points);
        }
        let mut out = String::new();
        writeln!(out, "{} - health trend", client.name)?;
        for point in points {
            writeln!(
                out,
                "  {} {}  {:>4}  {}",
                point.label,
                point.as_of,
                point.score,
                point.score.rating()
            )?;
        }
        return Ok(out);
    }

    let score = snapshot.health_score(client, as_of);
    if json {
        return to_json(&score);
    }
    Ok(format!(
        "{}: {}/10 ({}) as of {}\n",
        client.name,
        score,
        score.rating(),
        as_of
    ))
}

// =============================================================================
// clients
// =============================================================================

#[derive(Debug, Serialize)]
struct ClientRow {
    #[serde(flatten)]
    summary: ClientSummary,
    score: f64,
}

/// Lists every client with recomputed totals and current score.
pub fn clients(
    config: &BillbookConfig,
    snapshot: &BillingSnapshot,
    as_of: NaiveDate,
    json: bool,
) -> CliResult<String> {
    let rows: Vec<ClientRow> = snapshot
        .clients
        .iter()
        .zip(snapshot.client_summaries())
        .map(|(client, summary)| ClientRow {
            summary,
            score: snapshot.health_score(client, as_of).value(),
        })
        .collect();
    debug!(clients = rows.len(), "Client list computed");

    if json {
        return to_json(&rows);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<28} {:>8} {:>14} {:>14} {:>6}",
        "Client", "Invoices", "Billed", "Outstanding", "Score"
    )?;
    for row in &rows {
        writeln!(
            out,
            "{:<28} {:>8} {:>14} {:>14} {:>6}",
            row.summary.client_name,
            row.summary.total_invoices,
            config.money(row.summary.total_amount),
            config.money(row.summary.outstanding),
            row.score
        )?;
    }
    Ok(out)
}

// =============================================================================
// totals
// =============================================================================

/// Which document `totals` recomputes.
#[derive(Debug, Clone)]
pub enum DocumentRef {
    Invoice(String),
    Quotation(String),
}

/// Recomputes a document's totals from its line items, or reports the saved
/// total for a record that has none.
pub fn totals(
    config: &BillbookConfig,
    snapshot: &BillingSnapshot,
    document: &DocumentRef,
    json: bool,
) -> CliResult<String> {
    let (title, totals, balance) = match document {
        DocumentRef::Invoice(id) => {
            let invoice = snapshot.invoice(id)?;
            let totals = invoice.totals();
            let title = format!("Invoice {} ({})", invoice.invoice_number, invoice.client_name);
            (title, totals, Some((invoice.advance_payment, invoice.balance_due())))
        }
        DocumentRef::Quotation(id) => {
            let quotation = snapshot.quotation(id)?;
            let totals = quotation.totals();
            let title = format!("Quotation {} ({})", quotation.quotation_number, quotation.client_name);
            (title, totals, None)
        }
    };

    if json {
        return to_json(&totals);
    }

    let mut out = String::new();
    writeln!(out, "{}", title)?;
    if totals.item_count == 0 {
        writeln!(out, "  no line items, saved total {}", config.money(totals.total))?;
        return Ok(out);
    }

    writeln!(out, "  Items        {:>14}", totals.item_count)?;
    writeln!(out, "  Subtotal     {:>14}", config.money(totals.subtotal))?;
    for entry in totals.tax_breakdown.iter() {
        writeln!(out, "  {:<12} {:>14}", entry.label, config.money(entry.amount))?;
    }
    writeln!(out, "  Total tax    {:>14}", config.money(totals.tax))?;
    writeln!(out, "  Grand total  {:>14}", config.money(totals.total))?;
    if let Some((advance, balance)) = balance {
        writeln!(out, "  Advance      {:>14}", config.money(advance))?;
        writeln!(out, "  Balance due  {:>14}", config.money(balance))?;
    }
    Ok(out)
}

// =============================================================================
// payables
// =============================================================================

/// Summarizes vendor bills and lists the overdue ones.
pub fn payables(
    config: &BillbookConfig,
    snapshot: &BillingSnapshot,
    today: NaiveDate,
    json: bool,
) -> CliResult<String> {
    let summary = PayablesSummary::compute(&snapshot.payables, today);
    if json {
        return to_json(&summary);
    }

    let mut out = String::new();
    writeln!(out, "Bills         {:>14}", summary.bill_count)?;
    writeln!(out, "Billed        {:>14}", config.money(summary.total_billed))?;
    writeln!(out, "Paid          {:>14}", config.money(summary.total_paid))?;
    writeln!(out, "Due           {:>14}", config.money(summary.total_due))?;
    writeln!(
        out,
        "Overdue       {:>14}   ({} bills)",
        config.money(summary.overdue_amount),
        summary.overdue_count
    )?;

    let overdue = overdue_payables(&snapshot.payables, today);
    if !overdue.is_empty() {
        writeln!(out)?;
        for bill in overdue {
            writeln!(
                out,
                "  {:<24} {:<12} due {}  {:>14}",
                bill.vendor_name,
                bill.bill_number.as_deref().unwrap_or("-"),
                bill.due_date,
                config.money(bill.amount_due())
            )?;
        }
    }
    Ok(out)
}
