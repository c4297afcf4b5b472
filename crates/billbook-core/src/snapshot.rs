//! # Billing Snapshot
//!
//! The in-memory collections one computation runs against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  data store ──(caller loads)──► BillingSnapshot ──&──► engines          │
//! │                                  clients                                │
//! │                                  invoices        health_score()         │
//! │                                  quotations      FinancialReport        │
//! │                                  payables        document_totals()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Engines only ever see the snapshot by shared reference. Callers that
//! refresh data build a new snapshot instead of mutating one mid-calculation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::health::{client_summary, health_score, health_trend, ClientSummary, HealthScore, ScorePoint};
use crate::line_items::DocumentTotals;
use crate::report::{FinancialReport, ReportPeriod};
use crate::types::{normalize_name, ClientRecord, InvoiceRecord, PayableRecord, QuotationRecord};

/// Every record the engines need, loaded at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingSnapshot {
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
    #[serde(default)]
    pub quotations: Vec<QuotationRecord>,
    #[serde(default)]
    pub payables: Vec<PayableRecord>,
}

impl BillingSnapshot {
    /// Parses a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: BillingSnapshot = serde_json::from_str(json)?;
        debug!(
            clients = snapshot.clients.len(),
            invoices = snapshot.invoices.len(),
            quotations = snapshot.quotations.len(),
            payables = snapshot.payables.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn client_by_id(&self, id: &str) -> Option<&ClientRecord> {
        self.clients.iter().find(|client| client.id == id)
    }

    /// Resolves a client by id first, then by trimmed case-insensitive name.
    pub fn find_client(&self, id_or_name: &str) -> CoreResult<&ClientRecord> {
        let wanted = id_or_name.trim();
        self.client_by_id(wanted)
            .or_else(|| {
                let wanted = normalize_name(wanted);
                self.clients.iter().find(|client| normalize_name(&client.name) == wanted)
            })
            .ok_or_else(|| CoreError::ClientNotFound(id_or_name.to_string()))
    }

    pub fn invoice(&self, id_or_number: &str) -> CoreResult<&InvoiceRecord> {
        self.invoices
            .iter()
            .find(|invoice| invoice.id == id_or_number || invoice.invoice_number == id_or_number)
            .ok_or_else(|| CoreError::InvoiceNotFound(id_or_number.to_string()))
    }

    pub fn quotation(&self, id_or_number: &str) -> CoreResult<&QuotationRecord> {
        self.quotations
            .iter()
            .find(|quotation| quotation.id == id_or_number || quotation.quotation_number == id_or_number)
            .ok_or_else(|| CoreError::QuotationNotFound(id_or_number.to_string()))
    }

    // =========================================================================
    // Engine Shortcuts
    // =========================================================================

    pub fn health_score(&self, client: &ClientRecord, as_of: NaiveDate) -> HealthScore {
        health_score(client, &self.invoices, as_of)
    }

    pub fn health_trend(&self, client: &ClientRecord, today: NaiveDate) -> Vec<ScorePoint> {
        health_trend(client, &self.invoices, today)
    }

    pub fn client_summaries(&self) -> Vec<ClientSummary> {
        self.clients
            .iter()
            .map(|client| client_summary(client, &self.invoices))
            .collect()
    }

    pub fn invoice_totals(&self, id_or_number: &str) -> CoreResult<DocumentTotals> {
        Ok(self.invoice(id_or_number)?.totals())
    }

    pub fn quotation_totals(&self, id_or_number: &str) -> CoreResult<DocumentTotals> {
        Ok(self.quotation(id_or_number)?.totals())
    }

    pub fn financial_report(&self, period: ReportPeriod, today: NaiveDate) -> FinancialReport {
        FinancialReport::build(self, period, today)
    }

    /// Invoice numbers in use, for [`crate::documents::next_document_number`].
    pub fn invoice_numbers(&self) -> impl Iterator<Item = &str> {
        self.invoices.iter().map(|invoice| invoice.invoice_number.as_str())
    }

    pub fn quotation_numbers(&self) -> impl Iterator<Item = &str> {
        self.quotations.iter().map(|quotation| quotation.quotation_number.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{next_document_number, INVOICE_PREFIX};
    use crate::money::Money;

    const SNAPSHOT: &str = r#"{
        "clients": [
            { "id": "c-1", "name": "Acme Traders" },
            { "id": "c-2", "name": "Globex" }
        ],
        "invoices": [
            {
                "id": "inv-1",
                "invoice_number": "INV-0001",
                "client_id": "c-1",
                "client_name": "Acme Traders",
                "items": [
                    { "description": "Design", "quantity": 2, "rate": 10000, "tax_type": "gst", "tax_rate_bps": 1800 },
                    { "description": "Hosting", "quantity": 1, "rate": 5000 }
                ],
                "status": "paid",
                "issue_date": "2026-05-02",
                "due_date": "2026-05-30",
                "payment_date": "2026-05-10",
                "amount": 28600
            },
            {
                "id": "inv-2",
                "invoice_number": "INV-0002",
                "client_name": " globex ",
                "status": "pending",
                "issue_date": "01/03/2026",
                "due_date": "2026-03-15",
                "amount": 50000
            }
        ],
        "quotations": [
            {
                "id": "quo-1",
                "quotation_number": "QUO-0001",
                "client_name": "Globex",
                "status": "sent",
                "issue_date": "2026-05-01",
                "valid_until": "2026-05-31",
                "total_amount": 12000
            }
        ],
        "payables": [
            {
                "id": "bill-1",
                "vendor_name": "Paper Mill",
                "bill_date": "2026-05-05",
                "due_date": "2026-05-20",
                "bill_amount": 4000,
                "amount_paid": 4000,
                "status": "paid"
            }
        ]
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_snapshot_parses() {
        let snapshot = BillingSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.clients.len(), 2);
        assert_eq!(snapshot.invoices[1].issue_date, date(2026, 3, 1));
        assert_eq!(snapshot.payables[0].amount_due(), Money::zero());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = BillingSnapshot::from_json("{}").unwrap();
        assert!(snapshot.invoices.is_empty());
        assert!(snapshot.find_client("anyone").is_err());
    }

    #[test]
    fn test_find_client_by_id_then_name() {
        let snapshot = BillingSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.find_client("c-2").unwrap().name, "Globex");
        assert_eq!(snapshot.find_client("  ACME traders").unwrap().id, "c-1");
        assert!(matches!(
            snapshot.find_client("Initech"),
            Err(CoreError::ClientNotFound(_))
        ));
    }

    #[test]
    fn test_document_lookups_and_totals() {
        let snapshot = BillingSnapshot::from_json(SNAPSHOT).unwrap();
        let totals = snapshot.invoice_totals("INV-0001").unwrap();
        assert_eq!(totals.subtotal, Money::from_minor(25000));
        assert_eq!(totals.tax, Money::from_minor(3600));
        assert_eq!(totals.total, Money::from_minor(28600));

        let saved = snapshot.quotation_totals("quo-1").unwrap();
        assert_eq!(saved.item_count, 0);
        assert_eq!(saved.total, Money::from_minor(12000));
        assert_eq!(saved.subtotal, Money::from_minor(12000));
        assert_eq!(saved.tax, Money::zero());
        assert_eq!(saved.total, snapshot.quotation("quo-1").unwrap().total());
        assert!(matches!(
            snapshot.invoice("INV-0404"),
            Err(CoreError::InvoiceNotFound(_))
        ));
    }

    #[test]
    fn test_engine_shortcuts() {
        let snapshot = BillingSnapshot::from_json(SNAPSHOT).unwrap();
        let today = date(2026, 5, 20);

        let globex = snapshot.find_client("Globex").unwrap();
        // Pending since mid-March: 66 days overdue
        assert_eq!(snapshot.health_score(globex, today).value(), 6.0);
        assert_eq!(snapshot.health_trend(globex, today).len(), 6);

        let report = snapshot.financial_report(ReportPeriod::Monthly, today);
        assert_eq!(report.revenue, Money::from_minor(28600));
        assert_eq!(report.expenses, Money::from_minor(4000));
        assert_eq!(report.top_clients[0].client_name, "Acme Traders");

        let summaries = snapshot.client_summaries();
        assert_eq!(summaries[1].outstanding, Money::from_minor(50000));

        assert_eq!(next_document_number(INVOICE_PREFIX, snapshot.invoice_numbers()), "INV-0003");
    }
}
