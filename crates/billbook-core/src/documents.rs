//! # Documents
//!
//! Turning form drafts into invoice and quotation records.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Creation & Updates                           │
//! │                                                                         │
//! │  QuotationRecord (accepted) ──convert_to_invoice()──┐                   │
//! │                                                      ▼                  │
//! │  Form ──► InvoiceDraft ──finalize()──► validate ──► InvoiceRecord       │
//! │                                          │                              │
//! │                                          └─ any failure: no record      │
//! │                                                                         │
//! │  InvoiceRecord ──apply_advance_payment()──► InvoiceRecord (updated)     │
//! │                                                                         │
//! │  Both paths derive status with the same rule:                           │
//! │    advance ≥ total      → paid                                          │
//! │    0 < advance < total  → partial                                       │
//! │    otherwise            → pending                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::dates::{deserialize_date, deserialize_optional_date};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::line_items::DocumentTotals;
use crate::money::Money;
use crate::types::{
    ClientRecord, InvoiceRecord, InvoiceStatus, LineItem, QuotationRecord, QuotationStatus,
};
use crate::validation::{validate_advance_payment, validate_client_name, validate_line_items};

/// Number prefix for invoices.
pub const INVOICE_PREFIX: &str = "INV";

/// Number prefix for quotations.
pub const QUOTATION_PREFIX: &str = "QUO";

// =============================================================================
// Client Reference
// =============================================================================

/// The client a draft is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientRef {
    pub id: Option<String>,
    pub name: String,
}

impl From<&ClientRecord> for ClientRef {
    fn from(client: &ClientRecord) -> Self {
        ClientRef {
            id: Some(client.id.clone()),
            name: client.name.clone(),
        }
    }
}

fn require_client(client: Option<&ClientRef>) -> CoreResult<&ClientRef> {
    let client = client.ok_or_else(|| ValidationError::Required {
        field: "client".to_string(),
    })?;
    validate_client_name(&client.name)?;
    Ok(client)
}

// =============================================================================
// Status Derivation
// =============================================================================

/// Derives an invoice's status from how much of it was paid in advance.
///
/// ## Example
/// ```rust
/// use billbook_core::documents::derive_invoice_status;
/// use billbook_core::{InvoiceStatus, Money};
///
/// let total = Money::from_minor(100000);
/// assert_eq!(derive_invoice_status(total, total), InvoiceStatus::Paid);
/// assert_eq!(derive_invoice_status(total, Money::from_minor(40000)), InvoiceStatus::Partial);
/// assert_eq!(derive_invoice_status(total, Money::zero()), InvoiceStatus::Pending);
/// ```
pub fn derive_invoice_status(grand_total: Money, advance_payment: Money) -> InvoiceStatus {
    if advance_payment >= grand_total {
        InvoiceStatus::Paid
    } else if advance_payment.is_positive() {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Pending
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// Result of computing an invoice draft: what a write would need to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceComputation {
    pub totals: DocumentTotals,
    pub advance_payment: Money,
    pub balance_due: Money,
    pub status: InvoiceStatus,
}

/// An invoice as assembled in the creation form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub invoice_number: String,
    pub client: Option<ClientRef>,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub advance_payment: Money,
}

impl InvoiceDraft {
    /// Validates the draft and computes totals, balance and status.
    ///
    /// ## Errors
    /// - missing client, no items, blank description, zero rate, odd GST slab
    /// - missing due date
    /// - advance payment negative or above the grand total
    pub fn compute(&self) -> CoreResult<InvoiceComputation> {
        require_client(self.client.as_ref())?;
        validate_line_items(&self.items)?;
        if self.due_date.is_none() {
            return Err(ValidationError::Required {
                field: "due_date".to_string(),
            }
            .into());
        }

        let totals = DocumentTotals::from_items(&self.items);
        validate_advance_payment(self.advance_payment, totals.total)?;

        let status = derive_invoice_status(totals.total, self.advance_payment);
        Ok(InvoiceComputation {
            balance_due: totals.total - self.advance_payment,
            advance_payment: self.advance_payment,
            status,
            totals,
        })
    }

    /// Validates the draft and produces the record to persist.
    ///
    /// A fully prepaid invoice records its issue date as the payment date.
    pub fn finalize(self) -> CoreResult<InvoiceRecord> {
        let computation = match self.compute() {
            Ok(computation) => computation,
            Err(e) => {
                debug!(error = %e, "Invoice draft rejected");
                return Err(e);
            }
        };

        let client = require_client(self.client.as_ref())?.clone();
        let due_date = self.due_date.ok_or_else(|| ValidationError::Required {
            field: "due_date".to_string(),
        })?;

        let payment_date = match computation.status {
            InvoiceStatus::Paid => Some(self.issue_date),
            _ => None,
        };

        let record = InvoiceRecord {
            id: Uuid::new_v4().to_string(),
            invoice_number: self.invoice_number,
            client_id: client.id,
            client_name: client.name.trim().to_string(),
            items: self.items,
            status: computation.status,
            issue_date: self.issue_date,
            due_date,
            payment_date,
            advance_payment: computation.advance_payment,
            amount: computation.totals.total,
        };

        debug!(
            invoice_id = %record.id,
            total = %record.amount,
            status = %record.status,
            "Invoice finalized"
        );
        Ok(record)
    }
}

/// Records a new advance payment on an existing invoice.
///
/// Uses the same status rule as creation. `paid_on` becomes the payment date
/// when the advance covers the whole invoice.
///
/// ## Errors
/// - the invoice is cancelled
/// - the advance is negative or above the invoice total
pub fn apply_advance_payment(
    invoice: &InvoiceRecord,
    advance_payment: Money,
    paid_on: NaiveDate,
) -> CoreResult<InvoiceRecord> {
    if invoice.status == InvoiceStatus::Cancelled {
        return Err(CoreError::InvalidInvoiceStatus {
            invoice_id: invoice.id.clone(),
            current_status: invoice.status.to_string(),
        });
    }

    let total = invoice.total();
    validate_advance_payment(advance_payment, total)?;

    let status = derive_invoice_status(total, advance_payment);
    let mut updated = invoice.clone();
    updated.advance_payment = advance_payment;
    updated.amount = total;
    updated.status = status;
    updated.payment_date = match status {
        InvoiceStatus::Paid => invoice.payment_date.or(Some(paid_on)),
        _ => None,
    };

    debug!(
        invoice_id = %updated.id,
        advance = %advance_payment,
        balance_due = %updated.balance_due(),
        status = %status,
        "Advance payment applied"
    );
    Ok(updated)
}

// =============================================================================
// Quotation Draft
// =============================================================================

/// A quotation as assembled in the creation form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationDraft {
    #[serde(default)]
    pub quotation_number: String,
    pub client: Option<ClientRef>,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,
}

impl QuotationDraft {
    /// Validates the draft and produces a `draft` quotation record.
    pub fn finalize(self) -> CoreResult<QuotationRecord> {
        let client = require_client(self.client.as_ref())?.clone();
        validate_line_items(&self.items)?;
        let valid_until = self.valid_until.ok_or_else(|| ValidationError::Required {
            field: "valid_until".to_string(),
        })?;

        let totals = DocumentTotals::from_items(&self.items);
        let record = QuotationRecord {
            id: Uuid::new_v4().to_string(),
            quotation_number: self.quotation_number,
            client_id: client.id,
            client_name: client.name.trim().to_string(),
            items: self.items,
            status: QuotationStatus::Draft,
            issue_date: self.issue_date,
            valid_until,
            total_amount: totals.total,
        };

        debug!(quotation_id = %record.id, total = %record.total_amount, "Quotation finalized");
        Ok(record)
    }
}

impl QuotationRecord {
    /// Starts an invoice from an accepted quotation.
    ///
    /// ## Errors
    /// `InvalidQuotationStatus` unless the quotation is `accepted`.
    pub fn convert_to_invoice(
        &self,
        invoice_number: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> CoreResult<InvoiceDraft> {
        if self.status != QuotationStatus::Accepted {
            return Err(CoreError::InvalidQuotationStatus {
                quotation_id: self.id.clone(),
                current_status: self.status.to_string(),
            });
        }

        Ok(InvoiceDraft {
            invoice_number: invoice_number.into(),
            client: Some(ClientRef {
                id: self.client_id.clone(),
                name: self.client_name.clone(),
            }),
            items: self.items.clone(),
            issue_date,
            due_date: Some(due_date),
            advance_payment: Money::zero(),
        })
    }
}

// =============================================================================
// Numbering
// =============================================================================

/// Next sequential document number for `prefix`.
///
/// Numbers look like `INV-0007`. Existing numbers with another prefix or an
/// unreadable sequence are ignored.
///
/// ## Example
/// ```rust
/// use billbook_core::documents::next_document_number;
///
/// let existing = ["INV-0001", "INV-0009", "QUO-0042", "legacy"];
/// assert_eq!(next_document_number("INV", existing), "INV-0010");
/// assert_eq!(next_document_number("QUO", existing), "QUO-0043");
/// assert_eq!(next_document_number("INV", [] as [&str; 0]), "INV-0001");
/// ```
pub fn next_document_number<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|number| {
            number
                .trim()
                .strip_prefix(prefix)?
                .strip_prefix('-')?
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0);

    format!("{}-{:04}", prefix, highest + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
