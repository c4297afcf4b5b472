//! # Domain Types
//!
//! Core record types used throughout Billbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ClientRecord   │   │  InvoiceRecord  │   │ QuotationRecord │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  client_id?     │   │  client_id?     │       │
//! │  │  name (join)    │◄──│  client_name    │   │  client_name    │       │
//! │  │  contact fields │   │  items[]        │   │  items[]        │       │
//! │  └─────────────────┘   │  advance        │   │  valid_until    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │    TaxType      │   │  PayableRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity       │   │  None           │   │  vendor_name    │       │
//! │  │  rate (Money)   │   │  Gst            │   │  bill_amount    │       │
//! │  │  tax_rate_bps   │   │  Igst           │   │  amount_paid    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Client Identity
//! Invoices and quotations point at a client by `client_id` when they have
//! one and by display name otherwise. [`ClientLinked::belongs_to`] is the one
//! place that resolves the link: a record carrying an id matches on the id
//! alone, and only a record without one falls back to trimmed
//! case-insensitive name equality.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::dates::{deserialize_date, deserialize_optional_date};
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// GST slabs in basis points: 0%, 5%, 12%, 18%, 28%.
pub const GST_SLABS_BPS: [u32; 5] = [0, 500, 1200, 1800, 2800];

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks the rate against the GST slabs.
    pub fn is_gst_slab(&self) -> bool {
        GST_SLABS_BPS.contains(&self.0)
    }

    /// Percentage without trailing zeros: `18`, `2.5`, `0.25`.
    pub fn label(&self) -> String {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        match fraction {
            0 => whole.to_string(),
            f if f % 10 == 0 => format!("{}.{}", whole, f / 10),
            f => format!("{}.{:02}", whole, f),
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Type
// =============================================================================

/// Which tax applies to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// No tax; the rate is forced to zero.
    #[default]
    None,
    /// Intra-state goods and services tax.
    Gst,
    /// Inter-state goods and services tax.
    Igst,
}

impl TaxType {
    /// Upper-case label used in tax breakdown keys.
    pub fn label(&self) -> &'static str {
        match self {
            TaxType::None => "NONE",
            TaxType::Gst => "GST",
            TaxType::Igst => "IGST",
        }
    }

    /// Returns true when this tax type charges anything at all.
    pub fn is_taxable(&self) -> bool {
        !matches!(self, TaxType::None)
    }
}

impl FromStr for TaxType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(TaxType::None),
            "gst" => Ok(TaxType::Gst),
            "igst" => Ok(TaxType::Igst),
            _ => Err(ValidationError::NotAllowed {
                field: "tax_type".to_string(),
                allowed: vec!["none".into(), "gst".into(), "igst".into()],
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A billable line on an invoice or quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// What was sold or performed.
    pub description: String,

    /// Units billed; fractional for hourly work.
    pub quantity: f64,

    /// Price per unit.
    pub rate: Money,

    /// Which tax applies.
    #[serde(default)]
    pub tax_type: TaxType,

    /// Tax rate in basis points (1800 = 18%).
    #[serde(default)]
    pub tax_rate_bps: u32,
}

impl LineItem {
    /// Creates a line item, forcing the rate to zero when untaxed.
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        rate: Money,
        tax_type: TaxType,
        tax_rate: TaxRate,
    ) -> Self {
        let tax_rate_bps = if tax_type.is_taxable() { tax_rate.bps() } else { 0 };
        LineItem {
            description: description.into(),
            quantity,
            rate,
            tax_type,
            tax_rate_bps,
        }
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being prepared, not yet issued.
    #[default]
    Draft,
    /// Issued, nothing paid.
    Pending,
    /// Delivered to the client.
    Sent,
    /// Fully settled.
    Paid,
    /// Partly settled by an advance.
    Partial,
    /// Past due and unpaid.
    Overdue,
    /// Withdrawn; never counts toward anything.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true while money is still expected on the invoice.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Pending
                | InvoiceStatus::Sent
                | InvoiceStatus::Partial
                | InvoiceStatus::Overdue
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Quotation Status
// =============================================================================

/// Lifecycle status of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Expired,
}

impl QuotationStatus {
    /// Returns true while the client can still accept the quotation.
    pub fn is_open(&self) -> bool {
        matches!(self, QuotationStatus::Draft | QuotationStatus::Sent)
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Declined => "declined",
            QuotationStatus::Expired => "expired",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Payable Status
// =============================================================================

/// Settlement status of a vendor bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PayableStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl fmt::Display for PayableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PayableStatus::Pending => "pending",
            PayableStatus::Partial => "partial",
            PayableStatus::Paid => "paid",
            PayableStatus::Overdue => "overdue",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer the business bills.
///
/// The stored aggregates are display caches written by whoever saved the
/// record. The core recomputes them from invoices via
/// [`crate::health::client_summary`] and never reads them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// GST identification number.
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub total_invoices: u32,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub outstanding: Money,
}

// =============================================================================
// Client Linking
// =============================================================================

/// Normalizes a client name for matching: trimmed and lower-cased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A record that points at a client.
pub trait ClientLinked {
    /// Client id the record was saved with, if any.
    fn linked_client_id(&self) -> Option<&str>;

    /// Client display name the record was saved with.
    fn linked_client_name(&self) -> &str;

    /// Two-step lookup: id equality when the record has an id, otherwise
    /// normalized-name equality.
    fn belongs_to(&self, client: &ClientRecord) -> bool {
        match self.linked_client_id() {
            Some(id) => id == client.id,
            None => normalize_name(self.linked_client_name()) == normalize_name(&client.name),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An issued (or draft) invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceRecord {
    pub id: String,

    /// Business identifier printed on the document (`INV-0042`).
    #[serde(default)]
    pub invoice_number: String,

    #[serde(default)]
    pub client_id: Option<String>,

    pub client_name: String,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub status: InvoiceStatus,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub issue_date: NaiveDate,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub due_date: NaiveDate,

    /// When the invoice was settled; absent while unpaid.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[ts(as = "Option<String>")]
    pub payment_date: Option<NaiveDate>,

    #[serde(default)]
    pub advance_payment: Money,

    /// Grand total as saved. Only used for records that carry no line items.
    #[serde(default)]
    pub amount: Money,
}

impl InvoiceRecord {
    /// Grand total, recomputed from the line items when there are any.
    pub fn total(&self) -> Money {
        if self.items.is_empty() {
            self.amount
        } else {
            crate::line_items::grand_total(&self.items)
        }
    }

    /// Totals summary, falling back to the saved total without line items.
    pub fn totals(&self) -> crate::line_items::DocumentTotals {
        crate::line_items::DocumentTotals::for_record(&self.items, self.amount)
    }

    /// Amount still owed after the advance payment.
    pub fn balance_due(&self) -> Money {
        self.total() - self.advance_payment
    }

    /// Returns true when the invoice counted as paid on `as_of`.
    ///
    /// A paid invoice whose payment date lies after `as_of` was still unpaid
    /// at that point in history.
    pub fn is_paid_as_of(&self, as_of: NaiveDate) -> bool {
        match self.status {
            InvoiceStatus::Paid => self.payment_date.map_or(true, |paid| paid <= as_of),
            _ => false,
        }
    }

    /// Returns true when the invoice was awaiting payment on `as_of`.
    ///
    /// Only `pending` invoices qualify, plus `paid` invoices settled after
    /// `as_of`. Other outstanding statuses are not counted.
    pub fn is_unpaid_as_of(&self, as_of: NaiveDate) -> bool {
        match self.status {
            InvoiceStatus::Pending => true,
            InvoiceStatus::Paid => !self.is_paid_as_of(as_of),
            _ => false,
        }
    }

    /// Status as of `as_of`, reporting `overdue` for unpaid invoices past due.
    pub fn effective_status(&self, as_of: NaiveDate) -> InvoiceStatus {
        if self.status.is_outstanding() && self.due_date < as_of {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }
}

impl ClientLinked for InvoiceRecord {
    fn linked_client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn linked_client_name(&self) -> &str {
        &self.client_name
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A price offer that can later become an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationRecord {
    pub id: String,

    #[serde(default)]
    pub quotation_number: String,

    #[serde(default)]
    pub client_id: Option<String>,

    pub client_name: String,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub status: QuotationStatus,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub issue_date: NaiveDate,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub valid_until: NaiveDate,

    /// Grand total as saved. Only used for records that carry no line items.
    #[serde(default)]
    pub total_amount: Money,
}

impl QuotationRecord {
    /// Grand total, recomputed from the line items when there are any.
    pub fn total(&self) -> Money {
        if self.items.is_empty() {
            self.total_amount
        } else {
            crate::line_items::grand_total(&self.items)
        }
    }

    /// Totals summary, falling back to the saved total without line items.
    pub fn totals(&self) -> crate::line_items::DocumentTotals {
        crate::line_items::DocumentTotals::for_record(&self.items, self.total_amount)
    }

    /// Status as of `as_of`, reporting `expired` for open quotations past validity.
    pub fn effective_status(&self, as_of: NaiveDate) -> QuotationStatus {
        if self.status.is_open() && self.valid_until < as_of {
            QuotationStatus::Expired
        } else {
            self.status
        }
    }
}

impl ClientLinked for QuotationRecord {
    fn linked_client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn linked_client_name(&self) -> &str {
        &self.client_name
    }
}

// =============================================================================
// Payable
// =============================================================================

/// A vendor bill the business owes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayableRecord {
    pub id: String,

    pub vendor_name: String,

    #[serde(default)]
    pub bill_number: Option<String>,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub bill_date: NaiveDate,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub due_date: NaiveDate,

    pub bill_amount: Money,

    #[serde(default)]
    pub amount_paid: Money,

    #[serde(default)]
    pub status: PayableStatus,
}

impl PayableRecord {
    /// `bill_amount - amount_paid`.
    pub fn amount_due(&self) -> Money {
        self.bill_amount - self.amount_paid
    }

    /// Returns true when something is still owed past the due date.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status != PayableStatus::Paid && self.amount_due().is_positive() && self.due_date < as_of
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
