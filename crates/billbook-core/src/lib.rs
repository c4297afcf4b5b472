//! # billbook-core: Pure Billing Logic for Billbook
//!
//! This crate holds every calculation Billbook makes about money: document
//! totals, client payment health and financial reports. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    billbook CLI (apps/cli)                      │   │
//! │  │    config ──► load snapshot ──► run command ──► print / export  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &BillingSnapshot                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ billbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │   │
//! │  │   │ line_items │  │   health   │  │   report   │  │ export  │  │   │
//! │  │   │ documents  │  │ HealthScore│  │ Financial  │  │  CSV    │  │   │
//! │  │   │ payables   │  │ trend      │  │  Report    │  │         │  │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   types • money • dates • validation • error • snapshot         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (ClientRecord, InvoiceRecord, LineItem, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`dates`] - Lenient date parsing and calendar helpers
//! - [`line_items`] - Subtotal, tax, grand total and tax breakdown
//! - [`documents`] - Invoice and quotation drafts, status derivation
//! - [`payables`] - Vendor bill payments and summary
//! - [`health`] - Client health score and trend
//! - [`report`] - Financial report aggregation
//! - [`export`] - CSV export of the monthly series
//! - [`snapshot`] - The record collections passed to the engines
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same snapshot and date in, same numbers out
//! 2. **No I/O**: loading and saving records is the caller's job
//! 3. **Integer Money**: amounts are minor units (i64), rounded once per line
//! 4. **Explicit Dates**: every date-relative result takes its "today" as an argument
//!
//! ## Example Usage
//!
//! ```rust
//! use billbook_core::line_items::DocumentTotals;
//! use billbook_core::{LineItem, Money, TaxRate, TaxType};
//!
//! let items = vec![
//!     LineItem::new("Design", 2.0, Money::from_minor(10000), TaxType::Gst, TaxRate::from_bps(1800)),
//!     LineItem::new("Hosting", 1.0, Money::from_minor(5000), TaxType::None, TaxRate::zero()),
//! ];
//! let totals = DocumentTotals::from_items(&items);
//!
//! assert_eq!(totals.subtotal.to_decimal_string(), "250.00");
//! assert_eq!(totals.tax.to_decimal_string(), "36.00");
//! assert_eq!(totals.total.to_decimal_string(), "286.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod documents;
pub mod error;
pub mod export;
pub mod health;
pub mod line_items;
pub mod money;
pub mod payables;
pub mod report;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use documents::{InvoiceDraft, QuotationDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use health::{HealthRating, HealthScore};
pub use line_items::DocumentTotals;
pub use money::Money;
pub use report::{FinancialReport, ReportPeriod};
pub use snapshot::BillingSnapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a line item description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Number of clients in a report's top-client ranking.
pub const TOP_CLIENTS_LIMIT: usize = 5;

/// Number of most recent payments checked for lateness when scoring.
pub const RECENT_PAYMENTS_WINDOW: usize = 5;

/// Points in a health trend, current month included.
pub const TREND_MONTHS: usize = 6;
