//! # Error Types
//!
//! Domain-specific error types for billbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billbook-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── CliError         - Config, file and snapshot failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Empty inputs are not errors: a client with no invoices scores 10, a
//! report with no revenue has a margin of 0.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Client cannot be resolved by id or name.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Invoice cannot be found in the snapshot.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Quotation cannot be found in the snapshot.
    #[error("Quotation not found: {0}")]
    QuotationNotFound(String),

    /// Advance payment outside `0..=grand_total`.
    ///
    /// ## When This Occurs
    /// - Negative advance typed into the invoice form
    /// - Advance larger than the invoice total
    ///
    /// The amount is rejected, never clamped.
    #[error("Invalid advance payment: {reason}")]
    InvalidAdvancePayment { reason: String },

    /// Invoice is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Recording an advance against a cancelled invoice
    #[error("Invoice {invoice_id} is {current_status}, cannot perform operation")]
    InvalidInvoiceStatus {
        invoice_id: String,
        current_status: String,
    },

    /// Quotation is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Converting a quotation that was never accepted
    #[error("Quotation {quotation_id} is {current_status}, cannot perform operation")]
    InvalidQuotationStatus {
        quotation_id: String,
        current_status: String,
    },

    /// Rendering the CSV export failed.
    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These surface before any computation or write happens; the caller keeps
/// the form editable and shows the message.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. invalid date, invalid tax rate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A document has no line items.
    #[error("at least one line item is required")]
    NoLineItems,

    /// A specific line item failed validation.
    #[error("line item {index}: {source}")]
    LineItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
