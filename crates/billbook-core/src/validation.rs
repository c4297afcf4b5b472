//! # Validation Module
//!
//! Input validation for invoices, quotations and payments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                │
//! │  ├── Required markers, numeric inputs                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Coercion (line_items::LineItemInput)                         │
//! │  └── Unparsable quantity → 1, unparsable rate → 0                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── Descriptions present, rates nonzero, GST slabs                    │
//! │  └── Advance payment within 0..=grand total                            │
//! │                                                                         │
//! │  A failure blocks document creation; nothing partial is produced.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::validation::{validate_description, validate_tax_rate};
//! use billbook_core::TaxRate;
//!
//! assert!(validate_description("Website redesign").is_ok());
//! assert!(validate_tax_rate(TaxRate::from_bps(1800)).is_ok());
//! assert!(validate_tax_rate(TaxRate::from_bps(1000)).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LineItem, TaxRate, GST_SLABS_BPS};
use crate::MAX_DESCRIPTION_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a line item description.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most `MAX_DESCRIPTION_LENGTH` characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// Validates that a client has been picked for the document.
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "client".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit rate.
///
/// ## Rules
/// - Must not be zero (a zero rate usually means the field was left blank)
/// - Must not be negative
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_zero() {
        return Err(ValidationError::MustBeNonZero {
            field: "rate".to_string(),
        });
    }

    if rate.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be a finite number greater than zero
pub fn validate_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate against the GST slabs.
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if !rate.is_gst_slab() {
        return Err(ValidationError::NotAllowed {
            field: "tax_rate".to_string(),
            allowed: GST_SLABS_BPS
                .iter()
                .map(|bps| format!("{}%", TaxRate::from_bps(*bps).label()))
                .collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates a single line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_description(&item.description)?;
    validate_quantity(item.quantity)?;
    validate_rate(item.rate)?;
    if item.tax_type.is_taxable() {
        validate_tax_rate(item.tax_rate())?;
    }
    Ok(())
}

/// Validates every line item of a document.
///
/// ## Rules
/// - At least one item
/// - Each item valid; the first failure is reported with its 1-based index
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::NoLineItems);
    }

    for (index, item) in items.iter().enumerate() {
        validate_line_item(item).map_err(|source| ValidationError::LineItem {
            index: index + 1,
            source: Box::new(source),
        })?;
    }

    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates an advance payment against the document total.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed the grand total
///
/// Out-of-range amounts are rejected, never clamped.
///
/// ## Example
/// ```rust
/// use billbook_core::validation::validate_advance_payment;
/// use billbook_core::Money;
///
/// let total = Money::from_minor(100000);
/// assert!(validate_advance_payment(Money::from_minor(40000), total).is_ok());
/// assert!(validate_advance_payment(total, total).is_ok());
/// assert!(validate_advance_payment(Money::from_minor(-1), total).is_err());
/// assert!(validate_advance_payment(Money::from_minor(100001), total).is_err());
/// ```
pub fn validate_advance_payment(advance: Money, grand_total: Money) -> CoreResult<()> {
    if advance.is_negative() {
        return Err(CoreError::InvalidAdvancePayment {
            reason: "advance payment cannot be negative".to_string(),
        });
    }

    if advance > grand_total {
        return Err(CoreError::InvalidAdvancePayment {
            reason: format!(
                "advance payment {} exceeds invoice total {}",
                advance, grand_total
            ),
        });
    }

    Ok(())
}

/// Validates a payment recorded against a vendor bill.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed the amount still due
pub fn validate_bill_payment(amount: Money, amount_due: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    if amount > amount_due {
        return Err(ValidationError::InvalidFormat {
            field: "payment amount".to_string(),
            reason: format!("exceeds amount due {}", amount_due),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxType;

    fn item(description: &str, rate_minor: i64, tax_type: TaxType, bps: u32) -> LineItem {
        LineItem::new(description, 1.0, Money::from_minor(rate_minor), tax_type, TaxRate::from_bps(bps))
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Logo design").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"A".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(Money::from_minor(1)).is_ok());
        assert!(matches!(
            validate_rate(Money::zero()),
            Err(ValidationError::MustBeNonZero { .. })
        ));
        assert!(validate_rate(Money::from_minor(-100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(0.25).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-2.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        for bps in GST_SLABS_BPS {
            assert!(validate_tax_rate(TaxRate::from_bps(bps)).is_ok());
        }
        assert!(validate_tax_rate(TaxRate::from_bps(825)).is_err());
    }

    #[test]
    fn test_validate_line_items_reports_index() {
        let items = vec![
            item("Design", 10000, TaxType::Gst, 1800),
            item("", 5000, TaxType::None, 0),
        ];

        match validate_line_items(&items) {
            Err(ValidationError::LineItem { index, source }) => {
                assert_eq!(index, 2);
                assert!(matches!(*source, ValidationError::Required { .. }));
            }
            other => panic!("expected line item error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_line_items_empty() {
        assert!(matches!(
            validate_line_items(&[]),
            Err(ValidationError::NoLineItems)
        ));
    }

    #[test]
    fn test_untaxed_item_skips_slab_check() {
        let mut untaxed = item("Gift", 10000, TaxType::None, 0);
        untaxed.tax_rate_bps = 1000;
        assert!(validate_line_item(&untaxed).is_ok());

        let odd_slab = item("Design", 10000, TaxType::Gst, 1000);
        assert!(validate_line_item(&odd_slab).is_err());
    }

    #[test]
    fn test_validate_advance_payment() {
        let total = Money::from_minor(100000);
        assert!(validate_advance_payment(Money::zero(), total).is_ok());
        assert!(validate_advance_payment(total, total).is_ok());
        assert!(matches!(
            validate_advance_payment(Money::from_minor(-1), total),
            Err(CoreError::InvalidAdvancePayment { .. })
        ));
        assert!(validate_advance_payment(Money::from_minor(100001), total).is_err());
    }

    #[test]
    fn test_validate_bill_payment() {
        let due = Money::from_minor(5000);
        assert!(validate_bill_payment(Money::from_minor(5000), due).is_ok());
        assert!(validate_bill_payment(Money::zero(), due).is_err());
        assert!(validate_bill_payment(Money::from_minor(5001), due).is_err());
    }
}
