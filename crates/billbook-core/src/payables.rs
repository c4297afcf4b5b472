//! # Payables
//!
//! Vendor bills: recording payments against them and summarizing what is owed.
//!
//! ```text
//! bill_amount ──► amount_paid ──► amount_due = bill_amount − amount_paid
//!
//!   amount_paid = 0               → pending
//!   0 < amount_paid < bill_amount → partial
//!   amount_paid ≥ bill_amount     → paid
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{PayableRecord, PayableStatus};
use crate::validation::validate_bill_payment;

/// Settlement status implied by how much of a bill was paid.
pub fn derive_payable_status(bill_amount: Money, amount_paid: Money) -> PayableStatus {
    if amount_paid >= bill_amount {
        PayableStatus::Paid
    } else if amount_paid.is_positive() {
        PayableStatus::Partial
    } else {
        PayableStatus::Pending
    }
}

/// Records a payment against a vendor bill.
///
/// ## Errors
/// The amount must be positive and no larger than what is still due.
pub fn record_payment(bill: &PayableRecord, amount: Money) -> CoreResult<PayableRecord> {
    validate_bill_payment(amount, bill.amount_due())?;

    let mut updated = bill.clone();
    updated.amount_paid += amount;
    updated.status = derive_payable_status(updated.bill_amount, updated.amount_paid);

    debug!(
        payable_id = %updated.id,
        vendor = %updated.vendor_name,
        paid = %amount,
        amount_due = %updated.amount_due(),
        status = %updated.status,
        "Bill payment recorded"
    );
    Ok(updated)
}

// =============================================================================
// Summary
// =============================================================================

/// What the business owes its vendors as of a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayablesSummary {
    pub bill_count: usize,
    pub total_billed: Money,
    pub total_paid: Money,
    pub total_due: Money,
    pub overdue_count: usize,
    pub overdue_amount: Money,
}

impl PayablesSummary {
    pub fn compute(payables: &[PayableRecord], as_of: NaiveDate) -> Self {
        payables.iter().fold(PayablesSummary::default(), |mut summary, bill| {
            summary.bill_count += 1;
            summary.total_billed += bill.bill_amount;
            summary.total_paid += bill.amount_paid;
            if bill.status != PayableStatus::Paid && bill.amount_due().is_positive() {
                summary.total_due += bill.amount_due();
            }
            if bill.is_overdue(as_of) {
                summary.overdue_count += 1;
                summary.overdue_amount += bill.amount_due();
            }
            summary
        })
    }
}

/// Unsettled bills past their due date, most overdue first.
pub fn overdue_payables(payables: &[PayableRecord], as_of: NaiveDate) -> Vec<&PayableRecord> {
    let mut overdue: Vec<&PayableRecord> = payables.iter().filter(|bill| bill.is_overdue(as_of)).collect();
    overdue.sort_by_key(|bill| bill.due_date);
    overdue
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(id: &str, amount_minor: i64, paid_minor: i64, due: NaiveDate) -> PayableRecord {
        PayableRecord {
            id: id.to_string(),
            vendor_name: "Paper Mill".to_string(),
            bill_number: Some(format!("B-{}", id)),
            bill_date: date(2026, 1, 1),
            due_date: due,
            bill_amount: Money::from_minor(amount_minor),
            amount_paid: Money::from_minor(paid_minor),
            status: derive_payable_status(Money::from_minor(amount_minor), Money::from_minor(paid_minor)),
        }
    }

    #[test]
    fn test_record_payment_status_progression() {
        let pending = bill("p-1", 10000, 0, date(2026, 2, 1));
        assert_eq!(pending.status, PayableStatus::Pending);

        let partial = record_payment(&pending, Money::from_minor(4000)).unwrap();
        assert_eq!(partial.status, PayableStatus::Partial);
        assert_eq!(partial.amount_due(), Money::from_minor(6000));

        let paid = record_payment(&partial, Money::from_minor(6000)).unwrap();
        assert_eq!(paid.status, PayableStatus::Paid);
        assert!(paid.amount_due().is_zero());
    }

    #[test]
    fn test_record_payment_rejects_overpayment() {
        let pending = bill("p-1", 10000, 0, date(2026, 2, 1));
        assert!(matches!(
            record_payment(&pending, Money::from_minor(10001)),
            Err(CoreError::Validation(_))
        ));
        assert!(record_payment(&pending, Money::zero()).is_err());
    }

    #[test]
    fn test_summary_and_overdue_list() {
        let as_of = date(2026, 3, 1);
        let payables = vec![
            bill("p-1", 10000, 10000, date(2026, 1, 15)),
            bill("p-2", 8000, 3000, date(2026, 2, 20)),
            bill("p-3", 5000, 0, date(2026, 1, 31)),
            bill("p-4", 2000, 0, date(2026, 3, 10)),
        ];

        let summary = PayablesSummary::compute(&payables, as_of);
        assert_eq!(summary.bill_count, 4);
        assert_eq!(summary.total_billed, Money::from_minor(25000));
        assert_eq!(summary.total_paid, Money::from_minor(13000));
        assert_eq!(summary.total_due, Money::from_minor(12000));
        assert_eq!(summary.overdue_count, 2);
        assert_eq!(summary.overdue_amount, Money::from_minor(10000));

        let ids: Vec<&str> = overdue_payables(&payables, as_of).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["p-3", "p-2"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PayablesSummary::compute(&[], date(2026, 3, 1));
        assert_eq!(summary, PayablesSummary::default());
    }
}
