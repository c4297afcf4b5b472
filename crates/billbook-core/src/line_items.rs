//! # Line-Item Financial Engine
//!
//! Subtotal, tax and grand total for invoices and quotations.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Totals                                      │
//! │                                                                         │
//! │  LineItem ──► item_total = quantity × rate        (rounded once)        │
//! │          └──► item_tax   = item_total × rate%     (0 when untaxed)      │
//! │                                                                         │
//! │  subtotal    = Σ item_total                                             │
//! │  total_tax   = Σ item_tax   = Σ tax_breakdown values                    │
//! │  grand_total = subtotal + total_tax                                     │
//! │                                                                         │
//! │  tax_breakdown: "GST 18%" → 36.00, "IGST 5%" → 2.50, ...                │
//! │                 first-seen order, untaxed lines excluded                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because each line's tax is rounded to the minor unit before summing, the
//! breakdown always adds up to the total tax exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LineItem, TaxRate, TaxType};

// =============================================================================
// Per-Item Math
// =============================================================================

/// `quantity × rate`.
pub fn item_total(item: &LineItem) -> Money {
    item.rate.multiply_quantity(item.quantity)
}

/// Tax on a single line; zero when the line is untaxed.
pub fn item_tax(item: &LineItem) -> Money {
    if !item.tax_type.is_taxable() {
        return Money::zero();
    }
    item_total(item).calculate_tax(item.tax_rate())
}

// =============================================================================
// Document Math
// =============================================================================

/// Sum of line totals before tax.
pub fn subtotal(items: &[LineItem]) -> Money {
    items.iter().map(item_total).sum()
}

/// Sum of line taxes.
pub fn total_tax(items: &[LineItem]) -> Money {
    items.iter().map(item_tax).sum()
}

/// `subtotal + total_tax`.
pub fn grand_total(items: &[LineItem]) -> Money {
    subtotal(items) + total_tax(items)
}

/// Groups tax by `"{TAXTYPE} {rate}%"` in first-seen order.
///
/// ## Example
/// ```rust
/// use billbook_core::line_items::tax_breakdown;
/// use billbook_core::{LineItem, Money, TaxRate, TaxType};
///
/// let items = vec![
///     LineItem::new("Design", 2.0, Money::from_minor(10000), TaxType::Gst, TaxRate::from_bps(1800)),
///     LineItem::new("Hosting", 1.0, Money::from_minor(5000), TaxType::None, TaxRate::zero()),
/// ];
/// let breakdown = tax_breakdown(&items);
/// assert_eq!(breakdown.get("GST 18%"), Some(Money::from_minor(3600)));
/// assert_eq!(breakdown.len(), 1);
/// ```
pub fn tax_breakdown(items: &[LineItem]) -> TaxBreakdown {
    let mut breakdown = TaxBreakdown::default();
    for item in items.iter().filter(|item| item.tax_type.is_taxable()) {
        breakdown.add(breakdown_label(item.tax_type, item.tax_rate()), item_tax(item));
    }
    breakdown
}

/// Breakdown key for a tax type and rate (`"GST 18%"`).
pub fn breakdown_label(tax_type: TaxType, rate: TaxRate) -> String {
    format!("{} {}%", tax_type.label(), rate.label())
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// One row of a tax breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdownEntry {
    pub label: String,
    pub amount: Money,
}

/// Tax grouped by type and rate, in the order the groups first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown(Vec<TaxBreakdownEntry>);

impl TaxBreakdown {
    fn add(&mut self, label: String, amount: Money) {
        match self.0.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.amount += amount,
            None => self.0.push(TaxBreakdownEntry { label, amount }),
        }
    }

    /// Tax for one group, if present.
    pub fn get(&self, label: &str) -> Option<Money> {
        self.0
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBreakdownEntry> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|entry| entry.label.as_str()).collect()
    }

    /// Sum over all groups.
    pub fn total(&self) -> Money {
        self.0.iter().map(|entry| entry.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Totals summary for a document, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    pub item_count: usize,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_breakdown: TaxBreakdown,
}

impl DocumentTotals {
    pub fn from_items(items: &[LineItem]) -> Self {
        let subtotal = subtotal(items);
        let tax = total_tax(items);
        DocumentTotals {
            item_count: items.len(),
            subtotal,
            tax,
            total: subtotal + tax,
            tax_breakdown: tax_breakdown(items),
        }
    }

    /// Totals for a record saved without line items: the stored total is
    /// both subtotal and grand total, with no tax to break down.
    pub fn from_saved_total(total: Money) -> Self {
        DocumentTotals {
            item_count: 0,
            subtotal: total,
            tax: Money::zero(),
            total,
            tax_breakdown: TaxBreakdown::default(),
        }
    }

    /// Line-item totals, or the saved total when there are no items.
    pub fn for_record(items: &[LineItem], saved_total: Money) -> Self {
        if items.is_empty() {
            Self::from_saved_total(saved_total)
        } else {
            Self::from_items(items)
        }
    }
}

// =============================================================================
// Form Input
// =============================================================================

/// A line item as typed into a form, before coercion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: String,
    pub rate: String,
    #[serde(default)]
    pub tax_type: TaxType,
    #[serde(default)]
    pub tax_rate_percent: f64,
}

impl LineItemInput {
    /// Coerces raw input into a line item.
    ///
    /// ## Coercion Rules
    /// - unparsable quantity → `1`
    /// - unparsable rate → `0`
    /// - untaxed line → tax rate `0`
    ///
    /// Coercion never fails; validation runs afterwards and rejects a zero rate.
    pub fn into_line_item(self) -> LineItem {
        let quantity = self
            .quantity
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite())
            .unwrap_or(1.0);
        let rate = Money::parse_decimal(&self.rate).unwrap_or_default();

        LineItem::new(
            self.description.trim(),
            quantity,
            rate,
            self.tax_type,
            TaxRate::from_percentage(self.tax_rate_percent),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gst(description: &str, qty: f64, rate_minor: i64, pct: u32) -> LineItem {
        LineItem::new(
            description,
            qty,
            Money::from_minor(rate_minor),
            TaxType::Gst,
            TaxRate::from_bps(pct * 100),
        )
    }

    fn igst(description: &str, qty: f64, rate_minor: i64, pct: u32) -> LineItem {
        LineItem::new(
            description,
            qty,
            Money::from_minor(rate_minor),
            TaxType::Igst,
            TaxRate::from_bps(pct * 100),
        )
    }

    fn untaxed(description: &str, qty: f64, rate_minor: i64) -> LineItem {
        LineItem::new(description, qty, Money::from_minor(rate_minor), TaxType::None, TaxRate::zero())
    }

    #[test]
    fn test_mixed_items_scenario() {
        // 2 × 100 at GST 18% plus 1 × 50 untaxed
        let items = vec![gst("Design", 2.0, 10000, 18), untaxed("Hosting", 1.0, 5000)];

        assert_eq!(subtotal(&items), Money::from_minor(25000));
        assert_eq!(total_tax(&items), Money::from_minor(3600));
        assert_eq!(grand_total(&items), Money::from_minor(28600));
    }

    #[test]
    fn test_item_math() {
        let item = gst("Hours", 1.5, 80000, 18);
        assert_eq!(item_total(&item), Money::from_minor(120000));
        assert_eq!(item_tax(&item), Money::from_minor(21600));
    }

    #[test]
    fn test_untaxed_item_never_taxed() {
        // Rate left behind on an untaxed line must not leak into tax
        let mut item = untaxed("Gift", 1.0, 10000);
        item.tax_rate_bps = 1800;

        assert_eq!(item_tax(&item), Money::zero());
        assert!(tax_breakdown(&[item.clone()]).is_empty());
        assert_eq!(total_tax(&[item]), Money::zero());
    }

    #[test]
    fn test_breakdown_groups_in_first_seen_order() {
        let items = vec![
            igst("Freight", 1.0, 10000, 5),
            gst("Design", 1.0, 10000, 18),
            igst("Packing", 2.0, 2500, 5),
            gst("Print", 1.0, 1000, 12),
        ];
        let breakdown = tax_breakdown(&items);

        assert_eq!(breakdown.labels(), vec!["IGST 5%", "GST 18%", "GST 12%"]);
        assert_eq!(breakdown.get("IGST 5%"), Some(Money::from_minor(750)));
        assert_eq!(breakdown.get("GST 18%"), Some(Money::from_minor(1800)));
        assert_eq!(breakdown.get("GST 12%"), Some(Money::from_minor(120)));
        assert_eq!(breakdown.get("GST 5%"), None);
    }

    #[test]
    fn test_breakdown_sums_to_total_tax() {
        let items = vec![
            gst("A", 3.0, 333, 18),
            gst("B", 7.0, 1999, 28),
            igst("C", 0.5, 12345, 12),
            gst("D", 1.0, 101, 5),
            untaxed("E", 4.0, 999),
        ];
        let totals = DocumentTotals::from_items(&items);

        assert_eq!(totals.tax_breakdown.total(), totals.tax);
        assert_eq!(totals.total, totals.subtotal + totals.tax);
        assert_eq!(totals.item_count, 5);
    }

    #[test]
    fn test_zero_rate_gst_appears_in_breakdown() {
        let items = vec![gst("Books", 1.0, 50000, 0)];
        let breakdown = tax_breakdown(&items);
        assert_eq!(breakdown.get("GST 0%"), Some(Money::zero()));
    }

    #[test]
    fn test_empty_document() {
        let totals = DocumentTotals::from_items(&[]);
        assert_eq!(totals.total, Money::zero());
        assert!(totals.tax_breakdown.is_empty());
    }

    #[test]
    fn test_input_coercion_fallbacks() {
        let input = LineItemInput {
            description: "  Logo design ".to_string(),
            quantity: "two".to_string(),
            rate: "".to_string(),
            tax_type: TaxType::Gst,
            tax_rate_percent: 18.0,
        };
        let item = input.into_line_item();

        assert_eq!(item.description, "Logo design");
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.rate, Money::zero());
        assert_eq!(item.tax_rate_bps, 1800);
    }

    #[test]
    fn test_input_coercion_untaxed_resets_rate() {
        let input = LineItemInput {
            description: "Support".to_string(),
            quantity: "3".to_string(),
            rate: "1,250.50".to_string(),
            tax_type: TaxType::None,
            tax_rate_percent: 18.0,
        };
        let item = input.into_line_item();

        assert_eq!(item.quantity, 3.0);
        assert_eq!(item.rate, Money::from_minor(125050));
        assert_eq!(item.tax_rate_bps, 0);
    }

    #[test]
    fn test_record_totals_fall_back_to_saved_total() {
        let saved = DocumentTotals::for_record(&[], Money::from_minor(50000));
        assert_eq!(saved.item_count, 0);
        assert_eq!(saved.subtotal, Money::from_minor(50000));
        assert_eq!(saved.tax, Money::zero());
        assert_eq!(saved.total, Money::from_minor(50000));
        assert!(saved.tax_breakdown.is_empty());

        let items = [gst("Design", 2.0, 10000, 18)];
        let computed = DocumentTotals::for_record(&items, Money::from_minor(1));
        assert_eq!(computed, DocumentTotals::from_items(&items));
    }

    #[test]
    fn test_breakdown_serializes_as_list() {
        let breakdown = tax_breakdown(&[gst("A", 1.0, 10000, 18)]);
        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(json, r#"[{"label":"GST 18%","amount":1800}]"#);
    }
}
