//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floating point amounts:                                           │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  An invoice whose tax breakdown does not add up to its total tax is    │
//! │  a support ticket.                                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise, cents)                       │
//! │    Every line item is rounded once, every sum is exact                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::money::Money;
//!
//! let rate = Money::from_major_minor(100, 0); // 100.00
//! let line = rate.multiply_quantity(2.0);
//! assert_eq!(line.to_decimal_string(), "200.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Minor units per major unit (100 paise to the rupee, 100 cents to the dollar).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that profit and balance figures can go negative.
/// Serializes as the bare integer count of minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor_units(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Parses a decimal amount typed into a form (`"1499.5"`, `"₹ 1,200"`).
    ///
    /// Currency symbols, spaces and thousands separators are ignored. Digits
    /// beyond the second decimal are rounded to the nearest minor unit.
    /// Returns `None` when no number can be read.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("1,499.5"), Some(Money::from_minor(149950)));
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// ```
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        let value: f64 = cleaned.parse().ok()?;
        if !value.is_finite() {
            return None;
        }

        Some(Money((value * MINOR_PER_MAJOR as f64).round() as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax at `rate`, rounding half-up to the minor unit.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::TaxRate;
    ///
    /// let line = Money::from_major_minor(200, 0);
    /// let tax = line.calculate_tax(TaxRate::from_percentage(18.0));
    /// assert_eq!(tax.to_decimal_string(), "36.00");
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large invoice lines from overflowing
        let tax_minor = (self.0 as i128 * rate.bps() as i128 + 5000).div_euclid(10000);
        Money::from_minor(tax_minor as i64)
    }

    /// Multiplies a unit rate by a (possibly fractional) quantity.
    ///
    /// Billable hours make `1.5 × 800.00` a normal line, so the product is
    /// rounded to the nearest minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let hourly = Money::from_major_minor(800, 0);
    /// assert_eq!(hourly.multiply_quantity(1.5).to_decimal_string(), "1200.00");
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: f64) -> Self {
        Money((self.0 as f64 * qty).round() as i64)
    }

    /// Divides evenly by `count`, rounding to the nearest minor unit.
    ///
    /// Returns zero when `count` is zero.
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money((self.0 as f64 / count as f64).round() as i64)
    }

    /// Returns `self / whole × 100`, or `0.0` when `whole` is zero.
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }

    /// Formats as a plain decimal with exactly two places (`-1234.50`).
    ///
    /// No currency symbol and no thousands separator; this is the form used
    /// by the CSV export.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }

    /// Formats with a currency symbol prefix (`₹1234.50`, `-$5.50`).
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
