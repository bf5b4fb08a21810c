//! # Money Module
//!
//! Provides the `Money` type for monetary values (prices, line subtotals,
//! sale totals).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │                                                                         │
//! │  Integer cents:                                                         │
//! │    10 + 20 = 30 cents, always                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use liquor_core::money::Money;
//!
//! let price = Money::from_cents(3499); // $34.99
//! let total = price.multiply_quantity(2) + Money::from_cents(500);
//! assert_eq!(total.cents(), 7498);
//! ```
//!
//! Amounts are bounded by validation (`MAX_AMOUNT_CENTS`, `MAX_LINE_QUANTITY`)
//! before any arithmetic runs on them, so plain `i64` operations cannot
//! overflow for validated input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that differences (declared total minus line sum) can be
/// represented directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use liquor_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ```rust
    /// use liquor_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2999);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 8997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display, e.g. `$34.99`. Clients format for their locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3499).to_string(), "$34.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_cents(i64::MIN).to_string(), "-$92233720368547758.08");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_sum_of_line_subtotals() {
        let lines = [Money::from_cents(8997), Money::from_cents(1250), Money::from_cents(3)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 10250);

        let empty: Money = std::iter::empty().sum();
        assert_eq!(empty, Money::zero());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(2599)).unwrap();
        assert_eq!(json, "2599");
    }
}
