//! # Money Module
//!
//! Integer minor-unit money for prices, line totals and sale totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A billing counter adds up many small prices:                           │
//! │                                                                         │
//! │    float:   5.50 × 3 + 0.10 + 0.20  = 16.800000000000001                │
//! │    cents:    550 × 3 +   10 +   20  = 1680  → "16.80"                   │
//! │                                                                         │
//! │  The ledger compares the caller's total against its own recomputation. │
//! │  That comparison is only meaningful with exact integer arithmetic.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmacare_core::money::Money;
//!
//! let paracetamol = Money::from_major_minor(5, 50);
//! let line = paracetamol.checked_times(2).unwrap();
//! assert_eq!(line.to_string(), "11.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in one whole (100%).
pub const BPS_SCALE: i128 = 10_000;

/// A monetary amount in minor units (hundredths of the currency unit).
///
/// Signed so that a discount can be expressed and subtracted; stored prices
/// are always positive (see [`crate::validation::validate_price_cents`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from minor units.
    ///
    /// ```rust
    /// use pharmacare_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1275).cents(), 1275); // 12.75
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates an amount from a whole part and a hundredths part.
    ///
    /// A negative `major` makes the whole amount negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Hundredths part, always 0..=99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Unit price × quantity, or `None` on overflow.
    ///
    /// ```rust
    /// use pharmacare_core::money::Money;
    ///
    /// let amoxicillin = Money::from_cents(1275);
    /// assert_eq!(amoxicillin.checked_times(4), Some(Money::from_cents(5100)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub const fn checked_times(&self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Checked addition, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// The share of this amount given by `bps` basis points, rounded half up.
    ///
    /// Used for both discounts (`1000` = 10% off) and tax.
    ///
    /// ```rust
    /// use pharmacare_core::money::Money;
    ///
    /// // 10% of 16.50 = 1.65
    /// assert_eq!(Money::from_cents(1650).portion_bps(1000).cents(), 165);
    /// // 8.25% of 10.00 = 0.825 → 0.83
    /// assert_eq!(Money::from_cents(1000).portion_bps(825).cents(), 83);
    /// ```
    pub fn portion_bps(&self, bps: u32) -> Money {
        // i128 keeps amount * bps from overflowing on large totals
        let portion = (self.0 as i128 * bps as i128 + BPS_SCALE / 2) / BPS_SCALE;
        Money(portion as i64)
    }

    /// Tax owed on this amount at `rate`.
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.portion_bps(rate.bps())
    }
}

/// Renders as `major.minor` without a currency symbol; screens add their own.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_minor_parts() {
        let money = Money::from_major_minor(12, 75);
        assert_eq!(money.cents(), 1275);
        assert_eq!(money.major(), 12);
        assert_eq!(money.minor(), 75);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
        assert_eq!(negative.minor(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1100).to_string(), "11.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_line_total_overflow_is_detected() {
        assert_eq!(
            Money::from_cents(550).checked_times(2),
            Some(Money::from_cents(1100))
        );
        assert!(Money::from_cents(i64::MAX / 2).checked_times(3).is_none());
        assert!(Money::from_cents(i64::MAX)
            .checked_add(Money::from_cents(1))
            .is_none());
    }

    #[test]
    fn test_portion_rounds_half_up() {
        // 5% of 0.10 = 0.005 → 0.01
        assert_eq!(Money::from_cents(10).portion_bps(500).cents(), 1);
        // 5% of 0.09 = 0.0045 → 0.00
        assert_eq!(Money::from_cents(9).portion_bps(500).cents(), 0);
        assert_eq!(Money::from_cents(2500).portion_bps(10_000).cents(), 2500);
        assert_eq!(Money::from_cents(2500).portion_bps(0).cents(), 0);
    }

    #[test]
    fn test_tax_uses_rate_bps() {
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_sum_of_lines() {
        let total: Money = [550, 1275, 20]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 1845);
    }
}
