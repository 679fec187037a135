//! # Money
//!
//! Prices, bundle sums and order totals as whole minor units.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $249.90 MXN  ──►  Money(24990)                                         │
//! │                                                                         │
//! │  Sum and discount arithmetic stays in centavos. Only SUM_WITH_DISCOUNT  │
//! │  rounds, once, to the nearest whole peso (half up).                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mercado_core::money::Money;
//!
//! let price = Money::from_major_minor(249, 90);
//! let line = price * 2;
//! assert_eq!(line.minor_units(), 49980);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Minor units in one major currency unit.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// The currency itself travels next to the amount (see
/// [`Pricing::currency`](crate::types::Pricing)); `Money` only carries the
/// magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use mercado_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor_units(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major_part(&self) -> i64 {
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

    /// Line total for `qty` units, saturating at the i64 bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Line total for `qty` units, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    /// Applies a discount in basis points and rounds the result to the
    /// nearest whole major unit, half up, never below zero.
    ///
    /// ## Example
    /// ```rust
    /// use mercado_core::money::Money;
    ///
    /// // 300.00 at 25% off = 225.00
    /// let sum = Money::from_major(300);
    /// assert_eq!(sum.discounted_to_whole_major(2500), Money::from_major(225));
    ///
    /// // 99.90 at 10% off = 89.91, rounds to 90.00
    /// let sum = Money::from_major_minor(99, 90);
    /// assert_eq!(sum.discounted_to_whole_major(1000), Money::from_major(90));
    /// ```
    pub fn discounted_to_whole_major(&self, discount_bps: u32) -> Money {
        let keep_bps = 10_000_i128 - i128::from(discount_bps.min(10_000));
        let scaled = i128::from(self.0) * keep_bps;
        let per_major = 10_000_i128 * i128::from(MINOR_PER_MAJOR);
        // floor(x + 0.5) in major units
        let major = (scaled + per_major / 2).div_euclid(per_major);
        Money::from_major(major.max(0) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering; collaborators own localised display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.major_part().abs(),
            self.minor_part()
        )
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Saturates instead of wrapping; order and cart totals are display values.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_and_parts() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor_units(), 1099);
        assert_eq!(money.major_part(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor_units(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor_units(), -550);
        assert_eq!(Money::from_major(3).minor_units(), 300);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_checked_multiply_detects_overflow() {
        let price = Money::from_minor(i64::MAX / 2);
        assert_eq!(price.checked_multiply_quantity(2), Some(Money::from_minor(i64::MAX - 1)));
        assert_eq!(price.checked_multiply_quantity(3), None);
        assert_eq!(price.checked_add(price).and_then(|m| m.checked_add(price)), None);
        assert_eq!(price.multiply_quantity(3), Money::from_minor(i64::MAX));

        let total: Money = vec![price, price, price].into_iter().sum();
        assert_eq!(total, Money::from_minor(i64::MAX));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);
        assert_eq!((a + b).minor_units(), 1500);
        assert_eq!((a - b).minor_units(), 500);
        assert_eq!((a * 3).minor_units(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor_units(), 2000);
    }

    #[test]
    fn test_discount_rounds_to_whole_major_unit() {
        assert_eq!(
            Money::from_major(300).discounted_to_whole_major(2500),
            Money::from_major(225)
        );
        // 10.00 at 33% = 6.70 -> 7.00
        assert_eq!(
            Money::from_major(10).discounted_to_whole_major(3300),
            Money::from_major(7)
        );
        // 10.00 at 35% = 6.50 -> 7.00 (half up)
        assert_eq!(
            Money::from_major(10).discounted_to_whole_major(3500),
            Money::from_major(7)
        );
    }

    #[test]
    fn test_discount_bounds() {
        let sum = Money::from_major(80);
        assert_eq!(sum.discounted_to_whole_major(0), sum);
        assert_eq!(sum.discounted_to_whole_major(10_000), Money::zero());
        // Out of range discount saturates at 100%
        assert_eq!(sum.discounted_to_whole_major(50_000), Money::zero());
        // Negative inputs never produce a negative price
        assert_eq!(Money::from_major(-5).discounted_to_whole_major(0), Money::zero());
    }
}
