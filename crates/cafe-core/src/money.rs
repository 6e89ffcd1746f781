//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many restaurant systems:                                            │
//! │    AED 10.00 / 3 = AED 3.33 (×3 = AED 9.99)  → Lost a fils!            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Fils                                             │
//! │    1000 fils / 3 = 333 fils (×3 = 999 fils)                            │
//! │    We KNOW we lost 1 fils, and handle it explicitly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## VAT Handling
//! All menu prices are VAT-inclusive at a fixed 5%. The tax component is
//! *extracted* from a total, never added on top:
//!
//! ```text
//! vat = total − round(total / 1.05)
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::Money;
//!
//! // Create from fils (preferred)
//! let price = Money::from_cents(1000); // AED 10.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // AED 20.00
//! let vat = doubled.vat_component();             // AED 0.95
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (fils for AED).
///
/// ## Design Decisions
/// - **i64 (signed)**: Intermediate arithmetic may dip below zero before
///   a floor is applied (discount larger than the bill)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from fils (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents AED 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dirhams and fils).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in fils (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dirhams) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (fils) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Clamps the value at zero.
    ///
    /// Monetary floors in the billing flow never go negative: a discount
    /// larger than the bill comps the order to zero, it does not create a
    /// credit.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-500).floor_zero().cents(), 0);
    /// assert_eq!(Money::from_cents(500).floor_zero().cents(), 500);
    /// ```
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Extracts the 5% VAT component from a VAT-inclusive amount.
    ///
    /// ## Formula
    /// ```text
    /// pre_vat = round(total / 1.05)    (round half up, integer math)
    /// vat     = total − pre_vat
    /// ```
    ///
    /// ## Implementation
    /// `total / 1.05 = total * 100 / 105`; with round-half-up that becomes
    /// `(total * 200 + 105) / 210` in i128 to prevent overflow.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let total = Money::from_cents(2000); // AED 20.00, VAT-inclusive
    /// assert_eq!(total.vat_component().cents(), 95); // AED 0.95
    /// ```
    pub fn vat_component(&self) -> Money {
        let pre_vat = (self.0 as i128 * 200 + 105) / 210;
        Money(self.0 - pre_vat as i64)
    }

    /// Returns the amount net of the 5% VAT component.
    ///
    /// Used by the category sales sections of the day report, which list
    /// revenue before tax.
    pub fn net_of_vat(&self) -> Money {
        *self - self.vat_component()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is the receipt format: amounts print as `10.99`. The currency
/// label (`AED`) is part of the receipt layout, not the value.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_cents(-1).floor_zero().cents(), 0);
        assert_eq!(Money::from_cents(0).floor_zero().cents(), 0);
        assert_eq!(Money::from_cents(1).floor_zero().cents(), 1);
    }

    #[test]
    fn test_vat_component_on_round_total() {
        // AED 21.00 inclusive → pre-VAT 20.00, VAT 1.00
        let total = Money::from_cents(2100);
        assert_eq!(total.vat_component().cents(), 100);
        assert_eq!(total.net_of_vat().cents(), 2000);
    }

    #[test]
    fn test_vat_component_with_rounding() {
        // AED 20.00 inclusive → pre-VAT 19.05 (rounded), VAT 0.95
        let total = Money::from_cents(2000);
        assert_eq!(total.vat_component().cents(), 95);
    }

    #[test]
    fn test_vat_component_zero() {
        assert_eq!(Money::zero().vat_component().cents(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    /// AED 10.00 split three ways loses a fils; this documents the
    /// intentional precision behavior of integer money.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3);
        let reconstructed = one_third * 3;

        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
