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
//! │  A day of sales summed as floats drifts by fractions of a cent,        │
//! │  and the "Total Sales" line stops matching the sum of the rows.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices are parsed from decimal text straight into cents.             │
//! │    Every total, profit and line amount is exact.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099);
//!
//! // Or parse operator input
//! let cost = Money::parse("6.5").unwrap();
//! assert_eq!(cost.cents(), 650);
//!
//! // Arithmetic is checked; overflow is `None`, never a wrapped total
//! let profit = price.checked_sub(cost).unwrap();
//! assert_eq!(profit.to_string(), "4.49");
//! assert!(Money::from_cents(i64::MAX).checked_add(price).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::MAX_PRICE_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Profit can be negative when selling below cost
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► CartLine.unit_price ──► CartLine.line_total
///                                                       │
///                                                       ▼
///                              Sale.total ──► Dashboard, CSV, Report
///
/// Product.cost_cents  ──► CartLine.unit_cost  ──► Sale.profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a non-negative decimal amount such as `"12"`, `"12.5"` or
    /// `"12.50"` into cents, without going through floating point.
    ///
    /// ## Rules
    /// - Leading/trailing whitespace is ignored
    /// - At most two fraction digits
    /// - Digits only (no sign, no thousands separators)
    /// - At most [`MAX_PRICE_CENTS`]
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::parse("250").unwrap().cents(), 25000);
    /// assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
    /// assert!(Money::parse("1.005").is_err());
    /// assert!(Money::parse("-3").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::required("amount"));
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ValidationError::invalid_format("amount", "no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                "amount",
                "must be a non-negative decimal number",
            ));
        }
        if fraction.len() > 2 {
            return Err(ValidationError::invalid_format(
                "amount",
                "at most 2 decimal places",
            ));
        }

        let overflow = || {
            ValidationError::invalid_format(
                "amount",
                format!("must be at most {}", Money(MAX_PRICE_CENTS)),
            )
        };

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        // "5" → 50 cents, "05" → 5 cents
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .filter(|cents| *cents <= MAX_PRICE_CENTS)
            .ok_or_else(overflow)?;
        Ok(Money(cents))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_mul(3).unwrap().cents(), 897);
    /// assert!(unit_price.checked_mul(i64::MAX).is_none());
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self - other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering (`"250.00"`, `"-5.50"`).
///
/// Currency symbols are a presentation concern and are added by the console
/// configuration.
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

// =============================================================================
// Unit Tests
// =============================================================================
