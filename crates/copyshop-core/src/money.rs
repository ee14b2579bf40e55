//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Rupiah has no minor unit in practice, so 1 unit = Rp 1.              │
//! │    Currencies with cents keep 2 decimals: 1099 = 10.99.                 │
//! │    Every sum, product and difference is exact.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use copyshop_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_minor(500);
//! let line = price * 2;
//! assert_eq!(line.minor(), 1000);
//!
//! let rupiah = CurrencyFormat::default();
//! assert_eq!(rupiah.format(Money::from_minor(1250000)), "Rp 1.250.000");
//! assert_eq!(rupiah.parse("price", "2.000").unwrap(), Money::from_minor(2000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================
//
// Operators saturate at the i64 bounds instead of wrapping. Amounts that get
// stored go through the checked_* methods.

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.display_price ──► CartLine.subtotal
///                                                   │
///                                                   ▼
/// Cart.total ──► Transaction.total_amount ──► change = payment − total
///                        │
///                        ▼
/// BalanceSheet.total_revenue − total_withdrawals = available balance
/// ```
///
/// Signed so that reconciled transactions can carry a negative change
/// (an amount still owed by the customer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use copyshop_core::money::Money;
    ///
    /// let price = Money::from_minor(2000);
    /// assert_eq!(price.minor(), 2000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use copyshop_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(500);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 1500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use copyshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(500).checked_multiply_quantity(2), Some(Money::from_minor(1000)));
    /// assert_eq!(Money::from_minor(500).checked_multiply_quantity(i64::MAX), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Sums amounts. `None` if any partial sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

/// Display uses the default (Rupiah) currency format.
///
/// ## Note
/// Screens and receipts format through the configured [`CurrencyFormat`];
/// this impl is for logs and error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CurrencyFormat::default().format(*self))
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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
// Currency Format
// =============================================================================

/// How amounts are written and read.
///
/// The default is Indonesian Rupiah: no decimals, `.` between thousands,
/// `Rp ` in front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Printed before the amount, including any spacing.
    pub symbol: String,

    /// Number of minor-unit digits (0 for Rupiah, 2 for USD/EUR).
    pub decimals: u8,

    pub thousands_separator: char,

    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "Rp ".to_string(),
            decimals: 0,
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

impl CurrencyFormat {
    /// Formats an amount with the currency symbol: `Rp 12.500`, `-Rp 500`.
    pub fn format(&self, money: Money) -> String {
        let sign = if money.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, self.symbol, self.digits(money))
    }

    /// Formats an amount without the symbol, for receipt columns: `12.500`.
    pub fn format_number(&self, money: Money) -> String {
        let sign = if money.is_negative() { "-" } else { "" };
        format!("{}{}", sign, self.digits(money))
    }

    /// Grouped absolute value.
    fn digits(&self, money: Money) -> String {
        let divisor = 10_u64.pow(self.decimals as u32);
        let abs = money.minor().unsigned_abs();
        let whole = (abs / divisor).to_string();
        let frac = abs % divisor;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }

        if self.decimals > 0 {
            format!(
                "{}{}{:0width$}",
                grouped,
                self.decimal_separator,
                frac,
                width = self.decimals as usize
            )
        } else {
            grouped
        }
    }

    /// Parses operator input into a non-negative amount.
    ///
    /// ## Rules
    /// - Leading currency symbol and surrounding whitespace are ignored
    /// - Thousands separators and `_` are ignored
    /// - At most `decimals` digits after the decimal separator
    /// - Negative amounts are rejected
    ///
    /// ## Example
    /// ```rust
    /// use copyshop_core::money::{CurrencyFormat, Money};
    ///
    /// let rupiah = CurrencyFormat::default();
    /// assert_eq!(rupiah.parse("payment", "Rp 50.000").unwrap(), Money::from_minor(50000));
    /// assert!(rupiah.parse("payment", "-5").is_err());
    /// assert!(rupiah.parse("payment", "abc").is_err());
    /// ```
    pub fn parse(&self, field: &str, text: &str) -> Result<Money, ValidationError> {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix(self.symbol.trim())
            .unwrap_or(trimmed)
            .trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }

        if trimmed.starts_with('-') {
            return Err(ValidationError::Negative {
                field: field.to_string(),
            });
        }

        let cleaned: String = trimmed
            .chars()
            .filter(|c| *c != self.thousands_separator && *c != '_')
            .collect();

        let (whole, frac) = match cleaned.split_once(self.decimal_separator) {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("not a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }
        if frac.len() > self.decimals as usize {
            return Err(invalid(&format!(
                "at most {} decimal places allowed",
                self.decimals
            )));
        }

        let too_large = || ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        };

        let scale = 10_i64.pow(self.decimals as u32);
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| too_large())?
        };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = self.decimals as usize);
            padded.parse().map_err(|_| too_large())?
        };

        whole_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .map(Money::from_minor)
            .ok_or_else(too_large)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
