//! Amount type for handling currency values.
//!
//! This module provides the `Amount` type which wraps `Decimal` at two decimal places and handles
//! parsing values that may or may not include a currency symbol and thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// The currency symbol used when none is configured.
pub const DEFAULT_CURRENCY: &str = "R$";

/// The largest amount accepted, in whole currency units. Totals over any realistic number of rows
/// stay far inside the range of `Decimal`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Represents a non-negative amount of money with two decimal places.
///
/// The value is rounded to cents when parsed or constructed, so equality is plain value
/// equality.
///
/// # Examples
///
/// ```
/// # use caixa::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("R$ 1,234.5").unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// assert_eq!(amount.currency("R$"), "R$ 1,234.50");
/// ```
///
/// Negative values and empty text are not amounts:
/// ```
/// # use caixa::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5.00").is_err());
/// assert!(Amount::from_str("  ").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, 2));

    /// Creates a new `Amount`, rounding to cents. Returns `None` for negative values and values
    /// above `MAX_AMOUNT`.
    pub fn new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        if value > Decimal::from(MAX_AMOUNT) {
            return None;
        }
        if value.is_zero() {
            return Some(Self::ZERO);
        }
        Some(Self(to_cents(value)))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount for display, e.g. `R$ 1,234.50`.
    pub fn currency(&self, symbol: &str) -> String {
        currency(self.0, symbol)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Formats any decimal (a balance may be negative) with a currency symbol and thousands
/// separators, e.g. `-R$ 60,000.00`.
pub fn currency(value: Decimal, symbol: &str) -> String {
    let value = to_cents(value);
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let num = format_num::format_num!(",.2", value.abs().to_f64().unwrap_or_default());
    format!("{sign}{symbol} {num}")
}

fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountError {
    Empty,
    Negative(String),
    TooLarge(String),
    Invalid(String, rust_decimal::Error),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("An amount cannot be empty"),
            AmountError::Negative(s) => write!(f, "Amounts cannot be negative, got '{s}'"),
            AmountError::TooLarge(s) => {
                write!(f, "Amounts cannot be greater than {MAX_AMOUNT}, got '{s}'")
            }
            AmountError::Invalid(s, e) => write!(f, "Invalid amount '{s}': {e}"),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Remove the currency symbol if present, e.g. "R$ 50.00" or "-R$50.00"
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let without_symbol = unsigned
            .strip_prefix(DEFAULT_CURRENCY)
            .unwrap_or(unsigned)
            .trim_start();
        if negative || without_symbol.starts_with('-') {
            return Err(AmountError::Negative(trimmed.to_string()));
        }

        // Remove commas (thousand separators)
        let without_commas = without_symbol.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .map_err(|e| AmountError::Invalid(trimmed.to_string(), e))?;
        if value > Decimal::from(MAX_AMOUNT) {
            return Err(AmountError::TooLarge(trimmed.to_string()));
        }

        Amount::new(value).ok_or_else(|| AmountError::Negative(trimmed.to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
