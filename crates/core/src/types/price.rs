//! Type-safe price representation using decimal arithmetic.
//!
//! The backend serializes every monetary amount as a decimal string
//! (`"19.99"`), which preserves precision across the wire. In memory the
//! amount is a [`rust_decimal::Decimal`]; floating point never touches money.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in US dollars.
///
/// Serialized as a decimal string to match the backend's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The line total for `quantity` units at this unit price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with currency symbol, e.g. `$19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.line_total(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::from_cents(1999).display(), "$19.99");
        assert_eq!(Price::from_cents(500).display(), "$5.00");
        assert_eq!(Price::new(Decimal::new(5, 0)).display(), "$5.00");
    }

    #[test]
    fn test_line_total() {
        let unit = Price::from_cents(1250);
        assert_eq!(unit.line_total(3), Price::from_cents(3750));
        assert_eq!(unit * 3, Price::from_cents(3750));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_serde_decimal_string() {
        let price = Price::from_cents(1999);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"19.99\"");

        let parsed: Price = serde_json::from_str("\"7.50\"").unwrap();
        assert_eq!(parsed, Price::from_cents(750));
    }
}
