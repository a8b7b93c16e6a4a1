//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are non-negative two-decimal currency amounts. `rust_decimal`
//! avoids the float rounding drift a cart subtotal would otherwise
//! accumulate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("price must be non-negative, got {0}")]
    Negative(Decimal),
}

/// A non-negative price in the currency's standard unit (e.g., dollars).
///
/// Serialized transparently as its decimal amount, matching the wire shape
/// of the remote catalog service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// Create a price from an amount in the smallest currency unit (cents).
    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        Self(Decimal::new(cents as i64, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Add another price.
    #[must_use]
    pub fn plus(&self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).amount(), dec!(19.99));
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            Price::new(dec!(-0.01)),
            Err(PriceError::Negative(dec!(-0.01)))
        );
        assert!(Price::new(dec!(0)).is_ok());
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let price = Price::new(dec!(1.005)).unwrap();
        // Banker's rounding on the half-cent
        assert_eq!(price.amount(), dec!(1.00));
    }

    #[test]
    fn test_line_arithmetic() {
        let unit = Price::from_cents(500);
        assert_eq!(unit.times(3).amount(), dec!(15.00));
        assert_eq!(unit.plus(Price::from_cents(1)).amount(), dec!(5.01));
    }
}
