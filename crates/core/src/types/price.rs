//! Type-safe price representation using decimal arithmetic.
//!
//! Monetary amounts are never represented as floats. A [`Price`] wraps a
//! `rust_decimal::Decimal` and enforces non-negativity at construction, so a
//! negative unit price is unrepresentable everywhere downstream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The supplied amount was negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit price in the shop's single currency.
///
/// Line totals are always derived via [`Price::times`]; they are never stored
/// alongside their inputs, so they cannot go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// A zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Derive a line total for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Format for display (e.g., "₹149.50").
    #[must_use]
    pub fn display(&self) -> String {
        format!("₹{:.2}", self.0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
