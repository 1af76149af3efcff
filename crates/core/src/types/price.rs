//! Type-safe price representation using decimal arithmetic.
//!
//! The backend transmits prices as plain numbers in the store's single
//! currency. Client-side arithmetic on them (line totals, display sums) uses
//! `Decimal` so that `180 × 2 + 80` is exactly `440`.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

/// A non-negative price in the store currency.
///
/// Arithmetic is checked: a product or sum that does not fit yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// Returns `None` for negative amounts.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero()).then_some(Self(amount))
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn checked_times(self, quantity: u64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).ok_or_else(|| de::Error::custom(format!("negative price: {amount}")))
    }
}

/// Formats as `$12.50`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}
