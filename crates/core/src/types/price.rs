//! Type-safe price representation using decimal arithmetic.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative amount in the store currency, kept at two decimal places.
///
/// The store trades in a single currency, so no currency code is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rounding half-up to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(round_money(amount)))
    }

    /// Parse a price from a string such as `"1299.00"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the string is not a decimal, or
    /// `PriceError::Negative` if it is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(s.to_string()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: i32) -> Self {
        Self(round_money(self.0 * Decimal::from(quantity.max(0))))
    }

    /// Sum of two prices.
    #[must_use]
    pub fn plus(&self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Difference of two prices, floored at zero.
    #[must_use]
    pub fn saturating_minus(&self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self(round_money(Decimal::ZERO))
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Round half-up to two decimal places.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let price = Price::parse("1299.5").unwrap();
        assert_eq!(price.to_string(), "1299.50");
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_rounds_half_up() {
        let price = Price::parse("10.005").unwrap();
        assert_eq!(price.to_string(), "10.01");
    }

    #[test]
    fn test_times_and_plus() {
        let price = Price::parse("499.99").unwrap();
        assert_eq!(price.times(3).to_string(), "1499.97");
        assert_eq!(price.plus(price).to_string(), "999.98");
    }

    #[test]
    fn test_saturating_minus() {
        let a = Price::parse("100").unwrap();
        let b = Price::parse("150").unwrap();
        assert_eq!(a.saturating_minus(b), Price::ZERO);
        assert_eq!(b.saturating_minus(a).to_string(), "50.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("25").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"25.00\"");
    }
}
