//! Coupon codes and discount arithmetic.
//!
//! Admin creates coupons; the storefront applies them at checkout. Both sides
//! use these rules so a coupon the admin accepts is one checkout can apply.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::round_money;
use crate::types::{DiscountKind, Price};

/// Errors produced when validating coupon definitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon code must be {min}-{max} characters of A-Z, 0-9, '-' or '_'")]
    InvalidCode { min: usize, max: usize },
    #[error("percentage discount must be greater than 0 and at most 100")]
    InvalidPercentage,
    #[error("flat discount must be greater than 0")]
    InvalidFlatAmount,
    #[error("usage limit must be at least 1")]
    InvalidUsageLimit,
    #[error("coupon must start before it expires")]
    InvalidWindow,
}

/// Reasons a valid coupon cannot be applied to a particular order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("coupon is not active")]
    Inactive,
    #[error("coupon is not valid yet")]
    NotStarted,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon usage limit reached")]
    Exhausted,
    #[error("order subtotal must be at least {0}")]
    BelowMinimum(Price),
}

/// A normalized coupon code (upper-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 32;

    /// Parse and upper-case a coupon code.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::InvalidCode` for codes outside the allowed
    /// length or alphabet.
    pub fn parse(s: &str) -> Result<Self, CouponError> {
        let code = s.trim().to_uppercase();
        let valid_len = (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&code.len());
        let valid_chars = code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_len || !valid_chars {
            return Err(CouponError::InvalidCode {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

/// The rules of a coupon, independent of where it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRules {
    pub kind: DiscountKind,
    /// Percentage (0, 100] or flat amount, depending on `kind`.
    pub value: Decimal,
    pub min_order_total: Price,
    /// Cap on a percentage discount.
    pub max_discount: Option<Price>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CouponRules {
    /// Validate the static definition of a coupon.
    ///
    /// # Errors
    ///
    /// Returns the first `CouponError` found.
    pub fn validate(&self) -> Result<(), CouponError> {
        match self.kind {
            DiscountKind::Percentage => {
                if self.value <= Decimal::ZERO || self.value > Decimal::ONE_HUNDRED {
                    return Err(CouponError::InvalidPercentage);
                }
            }
            DiscountKind::Flat => {
                if self.value <= Decimal::ZERO {
                    return Err(CouponError::InvalidFlatAmount);
                }
            }
        }
        if self.usage_limit.is_some_and(|limit| limit < 1) {
            return Err(CouponError::InvalidUsageLimit);
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.expires_at)
            && start >= end
        {
            return Err(CouponError::InvalidWindow);
        }
        Ok(())
    }

    /// Check whether the coupon can be applied at `now` to `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns the `CouponRejection` explaining why it cannot.
    pub fn check_applicable(
        &self,
        now: DateTime<Utc>,
        subtotal: Price,
    ) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if self.starts_at.is_some_and(|start| now < start) {
            return Err(CouponRejection::NotStarted);
        }
        if self.expires_at.is_some_and(|end| now >= end) {
            return Err(CouponRejection::Expired);
        }
        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return Err(CouponRejection::Exhausted);
        }
        if subtotal < self.min_order_total {
            return Err(CouponRejection::BelowMinimum(self.min_order_total));
        }
        Ok(())
    }

    /// Discount for `subtotal`, never more than the subtotal itself.
    #[must_use]
    pub fn discount_for(&self, subtotal: Price) -> Price {
        let raw = match self.kind {
            DiscountKind::Percentage => {
                let pct = round_money(subtotal.amount() * self.value / Decimal::ONE_HUNDRED);
                self.max_discount
                    .map_or(pct, |cap| pct.min(cap.amount()))
            }
            DiscountKind::Flat => self.value,
        };
        let capped = raw.min(subtotal.amount()).max(Decimal::ZERO);
        Price::new(capped).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn price(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    fn rules(kind: DiscountKind, value: &str) -> CouponRules {
        CouponRules {
            kind,
            value: value.parse().unwrap(),
            min_order_total: price("0"),
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_code_normalizes() {
        assert_eq!(CouponCode::parse(" summer-25 ").unwrap().as_str(), "SUMMER-25");
        assert!(CouponCode::parse("ab").is_err());
        assert!(CouponCode::parse("NO SPACES").is_err());
        assert!(CouponCode::parse(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_values() {
        assert!(rules(DiscountKind::Percentage, "25").validate().is_ok());
        assert_eq!(
            rules(DiscountKind::Percentage, "0").validate(),
            Err(CouponError::InvalidPercentage)
        );
        assert_eq!(
            rules(DiscountKind::Percentage, "101").validate(),
            Err(CouponError::InvalidPercentage)
        );
        assert_eq!(
            rules(DiscountKind::Flat, "-5").validate(),
            Err(CouponError::InvalidFlatAmount)
        );
    }

    #[test]
    fn test_validate_window() {
        let now = Utc::now();
        let mut coupon = rules(DiscountKind::Flat, "100");
        coupon.starts_at = Some(now);
        coupon.expires_at = Some(now - Duration::days(1));
        assert_eq!(coupon.validate(), Err(CouponError::InvalidWindow));
    }

    #[test]
    fn test_percentage_discount_with_cap() {
        let mut coupon = rules(DiscountKind::Percentage, "20");
        assert_eq!(coupon.discount_for(price("1000")), price("200"));

        coupon.max_discount = Some(price("150"));
        assert_eq!(coupon.discount_for(price("1000")), price("150"));
    }

    #[test]
    fn test_flat_discount_never_exceeds_subtotal() {
        let coupon = rules(DiscountKind::Flat, "500");
        assert_eq!(coupon.discount_for(price("300")), price("300"));
        assert_eq!(coupon.discount_for(price("800")), price("500"));
    }

    #[test]
    fn test_applicability() {
        let now = Utc::now();
        let mut coupon = rules(DiscountKind::Flat, "100");
        coupon.min_order_total = price("999");
        assert_eq!(
            coupon.check_applicable(now, price("500")),
            Err(CouponRejection::BelowMinimum(price("999")))
        );
        assert!(coupon.check_applicable(now, price("999")).is_ok());

        coupon.usage_limit = Some(2);
        coupon.used_count = 2;
        assert_eq!(
            coupon.check_applicable(now, price("1000")),
            Err(CouponRejection::Exhausted)
        );

        coupon.used_count = 0;
        coupon.expires_at = Some(now - Duration::minutes(1));
        assert_eq!(
            coupon.check_applicable(now, price("1000")),
            Err(CouponRejection::Expired)
        );

        coupon.expires_at = None;
        coupon.is_active = false;
        assert_eq!(
            coupon.check_applicable(now, price("1000")),
            Err(CouponRejection::Inactive)
        );
    }
}
