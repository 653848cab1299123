//! Coupon definitions as the admin manages them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use maison_core::coupon::{CouponCode, CouponError, CouponRules};
use maison_core::{CouponId, DiscountKind, Price};

/// A stored coupon.
#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: CouponCode,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_total: Price,
    pub max_discount: Option<Price>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A complete coupon definition, as created or after a patch is applied.
///
/// The code is parsed (and upper-cased) during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CouponDraft {
    pub code: CouponCode,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_order_total: Price,
    pub max_discount: Option<Price>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl CouponDraft {
    /// Check value range, usage limit and validity window.
    ///
    /// # Errors
    ///
    /// Returns the first `CouponError` found.
    pub fn validate(&self) -> Result<(), CouponError> {
        CouponRules {
            kind: self.kind,
            value: self.value,
            min_order_total: self.min_order_total,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            used_count: 0,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
        }
        .validate()
    }
}

/// Partial update (`PATCH /api/coupons/{id}`). Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponPatch {
    pub code: Option<CouponCode>,
    pub kind: Option<DiscountKind>,
    pub value: Option<Decimal>,
    pub min_order_total: Option<Price>,
    pub max_discount: Option<Price>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl CouponPatch {
    /// The full definition that results from applying this patch.
    #[must_use]
    pub fn apply_to(self, current: &Coupon) -> CouponDraft {
        CouponDraft {
            code: self.code.unwrap_or_else(|| current.code.clone()),
            kind: self.kind.unwrap_or(current.kind),
            value: self.value.unwrap_or(current.value),
            min_order_total: self.min_order_total.unwrap_or(current.min_order_total),
            max_discount: self.max_discount.or(current.max_discount),
            usage_limit: self.usage_limit.or(current.usage_limit),
            starts_at: self.starts_at.or(current.starts_at),
            expires_at: self.expires_at.or(current.expires_at),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

/// What `DELETE /api/coupons/{id}` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRemoval {
    Deleted,
    /// The coupon had been used, so it was switched off instead.
    Deactivated,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn stored() -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(7),
            code: CouponCode::parse("WELCOME10").unwrap(),
            kind: DiscountKind::Percentage,
            value: dec("10"),
            min_order_total: Price::ZERO,
            max_discount: Some(Price::parse("500").unwrap()),
            usage_limit: Some(100),
            used_count: 3,
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_draft_parses_and_uppercases_code() {
        let draft: CouponDraft = serde_json::from_str(
            r#"{"code":"summer-25","kind":"flat","value":"250"}"#,
        )
        .unwrap();
        assert_eq!(draft.code.as_str(), "SUMMER-25");
        assert!(draft.is_active);
        assert_eq!(draft.min_order_total, Price::ZERO);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_bad_code() {
        let result: Result<CouponDraft, _> =
            serde_json::from_str(r#"{"code":"x!","kind":"flat","value":"10"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_percentage_over_hundred_rejected() {
        let patch = CouponPatch {
            value: Some(dec("120")),
            ..CouponPatch::default()
        };
        let merged = patch.apply_to(&stored());
        assert_eq!(merged.validate(), Err(CouponError::InvalidPercentage));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let patch = CouponPatch {
            value: Some(dec("15")),
            is_active: Some(false),
            ..CouponPatch::default()
        };
        let merged = patch.apply_to(&stored());
        assert_eq!(merged.code.as_str(), "WELCOME10");
        assert_eq!(merged.value, dec("15"));
        assert!(!merged.is_active);
        assert_eq!(merged.usage_limit, Some(100));
    }
}
