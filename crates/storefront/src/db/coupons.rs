//! Coupon lookups for checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use maison_core::coupon::{CouponCode, CouponRules};
use maison_core::{CouponId, DiscountKind, Price};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: CouponId,
    code: String,
    kind: DiscountKind,
    value: Decimal,
    min_order_total: Price,
    max_discount: Option<Price>,
    usage_limit: Option<i32>,
    used_count: i32,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
}

/// A stored coupon as checkout sees it.
#[derive(Debug, Clone)]
pub struct StoredCoupon {
    pub id: CouponId,
    pub code: String,
    pub rules: CouponRules,
}

impl From<CouponRow> for StoredCoupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            rules: CouponRules {
                kind: row.kind,
                value: row.value,
                min_order_total: row.min_order_total,
                max_discount: row.max_discount,
                usage_limit: row.usage_limit,
                used_count: row.used_count,
                starts_at: row.starts_at,
                expires_at: row.expires_at,
                is_active: row.is_active,
            },
        }
    }
}

pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by its normalized code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<StoredCoupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r"
            SELECT id, code, kind, value, min_order_total, max_discount,
                   usage_limit, used_count, starts_at, expires_at, is_active
            FROM shop.coupon
            WHERE code = $1
            ",
        )
        .bind(code.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(StoredCoupon::from))
    }
}
