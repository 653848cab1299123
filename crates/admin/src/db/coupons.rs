//! Coupon CRUD.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use maison_core::coupon::CouponCode;
use maison_core::{CouponId, DiscountKind, Price};

use super::RepositoryError;
use crate::models::{Coupon, CouponDraft, CouponRemoval};

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
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = RepositoryError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let code = CouponCode::parse(&row.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid coupon code in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            code,
            kind: row.kind,
            value: row.value,
            min_order_total: row.min_order_total,
            max_discount: row.max_discount,
            usage_limit: row.usage_limit,
            used_count: row.used_count,
            starts_at: row.starts_at,
            expires_at: row.expires_at,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, code, kind, value, min_order_total, max_discount, usage_limit, \
                       used_count, starts_at, expires_at, is_active, created_at, updated_at";

const DUPLICATE_CODE: &str = "a coupon with this code already exists";

pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COLUMNS} FROM shop.coupon ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COLUMNS} FROM shop.coupon WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a coupon.
    ///
    /// # Errors
    ///
    /// `Conflict` if the code is taken.
    #[instrument(skip(self, draft), fields(code = %draft.code))]
    pub async fn create(&self, draft: &CouponDraft) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "INSERT INTO shop.coupon
                (code, kind, value, min_order_total, max_discount, usage_limit,
                 starts_at, expires_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(draft.code.as_str())
        .bind(draft.kind)
        .bind(draft.value)
        .bind(draft.min_order_total)
        .bind(draft.max_discount)
        .bind(draft.usage_limit)
        .bind(draft.starts_at)
        .bind(draft.expires_at)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, DUPLICATE_CODE))?;

        row.try_into()
    }

    /// Replace a coupon's definition. Usage counters are untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `Conflict` if the new code is taken.
    #[instrument(skip(self, draft), fields(code = %draft.code))]
    pub async fn update(&self, id: CouponId, draft: &CouponDraft) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "UPDATE shop.coupon
             SET code = $2, kind = $3, value = $4, min_order_total = $5, max_discount = $6,
                 usage_limit = $7, starts_at = $8, expires_at = $9, is_active = $10,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(draft.code.as_str())
        .bind(draft.kind)
        .bind(draft.value)
        .bind(draft.min_order_total)
        .bind(draft.max_discount)
        .bind(draft.usage_limit)
        .bind(draft.starts_at)
        .bind(draft.expires_at)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, DUPLICATE_CODE))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a coupon, or deactivate it when orders reference it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CouponId) -> Result<CouponRemoval, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let used: bool = sqlx::query_scalar(
            r#"
            SELECT c.used_count > 0
                OR EXISTS (SELECT 1 FROM shop."order" o WHERE o.coupon_id = c.id)
            FROM shop.coupon c
            WHERE c.id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let removal = if used {
            sqlx::query(
                "UPDATE shop.coupon SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            CouponRemoval::Deactivated
        } else {
            sqlx::query("DELETE FROM shop.coupon WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            CouponRemoval::Deleted
        };

        tx.commit().await?;
        Ok(removal)
    }
}
