//! Coupon management.

use sqlx::PgPool;
use tracing::{info, instrument};

use maison_core::CouponId;

use crate::db::CouponRepository;
use crate::error::{AppError, Result};
use crate::models::{Coupon, CouponDraft, CouponPatch, CouponRemoval};

pub struct CouponService<'a> {
    coupons: CouponRepository<'a>,
}

impl<'a> CouponService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            coupons: CouponRepository::new(pool),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>> {
        Ok(self.coupons.list().await?)
    }

    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown id.
    pub async fn get(&self, id: CouponId) -> Result<Coupon> {
        self.coupons
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("coupon {id} not found")))
    }

    /// # Errors
    ///
    /// `BAD_REQUEST` for an invalid definition; `CONFLICT` for a taken code.
    #[instrument(skip(self, draft), fields(code = %draft.code))]
    pub async fn create(&self, draft: &CouponDraft) -> Result<Coupon> {
        draft.validate()?;
        let coupon = self.coupons.create(draft).await?;
        info!(coupon_id = %coupon.id, "Coupon created");
        Ok(coupon)
    }

    /// Apply a partial update. The merged definition is validated as a whole.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND`, `BAD_REQUEST` or `CONFLICT` as for create.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: CouponId, patch: CouponPatch) -> Result<Coupon> {
        let current = self.get(id).await?;
        let draft = patch.apply_to(&current);
        draft.validate()?;
        Ok(self.coupons.update(id, &draft).await?)
    }

    /// Delete an unused coupon; a used one is deactivated instead.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CouponId) -> Result<CouponRemoval> {
        let removal = self.coupons.delete(id).await?;
        info!(?removal, "Coupon removed");
        Ok(removal)
    }
}
