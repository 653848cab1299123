//! Feature toggles over the curated product sections.
//!
//! One code path serves all eleven features; the feature decides which
//! section table and flag column are written.

use sqlx::PgPool;
use tracing::{info, instrument};

use maison_core::{ProductFeature, ProductId};

use crate::db::{RepositoryError, SectionRepository};
use crate::error::{AppError, Result};
use crate::models::{FeatureToggle, SectionEntry, ToggleAction};
use crate::services::revalidate::Revalidator;

pub struct SectionService<'a> {
    sections: SectionRepository<'a>,
    revalidator: &'a Revalidator,
}

impl<'a> SectionService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, revalidator: &'a Revalidator) -> Self {
        Self {
            sections: SectionRepository::new(pool),
            revalidator,
        }
    }

    /// Add a product to, or remove it from, a feature section, then ask the
    /// storefront to revalidate the product.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown product or, on remove, a product not in
    /// the section; `CONFLICT` when adding a product already in it.
    #[instrument(skip(self), fields(feature = %feature))]
    pub async fn toggle(
        &self,
        product_id: ProductId,
        feature: ProductFeature,
        action: ToggleAction,
    ) -> Result<FeatureToggle> {
        let result = match action {
            ToggleAction::Add => self.sections.add(feature, product_id).await,
            ToggleAction::Remove => self.sections.remove(feature, product_id).await,
        };

        let slug = result.map_err(|e| match (e, action) {
            (RepositoryError::NotFound, ToggleAction::Add) => {
                AppError::NotFound(format!("product {product_id} not found"))
            }
            (RepositoryError::NotFound, ToggleAction::Remove) => AppError::NotFound(format!(
                "product {product_id} is not in {feature}"
            )),
            (other, _) => other.into(),
        })?;

        info!(%product_id, ?action, "Feature toggled");
        self.revalidator.product(&slug).await;

        Ok(FeatureToggle {
            product_id,
            feature,
            active: action == ToggleAction::Add,
        })
    }

    /// Products currently in a section.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, feature: ProductFeature) -> Result<Vec<SectionEntry>> {
        Ok(self.sections.list(feature).await?)
    }
}
