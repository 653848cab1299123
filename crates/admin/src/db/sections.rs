//! Feature section membership.
//!
//! Every [`ProductFeature`] owns a section table and a flag column on
//! `shop.product`. Both are written in one transaction so the storefront
//! never sees a flag without its section row or the other way round. Table
//! and column names come from the `ProductFeature` lookup, never from input.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use maison_core::{ProductFeature, ProductId};

use super::RepositoryError;
use crate::models::SectionEntry;

#[derive(sqlx::FromRow)]
struct SectionRow {
    is_deleted: bool,
}

#[derive(sqlx::FromRow)]
struct SectionEntryRow {
    product_id: ProductId,
    slug: String,
    name: String,
    is_available: bool,
    added_at: DateTime<Utc>,
}

impl From<SectionEntryRow> for SectionEntry {
    fn from(row: SectionEntryRow) -> Self {
        Self {
            product_id: row.product_id,
            slug: row.slug,
            name: row.name,
            is_available: row.is_available,
            added_at: row.added_at,
        }
    }
}

pub struct SectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SectionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Put a product into a section.
    ///
    /// Restores a soft-deleted row when one exists. Returns the product slug
    /// for cache revalidation.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown product; `Conflict` if the product is
    /// already in the section.
    #[instrument(skip(self), fields(feature = %feature))]
    pub async fn add(
        &self,
        feature: ProductFeature,
        product_id: ProductId,
    ) -> Result<String, RepositoryError> {
        let table = feature.section_table();
        let column = feature.flag_column();
        let mut tx = self.pool.begin().await?;

        let slug: String =
            sqlx::query_scalar("SELECT slug FROM shop.product WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let existing = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT is_deleted FROM {table} WHERE product_id = $1 FOR UPDATE"
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(SectionRow { is_deleted: false }) => {
                return Err(RepositoryError::Conflict(format!(
                    "product is already in {feature}"
                )));
            }
            Some(SectionRow { is_deleted: true }) => {
                sqlx::query(&format!(
                    "UPDATE {table}
                     SET is_deleted = FALSE, deleted_at = NULL, created_at = NOW()
                     WHERE product_id = $1"
                ))
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(&format!("INSERT INTO {table} (product_id) VALUES ($1)"))
                    .bind(product_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        RepositoryError::from_unique(e, &format!("product is already in {feature}"))
                    })?;
            }
        }

        sqlx::query(&format!(
            "UPDATE shop.product SET {column} = TRUE, updated_at = NOW() WHERE id = $1"
        ))
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slug)
    }

    /// Take a product out of a section by soft-deleting its row.
    ///
    /// Returns the product slug for cache revalidation.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown product or when the product has no active
    /// row in the section.
    #[instrument(skip(self), fields(feature = %feature))]
    pub async fn remove(
        &self,
        feature: ProductFeature,
        product_id: ProductId,
    ) -> Result<String, RepositoryError> {
        let table = feature.section_table();
        let column = feature.flag_column();
        let mut tx = self.pool.begin().await?;

        let slug: String =
            sqlx::query_scalar("SELECT slug FROM shop.product WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let removed = sqlx::query(&format!(
            "UPDATE {table}
             SET is_deleted = TRUE, deleted_at = NOW()
             WHERE product_id = $1 AND NOT is_deleted"
        ))
        .bind(product_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(&format!(
            "UPDATE shop.product SET {column} = FALSE, updated_at = NOW() WHERE id = $1"
        ))
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slug)
    }

    /// Products currently in a section, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, feature: ProductFeature) -> Result<Vec<SectionEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, SectionEntryRow>(&format!(
            "SELECT p.id AS product_id, p.slug, p.name, p.is_available, s.created_at AS added_at
             FROM {} s
             JOIN shop.product p ON p.id = s.product_id
             WHERE NOT s.is_deleted
             ORDER BY s.created_at DESC",
            feature.section_table()
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
