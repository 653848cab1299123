//! Catalog writes from the CSV import.

use sqlx::PgPool;
use tracing::instrument;

use maison_core::ProductId;

use super::RepositoryError;
use crate::models::ImportProduct;

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Which of `slugs` are already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_slugs(&self, slugs: &[String]) -> Result<Vec<String>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT slug FROM shop.product WHERE slug = ANY($1)")
                .bind(slugs)
                .fetch_all(self.pool)
                .await?,
        )
    }

    /// Which of `skus` are already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_skus(&self, skus: &[String]) -> Result<Vec<String>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT sku FROM shop.product_variant WHERE sku = ANY($1)")
                .bind(skus)
                .fetch_all(self.pool)
                .await?,
        )
    }

    /// Insert every product and variant in one transaction.
    ///
    /// # Errors
    ///
    /// `Conflict` if a slug or SKU was taken concurrently; nothing is
    /// written in that case.
    #[instrument(skip(self, products), fields(products = products.len()))]
    pub async fn insert_batch(&self, products: &[ImportProduct]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            let product_id: ProductId = sqlx::query_scalar(
                r"
                INSERT INTO shop.product
                    (slug, name, description, brand, category, price, compare_at_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(&product.slug)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.brand)
            .bind(&product.category)
            .bind(product.price)
            .bind(product.compare_at_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::from_unique(e, &format!("slug '{}' already exists", product.slug))
            })?;

            for variant in &product.variants {
                sqlx::query(
                    r"
                    INSERT INTO shop.product_variant (product_id, size, color, sku, stock)
                    VALUES ($1, $2, $3, $4, $5)
                    ",
                )
                .bind(product_id)
                .bind(&variant.variant.size)
                .bind(&variant.variant.color)
                .bind(&variant.sku)
                .bind(variant.stock)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    RepositoryError::from_unique(e, &format!("sku '{}' already exists", variant.sku))
                })?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
