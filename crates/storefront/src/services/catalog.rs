//! Catalog reads with a short-lived cache.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::cache::{CatalogKey, CatalogValue, ShopCache};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{ProductDetail, ProductFilter, ProductPage};

pub struct CatalogService<'a> {
    cache: &'a ShopCache,
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ShopCache) -> Self {
        Self {
            cache,
            products: ProductRepository::new(pool),
        }
    }

    /// One page of products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductFilter) -> Result<Arc<ProductPage>> {
        let filter = filter.normalized();
        let key = CatalogKey::Listing(filter.cache_key());
        if let Some(CatalogValue::Listing(page)) = self.cache.catalog(&key).await {
            debug!("Catalog listing cache hit");
            return Ok(page);
        }

        let page = Arc::new(self.products.list(&filter).await?);
        self.cache
            .put_catalog(key, CatalogValue::Listing(Arc::clone(&page)))
            .await;
        Ok(page)
    }

    /// Product detail with variants.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown slug.
    #[instrument(skip(self))]
    pub async fn detail(&self, slug: &str) -> Result<Arc<ProductDetail>> {
        let key = CatalogKey::Detail(slug.to_string());
        if let Some(CatalogValue::Detail(detail)) = self.cache.catalog(&key).await {
            return Ok(detail);
        }

        let detail = Arc::new(
            self.products
                .get_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?,
        );
        self.cache
            .put_catalog(key, CatalogValue::Detail(Arc::clone(&detail)))
            .await;
        Ok(detail)
    }
}
