//! CSV catalog import.
//!
//! All or nothing: the file is validated in full, then checked against the
//! catalog for taken slugs and SKUs, and only a file with no problems at
//! all is written, in one transaction.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::import::{parse_catalog_csv, summarize};
use crate::models::{ImportProduct, ImportSummary, RowError};
use crate::services::revalidate::Revalidator;

/// Row errors for products whose slug or SKUs already exist.
#[must_use]
pub fn catalog_conflicts(
    products: &[ImportProduct],
    taken_slugs: &HashSet<String>,
    taken_skus: &HashSet<String>,
) -> Vec<RowError> {
    let mut errors = Vec::new();
    for product in products {
        if taken_slugs.contains(&product.slug) {
            errors.push(RowError {
                row: product.first_row,
                message: format!("slug '{}' already exists", product.slug),
            });
        }
        for variant in &product.variants {
            if taken_skus.contains(&variant.sku) {
                errors.push(RowError {
                    row: product.first_row,
                    message: format!("sku '{}' already exists", variant.sku),
                });
            }
        }
    }
    errors
}

pub struct ImportService<'a> {
    products: ProductRepository<'a>,
    revalidator: &'a Revalidator,
}

impl<'a> ImportService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, revalidator: &'a Revalidator) -> Self {
        Self {
            products: ProductRepository::new(pool),
            revalidator,
        }
    }

    /// Validate and import a catalog CSV.
    ///
    /// # Errors
    ///
    /// `AppError::Invalid` with every row problem when anything is wrong;
    /// nothing is written in that case.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn import_csv(&self, body: &[u8]) -> Result<ImportSummary> {
        let products = parse_catalog_csv(body).map_err(AppError::Invalid)?;

        let slugs: Vec<String> = products.iter().map(|p| p.slug.clone()).collect();
        let skus: Vec<String> = products
            .iter()
            .flat_map(|p| p.variants.iter().map(|v| v.sku.clone()))
            .collect();
        let taken_slugs: HashSet<String> =
            self.products.existing_slugs(&slugs).await?.into_iter().collect();
        let taken_skus: HashSet<String> =
            self.products.existing_skus(&skus).await?.into_iter().collect();

        let conflicts = catalog_conflicts(&products, &taken_slugs, &taken_skus);
        if !conflicts.is_empty() {
            warn!(problems = conflicts.len(), "Import rejected: catalog conflicts");
            return Err(AppError::Invalid(conflicts));
        }

        match self.products.insert_batch(&products).await {
            Ok(()) => {}
            // Lost a race with another writer after the conflict check.
            Err(RepositoryError::Conflict(message)) => {
                let row = products.first().map_or(2, |p| p.first_row);
                return Err(AppError::Invalid(vec![RowError { row, message }]));
            }
            Err(other) => return Err(other.into()),
        }

        let summary = summarize(&products);
        info!(
            products = summary.products,
            variants = summary.variants,
            "Catalog imported"
        );
        self.revalidator.catalog().await;
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parsed() -> Vec<ImportProduct> {
        let csv = "slug,name,description,brand,category,price,compare_at_price,size,color,sku,stock\n\
                   linen-shirt,Linen Shirt,,Maison,men,2499,,M,white,LS-M-W,4\n\
                   wool-coat,Wool Coat,,Maison,women,8999,,S,camel,WC-S-C,2\n";
        parse_catalog_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_taken_slug_and_sku_reported_per_product() {
        let products = parsed();
        let slugs = HashSet::from(["wool-coat".to_string()]);
        let skus = HashSet::from(["LS-M-W".to_string()]);

        let errors = catalog_conflicts(&products, &slugs, &skus);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.row == 2 && e.message.contains("LS-M-W")));
        assert!(errors.iter().any(|e| e.row == 3 && e.message.contains("wool-coat")));
    }

    #[test]
    fn test_no_conflicts() {
        assert!(catalog_conflicts(&parsed(), &HashSet::new(), &HashSet::new()).is_empty());
    }
}
