//! Catalog reads.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use maison_core::{Price, ProductFeature, ProductId, VariantId, VariantSelector};

use super::RepositoryError;
use crate::models::{Product, ProductDetail, ProductFilter, ProductPage, ProductVariant};

/// `ARRAY_REMOVE(ARRAY[CASE WHEN is_x THEN 'x' END, ...], NULL)` over every
/// feature flag, so a row carries the names of its active sections.
static FEATURES_EXPR: LazyLock<String> = LazyLock::new(|| {
    let cases: Vec<String> = ProductFeature::ALL
        .iter()
        .map(|f| format!("CASE WHEN p.{} THEN '{}' END", f.flag_column(), f.as_str()))
        .collect();
    format!("ARRAY_REMOVE(ARRAY[{}], NULL) AS features", cases.join(", "))
});

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    name: String,
    description: String,
    brand: String,
    category: String,
    price: Price,
    compare_at_price: Option<Price>,
    is_available: bool,
    features: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            brand: row.brand,
            category: row.category,
            price: row.price,
            compare_at_price: row.compare_at_price,
            is_available: row.is_available,
            features: row
                .features
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect(),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: VariantId,
    size: String,
    color: String,
    sku: String,
    stock: i32,
}

/// Minimal product facts needed to validate a cart or wishlist mutation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductAvailability {
    pub id: ProductId,
    pub name: String,
    pub is_available: bool,
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE TRUE");
    if let Some(category) = &filter.category {
        builder.push(" AND LOWER(p.category) = ").push_bind(category.clone());
    }
    if let Some(brand) = &filter.brand {
        builder.push(" AND p.brand ILIKE ").push_bind(brand.clone());
    }
    if let Some(section) = filter.section {
        // Column comes from a fixed table of identifiers, never from input.
        builder.push(format!(" AND p.{}", section.flag_column()));
    }
    if let Some(q) = &filter.q {
        builder
            .push(" AND p.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(q)));
    }
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching a (normalized) filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<ProductPage, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shop.product p");
        push_filters(&mut count, filter);
        let (total,): (i64,) = count.build_query_as().fetch_one(self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT p.id, p.slug, p.name, p.description, p.brand, p.category, p.price, \
             p.compare_at_price, p.is_available, {}, p.created_at FROM shop.product p",
            *FEATURES_EXPR
        ));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(i64::from(filter.per_page()))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows: Vec<ProductRow> = select.build_query_as().fetch_all(self.pool).await?;

        Ok(ProductPage {
            items: rows.into_iter().map(Product::from).collect(),
            page: filter.page(),
            per_page: filter.per_page(),
            total,
        })
    }

    /// Get a product and its variants by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!(
            "SELECT p.id, p.slug, p.name, p.description, p.brand, p.category, p.price, \
             p.compare_at_price, p.is_available, {}, p.created_at \
             FROM shop.product p WHERE p.slug = $1",
            *FEATURES_EXPR
        );
        let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT id, size, color, sku, stock
            FROM shop.product_variant
            WHERE product_id = $1
            ORDER BY size, color
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|v| ProductVariant {
            id: v.id,
            size: v.size,
            color: v.color,
            sku: v.sku,
            stock: v.stock,
        })
        .collect();

        Ok(Some(ProductDetail {
            product: Product::from(row),
            variants,
        }))
    }

    /// Fetch availability facts for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn availability(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductAvailability>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductAvailability>(
            "SELECT id, name, is_available FROM shop.product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Whether the product offers the (size, color) combination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_variant(
        &self,
        id: ProductId,
        variant: &VariantSelector,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS (
                SELECT 1 FROM shop.product_variant
                WHERE product_id = $1 AND UPPER(size) = $2 AND LOWER(color) = $3
            )
            ",
        )
        .bind(id)
        .bind(&variant.size)
        .bind(&variant.color)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_expr_covers_every_flag() {
        for feature in ProductFeature::ALL {
            assert!(FEATURES_EXPR.contains(feature.flag_column()));
            assert!(FEATURES_EXPR.contains(&format!("'{}'", feature.as_str())));
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("linen"), "linen");
    }

    #[test]
    fn test_filters_bind_user_text() {
        let filter = ProductFilter {
            q: Some("x'; DROP TABLE shop.product; --".to_string()),
            section: Some(ProductFeature::SalePicks),
            ..ProductFilter::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM shop.product p");
        push_filters(&mut builder, &filter);
        let sql = builder.sql();
        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("p.is_sale_pick"));
    }
}
