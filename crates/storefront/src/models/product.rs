//! Catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maison_core::{Price, ProductFeature, ProductId, VariantId};

/// A product as listed in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub is_available: bool,
    /// Sections the product is currently featured in.
    pub features: Vec<ProductFeature>,
    pub created_at: DateTime<Utc>,
}

/// One purchasable (size, color) combination of a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub size: String,
    pub color: String,
    pub sku: String,
    pub stock: i32,
}

/// Product detail with its variants.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Catalog listing filters (`GET /api/products`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub section: Option<ProductFeature>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductFilter {
    pub const DEFAULT_PER_PAGE: u32 = 24;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Trim text filters, drop empty ones, and clamp pagination.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            category: clean(self.category).map(|s| s.to_lowercase()),
            brand: clean(self.brand),
            section: self.section,
            q: clean(self.q),
            page: Some(self.page.unwrap_or(1).max(1)),
            per_page: Some(
                self.per_page
                    .unwrap_or(Self::DEFAULT_PER_PAGE)
                    .clamp(1, Self::MAX_PER_PAGE),
            ),
        }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    /// Row offset for the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.per_page())
    }

    /// Key used for the catalog listing cache.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}:{}:{}",
            self.category.as_deref().unwrap_or(""),
            self.brand.as_deref().unwrap_or(""),
            self.section.map_or("", ProductFeature::as_str),
            self.q.as_deref().unwrap_or(""),
            self.page(),
            self.per_page()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_pagination() {
        let filter = ProductFilter {
            page: Some(0),
            per_page: Some(500),
            ..ProductFilter::default()
        }
        .normalized();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.per_page(), 100);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_normalized_drops_blank_filters() {
        let filter = ProductFilter {
            category: Some("  Dresses ".to_string()),
            q: Some("   ".to_string()),
            ..ProductFilter::default()
        }
        .normalized();
        assert_eq!(filter.category.as_deref(), Some("dresses"));
        assert_eq!(filter.q, None);
    }

    #[test]
    fn test_offset() {
        let filter = ProductFilter {
            page: Some(3),
            per_page: Some(20),
            ..ProductFilter::default()
        };
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_cache_key_distinguishes_sections() {
        let a = ProductFilter {
            section: Some(ProductFeature::Trending),
            ..ProductFilter::default()
        };
        let b = ProductFilter::default();
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
