//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - slug: linen-overshirt
//!     name: Linen Overshirt
//!     brand: Maison
//!     category: men
//!     price: "2499.00"
//!     compare_at_price: "2999.00"
//!     variants:
//!       - { size: M, color: sand, sku: LO-M-SND, stock: 12 }
//! ```
//!
//! The file is validated completely before connecting. Products whose slug
//! already exists are skipped so the command can be rerun.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use maison_admin::db::{self, ProductRepository};
use maison_admin::models::import::{ImportProduct, ImportVariant, is_valid_slug, summarize};
use maison_core::env;
use maison_core::{Price, VariantSelector};

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub variants: Vec<SeedVariant>,
}

#[derive(Debug, Deserialize)]
pub struct SeedVariant {
    pub size: String,
    pub color: String,
    pub sku: String,
    #[serde(default)]
    pub stock: i32,
}

/// Validate every product, returning all problems at once.
///
/// `first_row` on the results is the product's 1-based position in the file.
pub fn validate(file: CatalogFile) -> Result<Vec<ImportProduct>, Vec<String>> {
    let mut errors = Vec::new();
    let mut slugs = HashSet::new();
    let mut skus = HashSet::new();
    let mut products = Vec::with_capacity(file.products.len());

    if file.products.is_empty() {
        errors.push("catalog has no products".to_string());
    }

    for (index, raw) in file.products.into_iter().enumerate() {
        let position = index + 1;
        let label = format!("product {position} ('{}')", raw.slug);
        let before = errors.len();

        if !is_valid_slug(&raw.slug) {
            errors.push(format!("{label}: invalid slug"));
        } else if !slugs.insert(raw.slug.clone()) {
            errors.push(format!("{label}: duplicate slug"));
        }
        for (field, value) in [
            ("name", &raw.name),
            ("brand", &raw.brand),
            ("category", &raw.category),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{label}: {field} is required"));
            }
        }

        let price = Price::parse(&raw.price)
            .map_err(|e| errors.push(format!("{label}: price: {e}")))
            .ok();
        let compare_at_price = match raw.compare_at_price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Price::parse(s)
                .map_err(|e| errors.push(format!("{label}: compare_at_price: {e}")))
                .ok(),
        };
        if let (Some(price), Some(compare)) = (price, compare_at_price)
            && compare < price
        {
            errors.push(format!("{label}: compare_at_price must not be below price"));
        }

        if raw.variants.is_empty() {
            errors.push(format!("{label}: needs at least one variant"));
        }
        let mut variants: Vec<ImportVariant> = Vec::with_capacity(raw.variants.len());
        for variant in raw.variants {
            let sku = variant.sku.trim().to_string();
            if sku.is_empty() {
                errors.push(format!("{label}: variant sku is required"));
            } else if !skus.insert(sku.clone()) {
                errors.push(format!("{label}: duplicate sku '{sku}'"));
            }
            if variant.stock < 0 {
                errors.push(format!("{label}: stock for '{sku}' is negative"));
            }
            match VariantSelector::new(&variant.size, &variant.color) {
                Ok(selector) if variants.iter().any(|v| v.variant == selector) => {
                    errors.push(format!("{label}: duplicate variant {selector}"));
                }
                Ok(selector) => variants.push(ImportVariant {
                    variant: selector,
                    sku,
                    stock: variant.stock,
                }),
                Err(e) => errors.push(format!("{label}: {e}")),
            }
        }

        if errors.len() > before {
            continue;
        }
        let Some(price) = price else { continue };
        products.push(ImportProduct {
            first_row: position,
            slug: raw.slug,
            name: raw.name.trim().to_string(),
            description: raw.description,
            brand: raw.brand.trim().to_string(),
            category: raw.category.trim().to_lowercase(),
            price,
            compare_at_price,
            variants,
        });
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails
/// validation, or the insert fails (including a SKU taken by an existing
/// product).
pub async fn catalog(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    env::load_dotenv();

    info!(path = %file_path.display(), "Loading catalog");
    let content = tokio::fs::read_to_string(file_path).await?;
    let file: CatalogFile = serde_yaml::from_str(&content)?;

    let products = match validate(file) {
        Ok(products) => products,
        Err(errors) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    let database_url = env::database_url("ADMIN_DATABASE_URL")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    let slugs: Vec<String> = products.iter().map(|p| p.slug.clone()).collect();
    let existing: HashSet<String> = repo.existing_slugs(&slugs).await?.into_iter().collect();
    let fresh: Vec<ImportProduct> = products
        .into_iter()
        .filter(|p| !existing.contains(&p.slug))
        .collect();

    if !fresh.is_empty() {
        repo.insert_batch(&fresh).await?;
    }

    let summary = summarize(&fresh);
    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.products);
    info!("  Variants inserted: {}", summary.variants);
    info!("  Products skipped (already exist): {}", existing.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Vec<ImportProduct>, Vec<String>> {
        validate(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_valid_catalog() {
        let products = parse(
            r#"
products:
  - slug: linen-overshirt
    name: Linen Overshirt
    brand: Maison
    category: Men
    price: "2499.00"
    compare_at_price: "2999.00"
    variants:
      - { size: m, color: Sand, sku: LO-M-SND, stock: 12 }
      - { size: l, color: sand, sku: LO-L-SND }
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(product.category, "men");
        assert_eq!(product.first_row, 1);
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].variant.size, "M");
        assert_eq!(product.variants[1].stock, 0);
    }

    #[test]
    fn test_collects_every_problem() {
        let errors = parse(
            r#"
products:
  - slug: Bad Slug
    name: ""
    brand: Maison
    category: women
    price: "10"
    compare_at_price: "5"
    variants: []
  - slug: tee
    name: Tee
    brand: Maison
    category: women
    price: "abc"
    variants:
      - { size: S, color: white, sku: T-1, stock: -1 }
      - { size: s, color: WHITE, sku: T-1 }
"#,
        )
        .unwrap_err();

        let joined = errors.join("\n");
        assert!(joined.contains("product 1 ('Bad Slug'): invalid slug"));
        assert!(joined.contains("name is required"));
        assert!(joined.contains("compare_at_price must not be below price"));
        assert!(joined.contains("needs at least one variant"));
        assert!(joined.contains("product 2 ('tee'): price"));
        assert!(joined.contains("stock for 'T-1' is negative"));
        assert!(joined.contains("duplicate sku 'T-1'"));
        assert!(joined.contains("duplicate variant"));
    }

    #[test]
    fn test_duplicate_slug_across_products() {
        let errors = parse(
            r#"
products:
  - { slug: tee, name: Tee, brand: M, category: men, price: "1", variants: [{ size: S, color: red, sku: A }] }
  - { slug: tee, name: Tee, brand: M, category: men, price: "1", variants: [{ size: M, color: red, sku: B }] }
"#,
        )
        .unwrap_err();
        assert_eq!(errors, vec!["product 2 ('tee'): duplicate slug".to_string()]);
    }

    #[test]
    fn test_empty_catalog() {
        let errors = parse("products: []").unwrap_err();
        assert_eq!(errors, vec!["catalog has no products".to_string()]);
    }
}
