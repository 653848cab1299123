//! CSV catalog import: parsing and validation.
//!
//! The file has one row per variant:
//!
//! ```text
//! slug,name,description,brand,category,price,compare_at_price,size,color,sku,stock
//! linen-shirt,Linen Shirt,Relaxed fit,Maison,men,2499.00,,M,white,LS-M-WHT,12
//! linen-shirt,Linen Shirt,Relaxed fit,Maison,men,2499.00,,L,white,LS-L-WHT,8
//! ```
//!
//! Rows sharing a slug become one product. Every problem is collected with
//! its line number; a file with any problem imports nothing.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde::{Deserialize, Serialize};

use maison_core::{Price, VariantSelector};

/// Expected header, in order.
pub const CSV_HEADER: [&str; 11] = [
    "slug",
    "name",
    "description",
    "brand",
    "category",
    "price",
    "compare_at_price",
    "size",
    "color",
    "sku",
    "stock",
];

/// A problem with one line of the file. Line 1 is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    slug: String,
    name: String,
    #[serde(default)]
    description: String,
    brand: String,
    category: String,
    price: String,
    #[serde(default)]
    compare_at_price: String,
    size: String,
    color: String,
    sku: String,
    stock: String,
}

/// A validated variant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportVariant {
    pub variant: VariantSelector,
    pub sku: String,
    pub stock: i32,
}

/// A validated product with its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProduct {
    /// Line of the first row for this slug, for error reporting.
    pub first_row: usize,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub variants: Vec<ImportVariant>,
}

/// Result of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub products: usize,
    pub variants: usize,
}

/// Whether `slug` is lower-case alphanumerics separated by single hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 120
        && slug
            .split('-')
            .all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
}

fn required<'a>(value: &'a str, field: &str, row: usize, errors: &mut Vec<RowError>) -> &'a str {
    if value.is_empty() {
        errors.push(RowError::new(row, format!("{field} is required")));
    }
    value
}

/// Parse and validate a catalog CSV.
///
/// # Errors
///
/// Returns every `RowError` found; an empty file or a wrong header is
/// reported against line 1.
pub fn parse_catalog_csv(input: impl Read) -> Result<Vec<ImportProduct>, Vec<RowError>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| vec![RowError::new(1, format!("unreadable header: {e}"))])?
        .clone();
    let found: Vec<&str> = headers.iter().collect();
    if found != CSV_HEADER {
        return Err(vec![RowError::new(
            1,
            format!("header must be: {}", CSV_HEADER.join(",")),
        )]);
    }

    let mut errors = Vec::new();
    let mut products: Vec<ImportProduct> = Vec::new();
    let mut by_slug: HashMap<String, usize> = HashMap::new();
    let mut skus: HashSet<String> = HashSet::new();

    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 2;
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                errors.push(RowError::new(row, format!("malformed row: {e}")));
                continue;
            }
        };
        let before = errors.len();

        let slug = required(&raw.slug, "slug", row, &mut errors);
        if !slug.is_empty() && !is_valid_slug(slug) {
            errors.push(RowError::new(row, format!("invalid slug '{slug}'")));
        }
        required(&raw.name, "name", row, &mut errors);
        required(&raw.brand, "brand", row, &mut errors);
        required(&raw.category, "category", row, &mut errors);
        let sku = required(&raw.sku, "sku", row, &mut errors);

        let price = Price::parse(&raw.price)
            .map_err(|e| errors.push(RowError::new(row, format!("price: {e}"))))
            .ok();
        let compare_at_price = if raw.compare_at_price.is_empty() {
            None
        } else {
            Price::parse(&raw.compare_at_price)
                .map_err(|e| errors.push(RowError::new(row, format!("compare_at_price: {e}"))))
                .ok()
        };
        if let (Some(price), Some(compare)) = (price, compare_at_price)
            && compare < price
        {
            errors.push(RowError::new(row, "compare_at_price must not be below price"));
        }
        let variant = VariantSelector::new(&raw.size, &raw.color)
            .map_err(|e| errors.push(RowError::new(row, e.to_string())))
            .ok();
        let stock = match raw.stock.parse::<i32>() {
            Ok(n) if n >= 0 => Some(n),
            _ => {
                errors.push(RowError::new(row, "stock must be a whole number >= 0"));
                None
            }
        };
        if !sku.is_empty() && !skus.insert(sku.to_string()) {
            errors.push(RowError::new(row, format!("duplicate sku '{sku}'")));
        }

        if errors.len() > before {
            continue;
        }
        let (Some(price), Some(variant), Some(stock)) = (price, variant, stock) else {
            continue;
        };

        let import_variant = ImportVariant {
            variant,
            sku: sku.to_string(),
            stock,
        };
        if let Some(&at) = by_slug.get(slug) {
            let Some(product) = products.get_mut(at) else {
                continue;
            };
            if product.name != raw.name
                || product.brand != raw.brand
                || product.category != raw.category.to_lowercase()
                || product.price != price
            {
                errors.push(RowError::new(
                    row,
                    format!(
                        "product fields differ from line {} for slug '{slug}'",
                        product.first_row
                    ),
                ));
                continue;
            }
            if product.variants.iter().any(|v| v.variant == import_variant.variant) {
                errors.push(RowError::new(
                    row,
                    format!("duplicate variant {} for slug '{slug}'", import_variant.variant),
                ));
                continue;
            }
            product.variants.push(import_variant);
        } else {
            by_slug.insert(slug.to_string(), products.len());
            products.push(ImportProduct {
                first_row: row,
                slug: slug.to_string(),
                name: raw.name,
                description: raw.description,
                brand: raw.brand,
                category: raw.category.to_lowercase(),
                price,
                compare_at_price,
                variants: vec![import_variant],
            });
        }
    }

    if products.is_empty() && errors.is_empty() {
        errors.push(RowError::new(1, "file has no data rows"));
    }
    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Count products and variants in a validated batch.
#[must_use]
pub fn summarize(products: &[ImportProduct]) -> ImportSummary {
    ImportSummary {
        products: products.len(),
        variants: products.iter().map(|p| p.variants.len()).sum(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const HEADER: &str = "slug,name,description,brand,category,price,compare_at_price,size,color,sku,stock\n";

    fn parse(body: &str) -> Result<Vec<ImportProduct>, Vec<RowError>> {
        parse_catalog_csv(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn test_rows_group_by_slug() {
        let products = parse(
            "linen-shirt,Linen Shirt,Relaxed,Maison,Men,2499.00,,M,white,LS-M,12\n\
             linen-shirt,Linen Shirt,Relaxed,Maison,Men,2499.00,,L,white,LS-L,8\n\
             silk-scarf,Silk Scarf,,Maison,accessories,999,1299,OS,red,SS-OS,3\n",
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].variants.len(), 2);
        assert_eq!(products[0].category, "men");
        assert_eq!(products[1].compare_at_price, Some(Price::parse("1299").unwrap()));
        assert_eq!(
            summarize(&products),
            ImportSummary {
                products: 2,
                variants: 3
            }
        );
    }

    #[test]
    fn test_errors_collected_with_line_numbers() {
        let errors = parse(
            "Bad Slug,Shirt,,Maison,men,10,,M,white,A1,1\n\
             ok-slug,Shirt,,Maison,men,abc,,M,white,A2,1\n\
             ok-two,Shirt,,Maison,men,10,,M,white,A2,-4\n",
        )
        .unwrap_err();

        let rows: Vec<usize> = errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3, 4, 4]);
        assert!(errors[0].message.contains("invalid slug"));
        assert!(errors[1].message.starts_with("price"));
    }

    #[test]
    fn test_conflicting_product_fields() {
        let errors = parse(
            "tee,Tee,,Maison,men,10,,M,white,T-M,1\n\
             tee,Tee,,Maison,men,12,,L,white,T-L,1\n",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 3);
        assert!(errors[0].message.contains("line 2"));
    }

    #[test]
    fn test_duplicate_variant() {
        let errors = parse(
            "tee,Tee,,Maison,men,10,,M,white,T-1,1\n\
             tee,Tee,,Maison,men,10,,m,WHITE,T-2,1\n",
        )
        .unwrap_err();
        assert!(errors[0].message.contains("duplicate variant"));
    }

    #[test]
    fn test_compare_at_below_price() {
        let errors = parse("tee,Tee,,Maison,men,10,5,M,white,T-1,1\n").unwrap_err();
        assert_eq!(errors[0].message, "compare_at_price must not be below price");
    }

    #[test]
    fn test_wrong_header() {
        let errors = parse_catalog_csv("slug,name\nx,y\n".as_bytes()).unwrap_err();
        assert_eq!(errors[0].row, 1);
    }

    #[test]
    fn test_empty_file() {
        let errors = parse("").unwrap_err();
        assert_eq!(errors[0].message, "file has no data rows");
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("linen-shirt-2"));
        assert!(!is_valid_slug("linen--shirt"));
        assert!(!is_valid_slug("-linen"));
        assert!(!is_valid_slug("Linen"));
    }
}
