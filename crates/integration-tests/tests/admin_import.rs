//! CSV catalog import: parsing, grouping and catalog conflicts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashSet;

use maison_admin::error::AppError;
use maison_admin::models::import::{CSV_HEADER, parse_catalog_csv, summarize};
use maison_admin::models::{ImportSummary, RowError};
use maison_admin::services::import::catalog_conflicts;
use maison_integration_tests::price;

fn csv(rows: &[&str]) -> String {
    let mut out = CSV_HEADER.join(",");
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out
}

#[test]
fn test_rows_group_into_products() {
    let body = csv(&[
        "linen-overshirt,Linen Overshirt,Airy,Maison,Men,2499.00,2999.00,M,sand,LO-M-SND,12",
        "linen-overshirt,Linen Overshirt,Airy,Maison,men,2499.00,2999.00,L,sand,LO-L-SND,4",
        "silk-scarf,Silk Scarf,,Maison,accessories,1299,,OS,ivory,SS-OS-IVR,30",
    ]);

    let products = parse_catalog_csv(body.as_bytes()).unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].first_row, 2);
    assert_eq!(products[0].variants.len(), 2);
    assert_eq!(products[0].compare_at_price, Some(price("2999.00")));
    assert_eq!(products[1].first_row, 4);
    assert_eq!(products[1].compare_at_price, None);
    assert_eq!(
        summarize(&products),
        ImportSummary {
            products: 2,
            variants: 3
        }
    );
}

#[test]
fn test_every_bad_row_is_reported() {
    let body = csv(&[
        "Bad Slug,Tee,,Maison,men,10,,M,black,T-1,1",
        "tee,Tee,,Maison,men,-5,,M,black,T-2,1",
        "tee-2,Tee,,Maison,men,10,,M,black,T-3,many",
        "tee-3,Tee,,Maison,men,10,,M,black,T-3,1",
    ]);

    let errors = parse_catalog_csv(body.as_bytes()).unwrap_err();
    let rows: Vec<usize> = errors.iter().map(|e| e.row).collect();

    assert_eq!(rows, vec![2, 3, 4, 5]);
    assert!(errors[0].message.contains("invalid slug"));
    assert!(errors[1].message.starts_with("price"));
    assert!(errors[2].message.contains("stock"));
    assert!(errors[3].message.contains("duplicate sku 'T-3'"));
}

#[test]
fn test_wrong_header_is_line_one() {
    let errors = parse_catalog_csv("slug,name\nx,y".as_bytes()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, 1);
}

#[test]
fn test_conflicts_with_existing_catalog() {
    let body = csv(&[
        "linen-overshirt,Linen Overshirt,,Maison,men,2499,,M,sand,LO-M-SND,12",
        "linen-overshirt,Linen Overshirt,,Maison,men,2499,,L,sand,LO-L-SND,4",
        "silk-scarf,Silk Scarf,,Maison,accessories,1299,,OS,ivory,SS-OS-IVR,30",
    ]);
    let products = parse_catalog_csv(body.as_bytes()).unwrap();

    let taken_slugs: HashSet<String> = HashSet::from(["silk-scarf".to_string()]);
    let taken_skus: HashSet<String> = HashSet::from(["LO-L-SND".to_string()]);
    let conflicts = catalog_conflicts(&products, &taken_slugs, &taken_skus);

    assert_eq!(
        conflicts,
        vec![
            RowError {
                row: 2,
                message: "sku 'LO-L-SND' already exists".to_string()
            },
            RowError {
                row: 4,
                message: "slug 'silk-scarf' already exists".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_rejected_file_renders_row_errors() {
    use axum::response::IntoResponse;

    let response = AppError::Invalid(vec![RowError {
        row: 3,
        message: "price: price cannot be negative".to_string(),
    }])
    .into_response();

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["errors"][0]["row"], 3);
}
