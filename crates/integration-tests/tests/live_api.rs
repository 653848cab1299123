//! End-to-end checks against running servers.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`maison-cli migrate all`)
//! - The storefront and admin binaries running
//! - For the cart tests, an available product with one variant:
//!   `STOREFRONT_TEST_PRODUCT_ID`, `STOREFRONT_TEST_SIZE`, `STOREFRONT_TEST_COLOR`
//! - `CRON_SECRET` matching the admin's, for the cron test
//!
//! Run with: `cargo test -p maison-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use maison_integration_tests::{admin_base_url, storefront_base_url};

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

fn unique_email() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("shopper-{nanos}@maison.test")
}

/// Register a fresh shopper; the client keeps the session cookie.
async fn register(client: &Client) -> i64 {
    let base = storefront_base_url();
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": unique_email(), "password": "correct horse battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.unwrap();
    user["id"].as_i64().unwrap()
}

struct TestVariant {
    product_id: i64,
    size: String,
    color: String,
}

fn test_variant() -> TestVariant {
    TestVariant {
        product_id: std::env::var("STOREFRONT_TEST_PRODUCT_ID")
            .expect("STOREFRONT_TEST_PRODUCT_ID must be set")
            .parse()
            .unwrap(),
        size: std::env::var("STOREFRONT_TEST_SIZE").expect("STOREFRONT_TEST_SIZE must be set"),
        color: std::env::var("STOREFRONT_TEST_COLOR").expect("STOREFRONT_TEST_COLOR must be set"),
    }
}

async fn post(client: &Client, path: &str, body: Value) -> (StatusCode, Value) {
    let base = storefront_base_url();
    let resp = client
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn add_to_cart(
    client: &Client,
    user_id: i64,
    variant: &TestVariant,
    quantity: i32,
) -> (StatusCode, Value) {
    post(
        client,
        "/api/cart/add",
        json!({
            "user_id": user_id,
            "product_id": variant.product_id,
            "size": variant.size,
            "color": variant.color,
            "quantity": quantity,
        }),
    )
    .await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_health_endpoints() {
    let client = client();
    for base in [storefront_base_url(), admin_base_url()] {
        let resp = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "ok");
    }
}

// ============================================================================
// Storefront
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_requires_login() {
    let base = storefront_base_url();
    let resp = client()
        .get(format!("{base}/api/cart?user_id=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cannot_read_another_users_cart() {
    let client = client();
    let base = storefront_base_url();

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": unique_email(), "password": "correct horse battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.unwrap();
    let other = user["id"].as_i64().unwrap() + 1_000_000;

    let resp = client
        .get(format!("{base}/api/cart?user_id={other}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_not_found() {
    let base = storefront_base_url();
    let resp = client()
        .get(format!("{base}/api/products/no-such-product-anywhere"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
#[ignore = "Requires running storefront server, database and a test product"]
async fn test_add_same_variant_twice_increments() {
    let client = client();
    let user_id = register(&client).await;
    let variant = test_variant();

    let (status, _) = add_to_cart(&client, user_id, &variant, 2).await;
    assert_eq!(status, StatusCode::OK);
    let (status, cart) = add_to_cart(&client, user_id, &variant, 3).await;
    assert_eq!(status, StatusCode::OK);

    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);

    let (status, body) = add_to_cart(&client, user_id, &variant, 6).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
#[ignore = "Requires running storefront server, database and a test product"]
async fn test_move_to_wishlist_conflict_then_moves() {
    let client = client();
    let user_id = register(&client).await;
    let variant = test_variant();

    let (_, cart) = add_to_cart(&client, user_id, &variant, 1).await;
    let item_id = cart["items"][0]["id"].as_i64().unwrap();

    let (status, wishlist) = post(
        &client,
        "/api/wishlist/add",
        json!({ "user_id": user_id, "product_id": variant.product_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let wishlist_item = wishlist["items"][0]["id"].as_i64().unwrap();

    let move_body = json!({ "user_id": user_id, "item_id": item_id });
    let (status, body) = post(&client, "/api/cart/move-to-wishlist", move_body.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let base = storefront_base_url();
    let cart: Value = client
        .get(format!("{base}/api/cart?user_id={user_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (status, _) = post(
        &client,
        "/api/wishlist/remove",
        json!({ "user_id": user_id, "item_id": wishlist_item }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, moved) = post(&client, "/api/cart/move-to-wishlist", move_body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(moved["cart"]["items"].as_array().unwrap().is_empty());
    assert_eq!(moved["wishlist"]["items"][0]["product_id"], variant.product_id);
}

#[tokio::test]
#[ignore = "Requires running storefront server, database and a test product"]
async fn test_move_to_cart_respects_line_maximum() {
    let client = client();
    let user_id = register(&client).await;
    let variant = test_variant();

    let (status, _) = add_to_cart(&client, user_id, &variant, 9).await;
    assert_eq!(status, StatusCode::OK);
    let (_, wishlist) = post(
        &client,
        "/api/wishlist/add",
        json!({ "user_id": user_id, "product_id": variant.product_id }),
    )
    .await;
    let wishlist_item = wishlist["items"][0]["id"].as_i64().unwrap();

    let (status, body) = post(
        &client,
        "/api/wishlist/move-to-cart",
        json!({
            "user_id": user_id,
            "item_id": wishlist_item,
            "size": variant.size,
            "color": variant.color,
            "quantity": 5,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let base = storefront_base_url();
    let cart: Value = client
        .get(format!("{base}/api/cart?user_id={user_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["quantity"], 9);
    let wishlist: Value = client
        .get(format!("{base}/api/wishlist?user_id={user_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(wishlist["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server, database and a test product"]
async fn test_update_quantity_keeps_saved_line_inactive() {
    let client = client();
    let user_id = register(&client).await;
    let variant = test_variant();

    let (_, cart) = add_to_cart(&client, user_id, &variant, 1).await;
    let item_id = cart["items"][0]["id"].as_i64().unwrap();

    let (status, _) = post(
        &client,
        "/api/cart/set-status",
        json!({ "user_id": user_id, "item_id": item_id, "status": "inactive" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = post(
        &client,
        "/api/cart/update-quantity",
        json!({ "user_id": user_id, "item_id": item_id, "quantity": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 4);
    assert_eq!(cart["items"][0]["status"], "inactive");
    assert_eq!(cart["active_count"], 0);

    // Adding the same variant again brings the saved line back.
    let (_, cart) = add_to_cart(&client, user_id, &variant, 1).await;
    assert_eq!(cart["items"][0]["quantity"], 5);
    assert_eq!(cart["items"][0]["status"], "active");
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_cron_rejects_missing_token() {
    let base = admin_base_url();
    let resp = client()
        .post(format!("{base}/cron/shipments/poll"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server, database and carrier sandbox"]
async fn test_cron_poll_returns_summary() {
    let base = admin_base_url();
    let secret = std::env::var("CRON_SECRET").expect("CRON_SECRET must be set");
    let resp = client()
        .post(format!("{base}/cron/shipments/poll"))
        .bearer_auth(secret)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["checked"].is_u64());
    assert!(body["updated"].is_u64());
    assert!(body["skipped"].is_u64());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_api_requires_session() {
    let base = admin_base_url();
    let client = client();

    for path in ["/api/coupons", "/api/media", "/api/orders", "/api/sections/trending"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and a seeded admin account"]
async fn test_feature_toggle_round_trip() {
    let base = admin_base_url();
    let client = client();
    let email = std::env::var("ADMIN_TEST_EMAIL").expect("ADMIN_TEST_EMAIL must be set");
    let password = std::env::var("ADMIN_TEST_PASSWORD").expect("ADMIN_TEST_PASSWORD must be set");
    let product_id = std::env::var("ADMIN_TEST_PRODUCT_ID").unwrap_or_else(|_| "1".to_string());

    let resp = client
        .post(format!("{base}/auth/login"))
        .header("x-real-ip", "127.0.0.1")
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let url = format!("{base}/api/products/{product_id}/features/trending");
    // Start from a clean state; a 404 here just means it was not trending.
    let _ = client.delete(&url).send().await.unwrap();

    let added = client.post(&url).send().await.unwrap();
    assert_eq!(added.status(), StatusCode::OK);
    let again = client.post(&url).send().await.unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let removed = client.delete(&url).send().await.unwrap();
    assert_eq!(removed.status(), StatusCode::OK);
    let again = client.delete(&url).send().await.unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let bogus = client
        .post(format!("{base}/api/products/{product_id}/features/clearance"))
        .send()
        .await
        .unwrap();
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}
