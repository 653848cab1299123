//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (pings the database)
//!
//! # Auth (strict rate limit)
//! POST /auth/register                - Create an account and sign in
//! POST /auth/login                   - Sign in
//! POST /auth/logout                  - Sign out
//!
//! # Catalog
//! GET  /api/products                 - Listing (category, brand, section, q, page, per_page)
//! GET  /api/products/{slug}          - Detail with variants
//!
//! # Profile (requires auth)
//! GET  /api/users/me
//! PATCH /api/users/me
//!
//! # Cart (requires auth, body or query carries user_id)
//! GET  /api/cart?user_id=
//! POST /api/cart/add
//! POST /api/cart/update-quantity
//! POST /api/cart/set-status
//! POST /api/cart/remove
//! POST /api/cart/remove-many
//! POST /api/cart/clear
//! POST /api/cart/move-to-wishlist
//!
//! # Wishlist (requires auth)
//! GET  /api/wishlist?user_id=
//! POST /api/wishlist/add
//! POST /api/wishlist/remove
//! POST /api/wishlist/move-to-cart
//!
//! # Addresses (requires auth)
//! GET    /api/addresses?user_id=
//! POST   /api/addresses
//! PUT    /api/addresses/{id}
//! POST   /api/addresses/{id}/primary
//! DELETE /api/addresses/{id}?user_id=
//!
//! # Orders (requires auth)
//! POST /api/checkout
//! GET  /api/orders
//! GET  /api/orders/{id}
//! POST /api/orders/{id}/cancel
//! POST /api/orders/{id}/payment
//!
//! # Internal (bearer REVALIDATE_SECRET)
//! POST /internal/revalidate
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod internal;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use maison_core::UserId;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// The user a request claims to act for. Checked against the session.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserScope {
    pub user_id: UserId,
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list))
        .route("/add", post(cart::add))
        .route("/update-quantity", post(cart::update_quantity))
        .route("/set-status", post(cart::set_status))
        .route("/remove", post(cart::remove))
        .route("/remove-many", post(cart::remove_many))
        .route("/clear", post(cart::clear))
        .route("/move-to-wishlist", post(cart::move_to_wishlist))
}

fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::list))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route("/{id}", put(addresses::update).delete(addresses::delete))
        .route("/{id}/primary", post(addresses::set_primary))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/payment", post(orders::confirm_payment))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/users/me", get(users::me).patch(users::update_me))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/addresses", address_routes())
        .route("/checkout", post(orders::checkout))
        .nest("/orders", order_routes())
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
        .route("/internal/revalidate", post(internal::revalidate))
}
