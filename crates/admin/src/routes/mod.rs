//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! POST   /auth/login                            - Password login (rate limited)
//! POST   /auth/logout                           - Logout
//! GET    /api/me                                - Current admin
//!
//! POST   /api/products/{id}/features/{feature}  - Add product to a section
//! DELETE /api/products/{id}/features/{feature}  - Remove product from a section
//! POST   /api/products/import                   - CSV catalog import (multipart `file`)
//! GET    /api/sections/{feature}                - Products in a section
//!
//! GET    /api/coupons                           - List coupons
//! POST   /api/coupons                           - Create coupon
//! GET    /api/coupons/{id}                      - Coupon detail
//! PATCH  /api/coupons/{id}                      - Update coupon
//! DELETE /api/coupons/{id}                      - Delete (or deactivate) coupon
//!
//! GET    /api/media                             - List media
//! POST   /api/media                             - Upload image (multipart `file`, `alt_text`)
//! GET    /api/media/{id}                        - Media detail
//! PATCH  /api/media/{id}                        - Update alt text
//! DELETE /api/media/{id}                        - Delete row and file
//!
//! GET    /api/orders                            - Orders with status filters
//! POST   /api/orders/{id}/shipment              - Register a shipment
//!
//! GET    /api/reports/compliance                - Fulfillment compliance report
//! GET    /api/analytics/revenue                 - Daily revenue (cached)
//!
//! POST   /cron/shipments/poll                   - Carrier poll (bearer `CRON_SECRET`)
//! ```
//!
//! Reads need any admin session; writes need a role that can write.

mod auth;
mod coupons;
mod cron;
mod media;
mod orders;
mod products;
mod reports;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::models::media::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Room for multipart framing and the text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login).layer(login_rate_limiter()))
        .route("/logout", post(auth::logout))
}

fn api_routes() -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD);

    Router::new()
        .route("/me", get(auth::me))
        .route(
            "/products/{id}/features/{feature}",
            post(products::add_feature).delete(products::remove_feature),
        )
        .route(
            "/products/import",
            post(products::import).layer(upload_limit.clone()),
        )
        .route("/sections/{feature}", get(products::section))
        .route("/coupons", get(coupons::index).post(coupons::create))
        .route(
            "/coupons/{id}",
            get(coupons::show)
                .patch(coupons::update)
                .delete(coupons::delete),
        )
        .route(
            "/media",
            get(media::index).post(media::upload).layer(upload_limit),
        )
        .route(
            "/media/{id}",
            get(media::show).patch(media::update).delete(media::delete),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}/shipment", post(orders::create_shipment))
        .route("/reports/compliance", get(reports::compliance))
        .route("/analytics/revenue", get(reports::revenue))
}

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
        .route("/cron/shipments/poll", post(cron::poll_shipments))
}
