//! Business logic services for storefront.
//!
//! Services sit between route handlers and repositories: they apply the
//! domain rules, keep the per-user caches coherent and map failures onto
//! `AppError`.
//!
//! - `auth` - Registration and password login
//! - `cart` - Cart mutations with insert-or-increment semantics
//! - `wishlist` - Wishlist mutations and move-to-cart
//! - `addresses` - Address book with the single-primary rule
//! - `catalog` - Product listing and detail
//! - `profile` - Shopper profile
//! - `orders` - Checkout, order history, cancellation and payment
//! - `order_timer` - Background cancellation of unpaid orders

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order_timer;
pub mod orders;
pub mod profile;
pub mod wishlist;
