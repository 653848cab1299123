//! Maison Core - Shared domain types.
//!
//! This crate provides the types and pure domain rules used by every Maison
//! component:
//! - `storefront` - Customer-facing shop API (cart, wishlist, checkout)
//! - `admin` - Brand/admin API (catalog curation, coupons, shipments)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate has no database access and no HTTP clients. Rules that both
//! binaries need to agree on (carrier status mapping, coupon arithmetic,
//! address slugs, feature sections) live here so they can be unit tested in
//! isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, variant selectors and statuses
//! - [`carrier`] - Carrier scan-status vocabulary mapping
//! - [`coupon`] - Coupon codes and discount calculation
//! - [`address`] - Address slug and field validation
//! - [`env`] - Environment-variable configuration helpers
//! - [`signature`] - Payment signatures and bearer-token checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod carrier;
pub mod coupon;
pub mod env;
pub mod signature;
pub mod types;

pub use types::*;
