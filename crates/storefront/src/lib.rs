//! Maison storefront library.
//!
//! The customer-facing JSON API: catalog, cart, wishlist, addresses,
//! checkout and orders. Exposed as a library so the binary and the
//! integration tests share one set of modules.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
