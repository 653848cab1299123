//! Maison admin library.
//!
//! The brand team's JSON API: homepage sections, coupons, media, catalog
//! import, shipment tracking and reports. Exposed as a library so the
//! binary, the CLI and the integration tests share one set of modules.
//!
//! # Security
//!
//! Admin holds write access to the whole catalog and every order. Deploy
//! it on a private network only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod carrier;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
