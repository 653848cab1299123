//! Core types for Maison.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod feature;
pub mod id;
pub mod price;
pub mod status;
pub mod variant;

pub use email::{Email, EmailError};
pub use feature::{ProductFeature, UnknownFeature};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
pub use variant::{VariantError, VariantSelector};
