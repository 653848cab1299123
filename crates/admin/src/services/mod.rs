//! Business logic services for admin.
//!
//! - `auth` - Password login and admin account creation
//! - `sections` - Feature toggles over the curated product sections
//! - `revalidate` - Storefront cache revalidation client
//! - `coupons` - Coupon CRUD
//! - `media` - Media library uploads
//! - `import` - CSV catalog import
//! - `shipments` - Shipment registration
//! - `shipment_poll` - Carrier status polling
//! - `reports` - Compliance report and cached revenue analytics

pub mod auth;
pub mod coupons;
pub mod import;
pub mod media;
pub mod reports;
pub mod revalidate;
pub mod sections;
pub mod shipment_poll;
pub mod shipments;
