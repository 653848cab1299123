//! Domain models for admin.
//!
//! Request bodies, response views, and the pure rules (coupon drafts,
//! upload checks, CSV validation, shipment eligibility, report windows)
//! that run before anything touches the database.

pub mod admin_user;
pub mod coupon;
pub mod import;
pub mod media;
pub mod order;
pub mod report;
pub mod section;
pub mod session;

pub use admin_user::{AdminRole, AdminUser};
pub use coupon::{Coupon, CouponDraft, CouponPatch, CouponRemoval};
pub use import::{ImportProduct, ImportSummary, ImportVariant, RowError};
pub use media::{MediaAsset, MediaPatch, UploadError};
pub use order::{AdminOrder, NewShipment, OrderFilter, Shipment, ShipmentRuleError};
pub use report::{ComplianceReport, DailyRevenue, RevenueReport};
pub use section::{FeatureToggle, SectionEntry, ToggleAction};
pub use session::{CurrentAdmin, keys as session_keys};
