//! Curated product sections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use maison_core::{ProductFeature, ProductId};

/// A product currently in a section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionEntry {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub is_available: bool,
    pub added_at: DateTime<Utc>,
}

/// Whether a toggle adds or removes the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Add,
    Remove,
}

/// Response of a feature toggle.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureToggle {
    pub product_id: ProductId,
    pub feature: ProductFeature,
    pub active: bool,
}
