//! Product feature sections.
//!
//! Each feature is a curated storefront block ("Featured women",
//! "Beauty top picks", ...). A feature is backed by two things that must stay
//! in step: a boolean flag column on `shop.product` and a soft-deletable row
//! in its own section table. [`ProductFeature`] is the single table of those
//! pairs that the toggle handler is parameterized over.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown feature name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product feature: {0}")]
pub struct UnknownFeature(pub String);

/// A curated product section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFeature {
    FeaturedWomen,
    FeaturedMen,
    FeaturedKids,
    NewArrivals,
    BestSellers,
    Trending,
    BeautyTopPicks,
    AccessoriesSpotlight,
    SeasonalEdit,
    SalePicks,
    HomepageHero,
}

impl ProductFeature {
    /// Every feature, in display order.
    pub const ALL: [Self; 11] = [
        Self::FeaturedWomen,
        Self::FeaturedMen,
        Self::FeaturedKids,
        Self::NewArrivals,
        Self::BestSellers,
        Self::Trending,
        Self::BeautyTopPicks,
        Self::AccessoriesSpotlight,
        Self::SeasonalEdit,
        Self::SalePicks,
        Self::HomepageHero,
    ];

    /// API name (`snake_case`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FeaturedWomen => "featured_women",
            Self::FeaturedMen => "featured_men",
            Self::FeaturedKids => "featured_kids",
            Self::NewArrivals => "new_arrivals",
            Self::BestSellers => "best_sellers",
            Self::Trending => "trending",
            Self::BeautyTopPicks => "beauty_top_picks",
            Self::AccessoriesSpotlight => "accessories_spotlight",
            Self::SeasonalEdit => "seasonal_edit",
            Self::SalePicks => "sale_picks",
            Self::HomepageHero => "homepage_hero",
        }
    }

    /// Fully qualified section table holding the soft-deletable membership rows.
    #[must_use]
    pub const fn section_table(self) -> &'static str {
        match self {
            Self::FeaturedWomen => "admin.section_featured_women",
            Self::FeaturedMen => "admin.section_featured_men",
            Self::FeaturedKids => "admin.section_featured_kids",
            Self::NewArrivals => "admin.section_new_arrivals",
            Self::BestSellers => "admin.section_best_sellers",
            Self::Trending => "admin.section_trending",
            Self::BeautyTopPicks => "admin.section_beauty_top_picks",
            Self::AccessoriesSpotlight => "admin.section_accessories_spotlight",
            Self::SeasonalEdit => "admin.section_seasonal_edit",
            Self::SalePicks => "admin.section_sale_picks",
            Self::HomepageHero => "admin.section_homepage_hero",
        }
    }

    /// Boolean column on `shop.product` mirroring section membership.
    #[must_use]
    pub const fn flag_column(self) -> &'static str {
        match self {
            Self::FeaturedWomen => "is_featured_women",
            Self::FeaturedMen => "is_featured_men",
            Self::FeaturedKids => "is_featured_kids",
            Self::NewArrivals => "is_new_arrival",
            Self::BestSellers => "is_best_seller",
            Self::Trending => "is_trending",
            Self::BeautyTopPicks => "is_beauty_top_pick",
            Self::AccessoriesSpotlight => "is_accessories_spotlight",
            Self::SeasonalEdit => "is_seasonal_edit",
            Self::SalePicks => "is_sale_pick",
            Self::HomepageHero => "is_homepage_hero",
        }
    }
}

impl fmt::Display for ProductFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductFeature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for feature in ProductFeature::ALL {
            assert_eq!(feature.as_str().parse::<ProductFeature>(), Ok(feature));
        }
    }

    #[test]
    fn test_unknown_feature() {
        assert_eq!(
            "clearance".parse::<ProductFeature>(),
            Err(UnknownFeature("clearance".to_string()))
        );
    }

    #[test]
    fn test_tables_and_columns_are_distinct() {
        let tables: HashSet<_> = ProductFeature::ALL.iter().map(|f| f.section_table()).collect();
        let columns: HashSet<_> = ProductFeature::ALL.iter().map(|f| f.flag_column()).collect();
        assert_eq!(tables.len(), ProductFeature::ALL.len());
        assert_eq!(columns.len(), ProductFeature::ALL.len());
    }

    #[test]
    fn test_identifiers_are_sql_safe() {
        // Section tables and columns are interpolated into SQL, so they must
        // never contain anything but identifier characters.
        for feature in ProductFeature::ALL {
            let ok = |s: &str| s.chars().all(|c| c.is_ascii_lowercase() || c == '_' || c == '.');
            assert!(ok(feature.section_table()));
            assert!(ok(feature.flag_column()));
        }
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&ProductFeature::BeautyTopPicks).unwrap_or_default();
        assert_eq!(json, "\"beauty_top_picks\"");
    }
}
