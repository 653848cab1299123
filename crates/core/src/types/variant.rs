//! Variant selector (size + color) used to address a cart line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced when normalizing a [`VariantSelector`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("size cannot be empty")]
    EmptySize,
    #[error("color cannot be empty")]
    EmptyColor,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// The (size, color) pair that, together with a product id, identifies one
/// cart line.
///
/// Sizes are upper-cased (`"m"` and `"M"` are the same size) and colors are
/// lower-cased, so the cart's uniqueness key is not defeated by casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelector {
    pub size: String,
    pub color: String,
}

impl VariantSelector {
    /// Maximum length of either field.
    pub const MAX_LENGTH: usize = 32;

    /// Normalize and validate a selector.
    ///
    /// # Errors
    ///
    /// Returns `VariantError` when a field is blank or too long.
    pub fn new(size: &str, color: &str) -> Result<Self, VariantError> {
        let size = size.trim();
        let color = color.trim();
        if size.is_empty() {
            return Err(VariantError::EmptySize);
        }
        if color.is_empty() {
            return Err(VariantError::EmptyColor);
        }
        if size.chars().count() > Self::MAX_LENGTH {
            return Err(VariantError::TooLong {
                field: "size",
                max: Self::MAX_LENGTH,
            });
        }
        if color.chars().count() > Self::MAX_LENGTH {
            return Err(VariantError::TooLong {
                field: "color",
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self {
            size: size.to_uppercase(),
            color: color.to_lowercase(),
        })
    }
}

impl fmt::Display for VariantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.size, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case() {
        let a = VariantSelector::new(" m ", "Navy Blue");
        let b = VariantSelector::new("M", "navy blue");
        assert_eq!(a, b);
        assert_eq!(a.map(|v| v.to_string()), Ok("M / navy blue".to_string()));
    }

    #[test]
    fn test_rejects_blank_fields() {
        assert_eq!(VariantSelector::new(" ", "red"), Err(VariantError::EmptySize));
        assert_eq!(VariantSelector::new("S", ""), Err(VariantError::EmptyColor));
    }

    #[test]
    fn test_rejects_long_fields() {
        let long = "x".repeat(33);
        assert!(matches!(
            VariantSelector::new(&long, "red"),
            Err(VariantError::TooLong { field: "size", .. })
        ));
    }
}
