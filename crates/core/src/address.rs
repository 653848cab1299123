//! Address slugs and field validation.

use crate::types::AddressType;

/// Errors produced when validating address fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("alias must contain at least one letter or digit")]
    InvalidAlias,
    #[error("zip code must be 4-10 letters or digits")]
    InvalidZip,
    #[error("phone number must be 7-15 digits, optionally starting with '+'")]
    InvalidPhone,
}

/// Build the per-user unique slug for an address: `lowercase(alias)-type`,
/// with every run of non-alphanumeric characters collapsed to one `-`.
///
/// # Errors
///
/// Returns `AddressError::InvalidAlias` if the alias has no alphanumerics.
///
/// ```
/// use maison_core::address::address_slug;
/// use maison_core::AddressType;
///
/// assert_eq!(
///     address_slug("Mom's  Place", AddressType::Home).unwrap(),
///     "mom-s-place-home"
/// );
/// ```
pub fn address_slug(alias: &str, address_type: AddressType) -> Result<String, AddressError> {
    let mut slug = String::with_capacity(alias.len() + 6);
    let mut pending_dash = false;
    for c in alias.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        return Err(AddressError::InvalidAlias);
    }
    slug.push('-');
    slug.push_str(address_type.as_str());
    Ok(slug)
}

/// Validate a postal code: 4-10 ASCII letters/digits, inner spaces or dashes allowed.
///
/// # Errors
///
/// Returns `AddressError::InvalidZip` otherwise.
pub fn validate_zip(zip: &str) -> Result<(), AddressError> {
    let compact: String = zip.trim().chars().filter(|c| *c != ' ' && *c != '-').collect();
    if (4..=10).contains(&compact.len()) && compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(AddressError::InvalidZip)
    }
}

/// Validate a phone number: optional leading `+`, 7-15 digits, spaces and
/// dashes ignored.
///
/// # Errors
///
/// Returns `AddressError::InvalidPhone` otherwise.
pub fn validate_phone(phone: &str) -> Result<(), AddressError> {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let compact: String = digits.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if (7..=15).contains(&compact.len()) && compact.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AddressError::InvalidPhone)
    }
}

/// Ensure a required text field is not blank.
///
/// # Errors
///
/// Returns `AddressError::Empty` naming the field.
pub fn require(field: &'static str, value: &str) -> Result<(), AddressError> {
    if value.trim().is_empty() {
        Err(AddressError::Empty(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_collapses_separators() {
        assert_eq!(
            address_slug("  Studio / Office ", AddressType::Work).as_deref(),
            Ok("studio-office-work")
        );
        assert_eq!(address_slug("HQ", AddressType::Other).as_deref(), Ok("hq-other"));
    }

    #[test]
    fn test_slug_requires_alphanumerics() {
        assert_eq!(
            address_slug("--- ", AddressType::Home),
            Err(AddressError::InvalidAlias)
        );
    }

    #[test]
    fn test_zip_validation() {
        assert!(validate_zip("560001").is_ok());
        assert!(validate_zip("SW1A 1AA").is_ok());
        assert!(validate_zip("12").is_err());
        assert!(validate_zip("12#45").is_err());
    }

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("5551234").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("city", "  "), Err(AddressError::Empty("city")));
        assert!(require("city", "Pune").is_ok());
    }
}
