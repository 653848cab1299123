//! Shipping addresses and the primary-address rules.
//!
//! A user with any addresses has exactly one primary. The planning functions
//! here take the user's current addresses and decide which row, if any, must
//! be demoted alongside the write, or reject the operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maison_core::address::{self, AddressError};
use maison_core::{AddressId, AddressType};

/// Violations of the address rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressRuleError {
    #[error(transparent)]
    Invalid(#[from] AddressError),
    #[error("address not found")]
    NotFound,
    #[error("an address named '{0}' already exists")]
    DuplicateSlug(String),
    #[error("cannot unset the primary address; make another address primary instead")]
    CannotUnsetPrimary,
    #[error("cannot delete your only address")]
    LastAddress,
    #[error("cannot delete the primary address; make another address primary first")]
    PrimaryAddress,
}

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub alias: String,
    pub address_type: AddressType,
    pub slug: String,
    pub is_primary: bool,
    pub recipient_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address fields supplied on create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub alias: String,
    pub address_type: AddressType,
    pub recipient_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    /// `None` leaves primary status as the rules decide.
    pub is_primary: Option<bool>,
}

/// Validated, trimmed address fields plus the derived slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub alias: String,
    pub address_type: AddressType,
    pub slug: String,
    pub recipient_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
}

/// The write an address mutation should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressWrite {
    pub fields: AddressFields,
    pub is_primary: bool,
    /// Current primary to demote in the same transaction.
    pub demote: Option<AddressId>,
}

impl AddressInput {
    /// Trim and validate every field and derive the slug.
    ///
    /// # Errors
    ///
    /// Returns `AddressError` for the first invalid field.
    pub fn validate(&self) -> Result<AddressFields, AddressError> {
        address::require("alias", &self.alias)?;
        address::require("recipient_name", &self.recipient_name)?;
        address::require("street", &self.street)?;
        address::require("city", &self.city)?;
        address::require("state", &self.state)?;
        address::validate_zip(&self.zip)?;
        address::validate_phone(&self.phone)?;
        let slug = address::address_slug(&self.alias, self.address_type)?;

        Ok(AddressFields {
            alias: self.alias.trim().to_string(),
            address_type: self.address_type,
            slug,
            recipient_name: self.recipient_name.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_uppercase(),
            phone: self.phone.trim().to_string(),
        })
    }
}

fn current_primary(existing: &[Address]) -> Option<&Address> {
    existing.iter().find(|a| a.is_primary)
}

/// Plan creating an address. The first address is always primary.
///
/// # Errors
///
/// Returns `AddressRuleError` on invalid input or a duplicate slug.
pub fn plan_create(existing: &[Address], input: &AddressInput) -> Result<AddressWrite, AddressRuleError> {
    let fields = input.validate()?;
    if existing.iter().any(|a| a.slug == fields.slug) {
        return Err(AddressRuleError::DuplicateSlug(fields.slug));
    }

    let primary = current_primary(existing);
    let is_primary = primary.is_none() || input.is_primary == Some(true);
    let demote = if is_primary { primary.map(|a| a.id) } else { None };

    Ok(AddressWrite {
        fields,
        is_primary,
        demote,
    })
}

/// Plan updating address `id`.
///
/// # Errors
///
/// Returns `AddressRuleError` if the address is missing, the new slug
/// collides with another address, or the update would leave no primary.
pub fn plan_update(
    existing: &[Address],
    id: AddressId,
    input: &AddressInput,
) -> Result<AddressWrite, AddressRuleError> {
    let target = existing
        .iter()
        .find(|a| a.id == id)
        .ok_or(AddressRuleError::NotFound)?;
    let fields = input.validate()?;
    if existing.iter().any(|a| a.id != id && a.slug == fields.slug) {
        return Err(AddressRuleError::DuplicateSlug(fields.slug));
    }

    let is_primary = match input.is_primary {
        Some(false) if target.is_primary => return Err(AddressRuleError::CannotUnsetPrimary),
        Some(flag) => flag,
        None => target.is_primary,
    };
    let demote = if is_primary && !target.is_primary {
        current_primary(existing).map(|a| a.id)
    } else {
        None
    };

    Ok(AddressWrite {
        fields,
        is_primary,
        demote,
    })
}

/// Plan making `id` the primary address. Returns the address to demote, or
/// `None` when `id` already is primary.
///
/// # Errors
///
/// Returns `AddressRuleError::NotFound` if `id` is not one of `existing`.
pub fn plan_set_primary(existing: &[Address], id: AddressId) -> Result<Option<AddressId>, AddressRuleError> {
    let target = existing
        .iter()
        .find(|a| a.id == id)
        .ok_or(AddressRuleError::NotFound)?;
    if target.is_primary {
        return Ok(None);
    }
    Ok(current_primary(existing).map(|a| a.id))
}

/// Check that address `id` may be deleted.
///
/// # Errors
///
/// Returns `NotFound` if missing, `LastAddress` when fewer than two
/// addresses exist, `PrimaryAddress` when it is the primary.
pub fn check_delete(existing: &[Address], id: AddressId) -> Result<(), AddressRuleError> {
    let target = existing
        .iter()
        .find(|a| a.id == id)
        .ok_or(AddressRuleError::NotFound)?;
    if existing.len() < 2 {
        return Err(AddressRuleError::LastAddress);
    }
    if target.is_primary {
        return Err(AddressRuleError::PrimaryAddress);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(alias: &str, address_type: AddressType, is_primary: Option<bool>) -> AddressInput {
        AddressInput {
            alias: alias.to_string(),
            address_type,
            recipient_name: "Asha Rao".to_string(),
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            zip: "560001".to_string(),
            phone: "+91 9876543210".to_string(),
            is_primary,
        }
    }

    fn stored(id: i32, alias: &str, is_primary: bool) -> Address {
        let fields = input(alias, AddressType::Home, None).validate().unwrap();
        Address {
            id: AddressId::new(id),
            alias: fields.alias,
            address_type: fields.address_type,
            slug: fields.slug,
            is_primary,
            recipient_name: fields.recipient_name,
            street: fields.street,
            city: fields.city,
            state: fields.state,
            zip: fields.zip,
            phone: fields.phone,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_address_is_primary() {
        let plan = plan_create(&[], &input("Home", AddressType::Home, Some(false))).unwrap();
        assert!(plan.is_primary);
        assert_eq!(plan.demote, None);
        assert_eq!(plan.fields.slug, "home-home");
    }

    #[test]
    fn test_create_primary_demotes_existing() {
        let existing = vec![stored(1, "Home", true)];
        let plan = plan_create(&existing, &input("Office", AddressType::Work, Some(true))).unwrap();
        assert!(plan.is_primary);
        assert_eq!(plan.demote, Some(AddressId::new(1)));

        let plan = plan_create(&existing, &input("Office", AddressType::Work, None)).unwrap();
        assert!(!plan.is_primary);
        assert_eq!(plan.demote, None);
    }

    #[test]
    fn test_duplicate_slug_conflicts() {
        let existing = vec![stored(1, "Home", true)];
        assert_eq!(
            plan_create(&existing, &input(" HOME ", AddressType::Home, None)),
            Err(AddressRuleError::DuplicateSlug("home-home".to_string()))
        );
    }

    #[test]
    fn test_cannot_unset_primary() {
        let existing = vec![stored(1, "Home", true), stored(2, "Gym", false)];
        assert_eq!(
            plan_update(&existing, AddressId::new(1), &input("Home", AddressType::Home, Some(false))),
            Err(AddressRuleError::CannotUnsetPrimary)
        );
    }

    #[test]
    fn test_update_to_primary_demotes_other() {
        let existing = vec![stored(1, "Home", true), stored(2, "Gym", false)];
        let plan =
            plan_update(&existing, AddressId::new(2), &input("Gym", AddressType::Home, Some(true)))
                .unwrap();
        assert!(plan.is_primary);
        assert_eq!(plan.demote, Some(AddressId::new(1)));
    }

    #[test]
    fn test_update_keeps_own_slug() {
        let existing = vec![stored(1, "Home", true)];
        assert!(plan_update(&existing, AddressId::new(1), &input("home", AddressType::Home, None)).is_ok());
        assert_eq!(
            plan_update(&existing, AddressId::new(9), &input("x", AddressType::Home, None)),
            Err(AddressRuleError::NotFound)
        );
    }

    #[test]
    fn test_delete_rules() {
        let one = vec![stored(1, "Home", true)];
        assert_eq!(check_delete(&one, AddressId::new(1)), Err(AddressRuleError::LastAddress));
        assert_eq!(check_delete(&one, AddressId::new(2)), Err(AddressRuleError::NotFound));

        let two = vec![stored(1, "Home", true), stored(2, "Gym", false)];
        assert_eq!(check_delete(&two, AddressId::new(1)), Err(AddressRuleError::PrimaryAddress));
        assert_eq!(check_delete(&two, AddressId::new(2)), Ok(()));
    }

    #[test]
    fn test_set_primary() {
        let two = vec![stored(1, "Home", true), stored(2, "Gym", false)];
        assert_eq!(plan_set_primary(&two, AddressId::new(2)), Ok(Some(AddressId::new(1))));
        assert_eq!(plan_set_primary(&two, AddressId::new(1)), Ok(None));
        assert_eq!(plan_set_primary(&two, AddressId::new(3)), Err(AddressRuleError::NotFound));
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut bad = input("Home", AddressType::Home, None);
        bad.zip = "1".to_string();
        assert_eq!(
            plan_create(&[], &bad),
            Err(AddressRuleError::Invalid(AddressError::InvalidZip))
        );
    }
}
