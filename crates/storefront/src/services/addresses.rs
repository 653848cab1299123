//! Address management.
//!
//! Each operation loads the user's addresses, lets the planning functions in
//! `models::address` decide what to write, then applies it in one
//! transaction.

use sqlx::PgPool;
use tracing::{info, instrument};

use maison_core::{AddressId, UserId};

use crate::db::AddressRepository;
use crate::error::Result;
use crate::models::Address;
use crate::models::AddressInput;
use crate::models::address::{check_delete, plan_create, plan_set_primary, plan_update};

pub struct AddressService<'a> {
    addresses: AddressRepository<'a>,
}

impl<'a> AddressService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            addresses: AddressRepository::new(pool),
        }
    }

    /// All of a user's addresses, primary first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>> {
        Ok(self.addresses.list_for_user(user_id).await?)
    }

    /// Create an address. The first one becomes primary.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for invalid fields; `CONFLICT` for a duplicate slug.
    #[instrument(skip(self, input))]
    pub async fn create(&self, user_id: UserId, input: &AddressInput) -> Result<Address> {
        let existing = self.addresses.list_for_user(user_id).await?;
        let write = plan_create(&existing, input)?;
        let address = self.addresses.create(user_id, &write).await?;
        info!(address_id = %address.id, is_primary = address.is_primary, "Created address");
        Ok(address)
    }

    /// Update an address.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND`, `BAD_REQUEST` (invalid fields or unsetting the
    /// primary), or `CONFLICT` for a duplicate slug.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address> {
        let existing = self.addresses.list_for_user(user_id).await?;
        let write = plan_update(&existing, id, input)?;
        Ok(self.addresses.update(user_id, id, &write).await?)
    }

    /// Make an address primary.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if the address does not belong to the user.
    #[instrument(skip(self))]
    pub async fn set_primary(&self, user_id: UserId, id: AddressId) -> Result<Vec<Address>> {
        let existing = self.addresses.list_for_user(user_id).await?;
        let previous = plan_set_primary(&existing, id)?;
        if previous.is_some() || !existing.iter().any(|a| a.id == id && a.is_primary) {
            self.addresses.set_primary(user_id, id, previous).await?;
        }
        self.list(user_id).await
    }

    /// Delete a non-primary address when others remain.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` or `BAD_REQUEST` per the delete rules.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<()> {
        let existing = self.addresses.list_for_user(user_id).await?;
        check_delete(&existing, id)?;
        self.addresses.delete(user_id, id).await?;
        Ok(())
    }
}
