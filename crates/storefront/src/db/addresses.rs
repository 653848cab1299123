//! Address persistence.
//!
//! Writes that change the primary address demote the old primary first,
//! inside the same transaction, so the partial unique index on
//! `(user_id) WHERE is_primary` never sees two primaries.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use maison_core::{AddressId, AddressType, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressWrite};

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    alias: String,
    address_type: AddressType,
    slug: String,
    is_primary: bool,
    recipient_name: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            alias: row.alias,
            address_type: row.address_type,
            slug: row.slug,
            is_primary: row.is_primary,
            recipient_name: row.recipient_name,
            street: row.street,
            city: row.city,
            state: row.state,
            zip: row.zip,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, alias, address_type, slug, is_primary, recipient_name, street, \
                       city, state, zip, phone, created_at, updated_at";

async fn demote(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    id: AddressId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE shop.address
        SET is_primary = FALSE, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        ",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a user's addresses, primary first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM shop.address WHERE user_id = $1 \
             ORDER BY is_primary DESC, created_at, id"
        );
        let rows = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Get one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM shop.address WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Address::from))
    }

    /// Insert a planned address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug.
    #[instrument(skip(self, write), fields(slug = %write.fields.slug))]
    pub async fn create(
        &self,
        user_id: UserId,
        write: &AddressWrite,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if let Some(old) = write.demote {
            demote(&mut tx, user_id, old).await?;
        }

        let f = &write.fields;
        let sql = format!(
            "INSERT INTO shop.address (user_id, alias, address_type, slug, is_primary, \
             recipient_name, street, city, state, zip, phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(user_id)
            .bind(&f.alias)
            .bind(f.address_type)
            .bind(&f.slug)
            .bind(write.is_primary)
            .bind(&f.recipient_name)
            .bind(&f.street)
            .bind(&f.city)
            .bind(&f.state)
            .bind(&f.zip)
            .bind(&f.phone)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "address already exists"))?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Apply a planned update to address `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address is gone and
    /// `RepositoryError::Conflict` on a duplicate slug.
    #[instrument(skip(self, write), fields(slug = %write.fields.slug))]
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        write: &AddressWrite,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if let Some(old) = write.demote {
            demote(&mut tx, user_id, old).await?;
        }

        let f = &write.fields;
        let sql = format!(
            "UPDATE shop.address SET alias = $3, address_type = $4, slug = $5, is_primary = $6, \
             recipient_name = $7, street = $8, city = $9, state = $10, zip = $11, phone = $12, \
             updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&f.alias)
            .bind(f.address_type)
            .bind(&f.slug)
            .bind(write.is_primary)
            .bind(&f.recipient_name)
            .bind(&f.street)
            .bind(&f.city)
            .bind(&f.state)
            .bind(&f.zip)
            .bind(&f.phone)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "address already exists"))?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Make `id` primary, demoting `previous` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address is gone.
    #[instrument(skip(self))]
    pub async fn set_primary(
        &self,
        user_id: UserId,
        id: AddressId,
        previous: Option<AddressId>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if let Some(old) = previous {
            demote(&mut tx, user_id, old).await?;
        }
        let result = sqlx::query(
            r"
            UPDATE shop.address
            SET is_primary = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Delete a non-primary address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such non-primary address
    /// exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM shop.address WHERE id = $1 AND user_id = $2 AND NOT is_primary",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
