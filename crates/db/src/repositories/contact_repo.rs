//! Repository for the `contacts` table.

use empodhera_core::contacts::ImportedContact;
use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{Contact, CreateContact};

const COLUMNS: &str = "id, email, name, created_by, created_at";

/// Provides CRUD and audience queries for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a contact. Fails with a unique violation on `uq_contacts_email`
    /// if the address already exists.
    pub async fn create(pool: &PgPool, input: &CreateContact) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (email, name, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Insert a contact unless the address is already known. Returns `true`
    /// if a row was inserted.
    pub async fn create_if_absent(pool: &PgPool, input: &CreateContact) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO contacts (email, name, created_by)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_contacts_email DO NOTHING",
        )
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.created_by)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bulk insert parsed CSV rows, skipping addresses that already exist.
    /// Returns the number of rows inserted.
    pub async fn import(
        pool: &PgPool,
        contacts: &[ImportedContact],
        created_by: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let emails: Vec<&str> = contacts.iter().map(|c| c.email.as_str()).collect();
        let names: Vec<Option<&str>> = contacts.iter().map(|c| c.name.as_deref()).collect();

        let result = sqlx::query(
            "INSERT INTO contacts (email, name, created_by)
             SELECT email, name, $3 FROM UNNEST($1::text[], $2::text[]) AS t(email, name)
             ON CONFLICT ON CONSTRAINT uq_contacts_email DO NOTHING",
        )
        .bind(&emails)
        .bind(&names)
        .bind(created_by)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE email = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List contacts newest first, optionally filtered by a case-insensitive
    /// substring of the email or name.
    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE $1::text IS NULL OR email ILIKE $1 OR name ILIKE $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(search.map(|s| format!("%{}%", s.trim())))
            .fetch_all(pool)
            .await
    }

    /// Every contact, in insertion order. This is a campaign's audience.
    pub async fn list_audience(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts ORDER BY id");
        sqlx::query_as::<_, Contact>(&query).fetch_all(pool).await
    }

    /// Contacts that have no `sent` log for the campaign yet, in insertion
    /// order. Used to resume an interrupted dispatch.
    pub async fn list_unsent_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts c
             WHERE NOT EXISTS (
                 SELECT 1 FROM email_logs l
                 WHERE l.campaign_id = $1 AND l.contact_id = c.id AND l.status = 'sent'
             )
             ORDER BY c.id"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a contact. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
