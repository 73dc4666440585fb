//! Repository for the `waiting_list` table.

use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::waiting_list::{CreateWaitingListEntry, WaitingListEntry};

const COLUMNS: &str =
    "id, name, email, phone, subscribed_to_marketing, unsubscribed_at, created_at";

pub struct WaitingListRepo;

impl WaitingListRepo {
    /// Insert an entry unless the email is already on the list.
    ///
    /// Returns the new row, or `None` if the email was already present.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateWaitingListEntry,
    ) -> Result<Option<WaitingListEntry>, sqlx::Error> {
        let query = format!(
            "INSERT INTO waiting_list (name, email, phone, subscribed_to_marketing)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_waiting_list_email DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitingListEntry>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.subscribed_to_marketing)
            .fetch_optional(pool)
            .await
    }

    /// List entries newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<WaitingListEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM waiting_list ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, WaitingListEntry>(&query)
            .fetch_all(pool)
            .await
    }

    /// Delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM waiting_list WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
