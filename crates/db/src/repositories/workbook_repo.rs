//! Repository for the `workbook_responses` table.

use empodhera_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::workbook::WorkbookResponse;

const COLUMNS: &str = "id, user_id, module_id, activity_id, response, created_at, updated_at";

pub struct WorkbookResponseRepo;

impl WorkbookResponseRepo {
    /// Insert or replace the response for `(user, module, activity)`.
    /// Last write wins.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        module_id: i32,
        activity_id: &str,
        response: &Value,
    ) -> Result<WorkbookResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO workbook_responses (user_id, module_id, activity_id, response)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_workbook_responses_key
             DO UPDATE SET response = EXCLUDED.response, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkbookResponse>(&query)
            .bind(user_id)
            .bind(module_id)
            .bind(activity_id)
            .bind(response)
            .fetch_one(pool)
            .await
    }

    /// All responses of a user, optionally restricted to one module.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        module_id: Option<i32>,
    ) -> Result<Vec<WorkbookResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workbook_responses
             WHERE user_id = $1 AND ($2::integer IS NULL OR module_id = $2)
             ORDER BY module_id, activity_id"
        );
        sqlx::query_as::<_, WorkbookResponse>(&query)
            .bind(user_id)
            .bind(module_id)
            .fetch_all(pool)
            .await
    }
}
