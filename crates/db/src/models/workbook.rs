//! Workbook response model.

use empodhera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `workbook_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkbookResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: i32,
    pub activity_id: String,
    pub response: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
