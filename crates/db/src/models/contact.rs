//! Contact model and DTOs.

use empodhera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for inserting a contact. `email` must already be normalised.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContact {
    pub email: String,
    pub name: Option<String>,
    #[serde(skip)]
    pub created_by: Option<DbId>,
}
