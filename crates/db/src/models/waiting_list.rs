//! Waiting list model and DTOs.

use empodhera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `waiting_list` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WaitingListEntry {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subscribed_to_marketing: bool,
    pub unsubscribed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateWaitingListEntry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subscribed_to_marketing: bool,
}
