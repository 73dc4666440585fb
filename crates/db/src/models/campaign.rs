//! Campaign and email log models and DTOs.

use empodhera_core::campaign::{CampaignStatus, EmailLogStatus};
use empodhera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub title: String,
    pub subject: String,
    pub html_content: String,
    #[sqlx(try_from = "String")]
    pub status: CampaignStatus,
    pub scheduled_at: Option<Timestamp>,
    pub sent_at: Option<Timestamp>,
    pub claimed_at: Option<Timestamp>,
    pub heartbeat_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for creating a campaign. New campaigns always start as drafts.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub title: String,
    pub subject: String,
    pub html_content: String,
    #[serde(skip)]
    pub created_by: Option<DbId>,
}

/// DTO for editing a draft campaign. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaign {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
}

/// A row from the `email_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailLog {
    pub id: DbId,
    pub campaign_id: DbId,
    pub contact_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: EmailLogStatus,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// An email log joined with the recipient, for the campaign detail view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailLogWithContact {
    pub id: DbId,
    pub contact_id: DbId,
    pub contact_email: String,
    pub contact_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: EmailLogStatus,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// Per-status totals of a campaign's logs.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct EmailLogStats {
    pub sent: i64,
    pub failed: i64,
}

pub struct CreateEmailLog<'a> {
    pub campaign_id: DbId,
    pub contact_id: DbId,
    pub status: EmailLogStatus,
    pub error_message: Option<&'a str>,
}
