//! Repository for the append-only `email_logs` table.

use empodhera_core::campaign::EmailLogStatus;
use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::campaign::{CreateEmailLog, EmailLog, EmailLogStats, EmailLogWithContact};

const COLUMNS: &str = "id, campaign_id, contact_id, status, sent_at, error_message, created_at";

pub struct EmailLogRepo;

impl EmailLogRepo {
    /// Record the outcome of one send. `sent_at` is stamped for successful
    /// sends only.
    pub async fn create(pool: &PgPool, input: &CreateEmailLog<'_>) -> Result<EmailLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_logs (campaign_id, contact_id, status, sent_at, error_message)
             VALUES ($1, $2, $3, CASE WHEN $3::text = 'sent' THEN NOW() END, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailLog>(&query)
            .bind(input.campaign_id)
            .bind(input.contact_id)
            .bind(input.status.as_str())
            .bind(input.error_message)
            .fetch_one(pool)
            .await
    }

    /// Logs of a campaign with recipient details, most recent send first.
    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<EmailLogWithContact>, sqlx::Error> {
        sqlx::query_as::<_, EmailLogWithContact>(
            "SELECT l.id, l.contact_id, c.email AS contact_email, c.name AS contact_name,
                    l.status, l.sent_at, l.error_message, l.created_at
             FROM email_logs l
             JOIN contacts c ON c.id = l.contact_id
             WHERE l.campaign_id = $1
             ORDER BY l.sent_at DESC NULLS LAST, l.id DESC",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
    }

    /// Sent and failed totals of a campaign.
    pub async fn stats_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<EmailLogStats, sqlx::Error> {
        sqlx::query_as::<_, EmailLogStats>(
            "SELECT COUNT(*) FILTER (WHERE status = $2) AS sent,
                    COUNT(*) FILTER (WHERE status = $3) AS failed
             FROM email_logs WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .bind(EmailLogStatus::Sent.as_str())
        .bind(EmailLogStatus::Failed.as_str())
        .fetch_one(pool)
        .await
    }
}
