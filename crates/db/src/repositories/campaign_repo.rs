//! Repository for the `campaigns` table.
//!
//! Status changes are conditional updates: each statement names the statuses
//! it may leave from, so two racing callers can never both win. A `None`
//! result means the row was missing or in the wrong status.

use empodhera_core::campaign::CampaignStatus;
use empodhera_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};

const COLUMNS: &str = "id, title, subject, html_content, status, scheduled_at, sent_at, \
                       claimed_at, heartbeat_at, created_by, created_at";

/// Provides CRUD and lifecycle transitions for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new draft campaign.
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (title, subject, html_content, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.title)
            .bind(&input.subject)
            .bind(&input.html_content)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List campaigns newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }

    /// Edit a draft. Only non-`None` fields in `input` are applied.
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                title = COALESCE($2, title),
                subject = COALESCE($3, subject),
                html_content = COALESCE($4, html_content)
             WHERE id = $1 AND status = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.subject)
            .bind(&input.html_content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a campaign and, by cascade, its logs. Campaigns that are being
    /// sent are left alone. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND status <> 'sending'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or move the send time of a draft or scheduled campaign.
    pub async fn schedule(
        pool: &PgPool,
        id: DbId,
        scheduled_at: Timestamp,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $2, scheduled_at = $3
             WHERE id = $1 AND status IN ('draft', 'scheduled')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(CampaignStatus::Scheduled.as_str())
            .bind(scheduled_at)
            .fetch_optional(pool)
            .await
    }

    /// Return a scheduled campaign to draft and clear its send time.
    pub async fn cancel_schedule(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $2, scheduled_at = NULL
             WHERE id = $1 AND status = 'scheduled'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(CampaignStatus::Draft.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Atomically move a draft or scheduled campaign to `sending`.
    ///
    /// Returns `None` if another caller already claimed it (or it is sent).
    pub async fn claim(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns
             SET status = $2, claimed_at = NOW(), heartbeat_at = NOW()
             WHERE id = $1 AND status IN ('draft', 'scheduled')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(CampaignStatus::Sending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Atomically take over a `sending` campaign whose heartbeat is older
    /// than `stale_before`. Returns `None` if it is no longer stale.
    pub async fn reclaim_stale(
        pool: &PgPool,
        id: DbId,
        stale_before: Timestamp,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns
             SET claimed_at = NOW(), heartbeat_at = NOW()
             WHERE id = $1 AND status = 'sending'
               AND (heartbeat_at IS NULL OR heartbeat_at < $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(stale_before)
            .fetch_optional(pool)
            .await
    }

    /// Refresh the heartbeat of a campaign being sent.
    pub async fn heartbeat(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE campaigns SET heartbeat_at = NOW() WHERE id = $1 AND status = 'sending'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Mark a `sending` campaign as sent, stamping `sent_at`.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $2, sent_at = NOW()
             WHERE id = $1 AND status = 'sending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(CampaignStatus::Sent.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Scheduled campaigns whose send time has passed, oldest first.
    pub async fn list_due(pool: &PgPool, now: Timestamp) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns
             WHERE status = 'scheduled' AND scheduled_at <= $1
             ORDER BY scheduled_at, id"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// `sending` campaigns whose heartbeat is older than `stale_before`.
    pub async fn list_stale(
        pool: &PgPool,
        stale_before: Timestamp,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns
             WHERE status = 'sending' AND (heartbeat_at IS NULL OR heartbeat_at < $1)
             ORDER BY heartbeat_at NULLS FIRST, id"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(stale_before)
            .fetch_all(pool)
            .await
    }
}
