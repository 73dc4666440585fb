//! Aggregate counters for the admin dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardCounts;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn counts(pool: &PgPool) -> Result<DashboardCounts, sqlx::Error> {
        sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                (SELECT COUNT(*) FROM contacts) AS contacts,
                (SELECT COUNT(*) FROM campaigns) AS campaigns,
                (SELECT COUNT(*) FROM email_logs WHERE status = 'sent') AS emails_sent,
                (SELECT COUNT(*) FROM campaigns WHERE status = 'draft') AS draft_campaigns,
                (SELECT COUNT(*) FROM waiting_list) AS waiting_list",
        )
        .fetch_one(pool)
        .await
    }
}
