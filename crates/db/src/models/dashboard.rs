//! Admin dashboard counters.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCounts {
    pub contacts: i64,
    pub campaigns: i64,
    pub emails_sent: i64,
    pub draft_campaigns: i64,
    pub waiting_list: i64,
}
