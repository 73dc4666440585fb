//! Handlers for the `/campaigns` resource.
//!
//! Editing and scheduling are admin actions on the campaign row. Sending,
//! test sends and the poller go through [`empodhera_mailer`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use empodhera_core::campaign::{self, CampaignAction, CampaignStatus};
use empodhera_core::error::CoreError;
use empodhera_core::types::{DbId, Timestamp};
use empodhera_db::models::campaign::{
    Campaign, CreateCampaign, EmailLogStats, EmailLogWithContact, UpdateCampaign,
};
use empodhera_db::repositories::{CampaignRepo, EmailLogRepo};
use empodhera_mailer::{DispatchOutcome, PollReport};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireScheduler, SchedulerCaller};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub scheduled_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct TestSendRequest {
    pub test_email: String,
}

#[derive(Debug, Serialize)]
pub struct TestSendResponse {
    pub message_id: String,
}

/// A campaign with its delivery totals.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub stats: EmailLogStats,
    /// `sending` with a heartbeat older than the stale window.
    pub stalled: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load(state: &AppState, id: DbId) -> AppResult<Campaign> {
    CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "campaign",
            id,
        }))
}

/// Conflict raised when a conditional update matched no row because the
/// status changed underneath the request.
fn status_changed(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Campaign {id} changed status, reload and try again"
    )))
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let campaigns = CampaignRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// POST /api/v1/campaigns
///
/// Create a draft campaign.
pub async fn create_campaign(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    require_text("title", &input.title)?;
    require_text("subject", &input.subject)?;
    input.created_by = Some(admin.user_id);

    let campaign = CampaignRepo::create(&state.pool, &input).await?;
    tracing::info!(campaign_id = campaign.id, user_id = admin.user_id, "Campaign created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CampaignDetail>>> {
    let campaign = load(&state, id).await?;
    let stats = EmailLogRepo::stats_for_campaign(&state.pool, id).await?;
    let stalled = campaign.status == CampaignStatus::Sending
        && campaign::is_stale(campaign.heartbeat_at, Utc::now(), state.scheduler.stale_after);

    Ok(Json(DataResponse {
        data: CampaignDetail {
            campaign,
            stats,
            stalled,
        },
    }))
}

/// PUT /api/v1/campaigns/{id}
///
/// Edit title, subject or body of a draft.
pub async fn update_campaign(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    if let Some(title) = &input.title {
        require_text("title", title)?;
    }
    if let Some(subject) = &input.subject {
        require_text("subject", subject)?;
    }

    let current = load(&state, id).await?;
    current.status.apply(CampaignAction::Edit)?;

    let campaign = CampaignRepo::update_draft(&state.pool, id, &input)
        .await?
        .ok_or_else(|| status_changed(id))?;
    Ok(Json(DataResponse { data: campaign }))
}

/// DELETE /api/v1/campaigns/{id}
///
/// Remove a campaign and its logs. Campaigns being sent cannot be deleted.
pub async fn delete_campaign(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let current = load(&state, id).await?;
    current.status.apply(CampaignAction::Delete)?;

    if !CampaignRepo::delete(&state.pool, id).await? {
        return Err(status_changed(id));
    }
    tracing::info!(campaign_id = id, user_id = admin.user_id, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/{id}/schedule
///
/// Schedule (or reschedule) a campaign for a future instant.
pub async fn schedule_campaign(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ScheduleRequest>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    campaign::validate_schedule(input.scheduled_at, Utc::now())?;

    let current = load(&state, id).await?;
    current.status.apply(CampaignAction::Schedule)?;

    let campaign = CampaignRepo::schedule(&state.pool, id, input.scheduled_at)
        .await?
        .ok_or_else(|| status_changed(id))?;
    tracing::info!(campaign_id = id, scheduled_at = %input.scheduled_at, "Campaign scheduled");
    Ok(Json(DataResponse { data: campaign }))
}

/// POST /api/v1/campaigns/{id}/cancel-schedule
pub async fn cancel_schedule(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let current = load(&state, id).await?;
    current.status.apply(CampaignAction::CancelSchedule)?;

    let campaign = CampaignRepo::cancel_schedule(&state.pool, id)
        .await?
        .ok_or_else(|| status_changed(id))?;
    tracing::info!(campaign_id = id, "Campaign schedule cancelled");
    Ok(Json(DataResponse { data: campaign }))
}

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/{id}/send
///
/// Send the campaign to every contact now. The dispatch runs in its own task
/// so a client disconnect or request timeout does not interrupt it.
pub async fn send_campaign(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DispatchOutcome>>> {
    let dispatcher = state.dispatcher()?;
    tracing::info!(campaign_id = id, user_id = admin.user_id, "Manual campaign send requested");

    let outcome = tokio::spawn(async move { dispatcher.dispatch(id).await })
        .await
        .map_err(|e| AppError::InternalError(format!("Dispatch task failed: {e}")))??;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/campaigns/{id}/test
///
/// Send one preview to `test_email`. No log row is written.
pub async fn send_test(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<TestSendRequest>,
) -> AppResult<Json<DataResponse<TestSendResponse>>> {
    let message_id = state.dispatcher()?.send_test(id, &input.test_email).await?;
    Ok(Json(DataResponse {
        data: TestSendResponse { message_id },
    }))
}

/// GET /api/v1/campaigns/{id}/logs
///
/// Per-recipient outcomes, most recent first.
pub async fn list_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EmailLogWithContact>>>> {
    load(&state, id).await?;
    let logs = EmailLogRepo::list_for_campaign(&state.pool, id).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// POST /api/v1/campaigns/process-scheduled
///
/// Run one poll of the campaign scheduler. Callable by an admin or by an
/// external cron presenting `x-scheduler-token`.
pub async fn process_scheduled(
    State(state): State<AppState>,
    RequireScheduler(caller): RequireScheduler,
) -> AppResult<Json<DataResponse<PollReport>>> {
    match &caller {
        SchedulerCaller::Admin(session) => {
            tracing::info!(user_id = session.user_id, "Scheduler poll triggered by admin");
        }
        SchedulerCaller::Cron => tracing::info!("Scheduler poll triggered by token"),
    }

    let scheduler = state.campaign_scheduler()?;
    let report = tokio::spawn(async move { scheduler.process_due().await })
        .await
        .map_err(|e| AppError::InternalError(format!("Scheduler task failed: {e}")))??;
    Ok(Json(DataResponse { data: report }))
}
