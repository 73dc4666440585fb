//! Handlers for the signed-in member's workbook under `/workbook`.
//!
//! Every endpoint works on the caller's own responses.

use axum::extract::{Query, State};
use axum::Json;
use empodhera_core::workbook::{self, Module, WorkbookProgress};
use empodhera_db::models::workbook::WorkbookResponse;
use empodhera_db::repositories::WorkbookResponseRepo;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ModuleParams {
    pub module_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SaveResponseRequest {
    pub module_id: i32,
    pub activity_id: String,
    pub response: Value,
}

/// GET /api/v1/workbook/modules
pub async fn list_modules(
    RequireAuth(_session): RequireAuth,
) -> Json<DataResponse<&'static [Module]>> {
    Json(DataResponse {
        data: workbook::MODULES,
    })
}

/// GET /api/v1/workbook/responses?module_id=
pub async fn list_responses(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(params): Query<ModuleParams>,
) -> AppResult<Json<DataResponse<Vec<WorkbookResponse>>>> {
    let responses =
        WorkbookResponseRepo::list_for_user(&state.pool, session.user_id, params.module_id).await?;
    Ok(Json(DataResponse { data: responses }))
}

/// PUT /api/v1/workbook/responses
///
/// Store one activity response. Repeated saves of the same activity replace
/// the previous value.
pub async fn save_response(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Json(input): Json<SaveResponseRequest>,
) -> AppResult<Json<DataResponse<WorkbookResponse>>> {
    workbook::validate_response(input.module_id, &input.activity_id, &input.response)?;
    let saved = WorkbookResponseRepo::upsert(
        &state.pool,
        session.user_id,
        input.module_id,
        &input.activity_id,
        &input.response,
    )
    .await?;
    Ok(Json(DataResponse { data: saved }))
}

/// GET /api/v1/workbook/progress
pub async fn progress(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> AppResult<Json<DataResponse<WorkbookProgress>>> {
    let responses = WorkbookResponseRepo::list_for_user(&state.pool, session.user_id, None).await?;
    let progress = workbook::progress(
        responses
            .iter()
            .map(|r| (r.module_id, r.activity_id.as_str(), &r.response)),
    );
    Ok(Json(DataResponse { data: progress }))
}
