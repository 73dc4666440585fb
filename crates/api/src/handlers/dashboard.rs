//! Admin dashboard counters.

use axum::extract::State;
use axum::Json;
use empodhera_db::models::dashboard::DashboardCounts;
use empodhera_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn counts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<DashboardCounts>>> {
    let counts = DashboardRepo::counts(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}
