//! Route definitions for the `/workbook` resource.
//!
//! All endpoints require authentication and act on the caller's own data.

use axum::routing::get;
use axum::Router;

use crate::handlers::workbook;
use crate::state::AppState;

/// Routes mounted at `/workbook`.
///
/// ```text
/// GET /modules     -> list_modules
/// GET /responses   -> list_responses
/// PUT /responses   -> save_response
/// GET /progress    -> progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/modules", get(workbook::list_modules))
        .route(
            "/responses",
            get(workbook::list_responses).put(workbook::save_response),
        )
        .route("/progress", get(workbook::progress))
}
