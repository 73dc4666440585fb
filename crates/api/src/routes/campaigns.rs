//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /                      -> list_campaigns
/// POST   /                      -> create_campaign
/// POST   /process-scheduled     -> process_scheduled
/// GET    /{id}                  -> get_campaign
/// PUT    /{id}                  -> update_campaign
/// DELETE /{id}                  -> delete_campaign
/// POST   /{id}/schedule         -> schedule_campaign
/// POST   /{id}/cancel-schedule  -> cancel_schedule
/// POST   /{id}/send             -> send_campaign
/// POST   /{id}/test             -> send_test
/// GET    /{id}/logs             -> list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route("/process-scheduled", post(campaigns::process_scheduled))
        .route(
            "/{id}",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/{id}/schedule", post(campaigns::schedule_campaign))
        .route("/{id}/cancel-schedule", post(campaigns::cancel_schedule))
        .route("/{id}/send", post(campaigns::send_campaign))
        .route("/{id}/test", post(campaigns::send_test))
        .route("/{id}/logs", get(campaigns::list_logs))
}
