//! Route definitions for the `/waiting-list` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::waiting_list;
use crate::state::AppState;

/// Routes mounted at `/waiting-list`.
///
/// ```text
/// POST   /       -> join (public)
/// GET    /       -> list_entries
/// DELETE /{id}   -> delete_entry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(waiting_list::list_entries).post(waiting_list::join),
        )
        .route("/{id}", delete(waiting_list::delete_entry))
}
