//! Route definitions for the `/contacts` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/contacts`.
///
/// ```text
/// GET    /         -> list_contacts
/// POST   /         -> create_contact
/// POST   /import   -> import_contacts
/// GET    /export   -> export_contacts
/// DELETE /{id}     -> delete_contact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/import", post(contacts::import_contacts))
        .route("/export", get(contacts::export_contacts))
        .route("/{id}", delete(contacts::delete_contact))
}
