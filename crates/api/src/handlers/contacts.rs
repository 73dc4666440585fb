//! Handlers for the `/contacts` resource. Admin only.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use empodhera_core::contacts::{self, parse_email};
use empodhera_core::error::CoreError;
use empodhera_core::types::DbId;
use empodhera_db::models::contact::{Contact, CreateContact};
use empodhera_db::repositories::ContactRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a CSV import.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    /// Distinct valid emails found in the file.
    pub processed: usize,
    /// Contacts actually created (existing emails are skipped).
    pub inserted: u64,
}

/// GET /api/v1/contacts?search=
///
/// Newest first. `search` matches email or name, case-insensitively.
pub async fn list_contacts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let contacts = ContactRepo::list(&state.pool, search).await?;
    Ok(Json(DataResponse { data: contacts }))
}

/// POST /api/v1/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<DataResponse<Contact>>)> {
    let contact = CreateContact {
        email: parse_email(&input.email)?,
        name: input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        created_by: Some(admin.user_id),
    };
    let contact = ContactRepo::create(&state.pool, &contact).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// POST /api/v1/contacts/import
///
/// Body is the raw CSV text (comma or semicolon separated).
pub async fn import_contacts(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: String,
) -> AppResult<Json<DataResponse<ImportSummary>>> {
    let parsed = contacts::parse_contacts_csv(&body)?;
    let inserted = ContactRepo::import(&state.pool, &parsed, Some(admin.user_id)).await?;

    tracing::info!(
        user_id = admin.user_id,
        processed = parsed.len(),
        inserted,
        "Contacts imported",
    );
    Ok(Json(DataResponse {
        data: ImportSummary {
            processed: parsed.len(),
            inserted,
        },
    }))
}

/// DELETE /api/v1/contacts/{id}
pub async fn delete_contact(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ContactRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "contact",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/contacts/export
///
/// Download every contact as CSV.
pub async fn export_contacts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let rows = ContactRepo::list(&state.pool, None).await?;
    let csv = contacts::export_csv(
        rows.iter()
            .map(|c| (c.email.as_str(), c.name.as_deref(), c.created_at.date_naive())),
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contatos.csv\"",
            ),
        ],
        csv,
    ))
}
