//! Handlers for the `/waiting-list` resource.
//!
//! Joining is public; listing and deleting are admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use empodhera_core::contacts::parse_email;
use empodhera_core::error::CoreError;
use empodhera_core::types::DbId;
use empodhera_db::models::contact::CreateContact;
use empodhera_db::models::waiting_list::{CreateWaitingListEntry, WaitingListEntry};
use empodhera_db::repositories::{ContactRepo, WaitingListRepo};
use empodhera_mailer::templates;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    /// `false` when the email was already on the list.
    pub created: bool,
    /// Whether the confirmation email went out.
    pub email_sent: bool,
}

/// POST /api/v1/waiting-list
///
/// Join the waiting list. The person is also registered as a contact and
/// receives a confirmation email; both follow-ups are best effort.
pub async fn join(
    State(state): State<AppState>,
    Json(input): Json<JoinRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<JoinResponse>>)> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(CoreError::Validation("name is required".into()).into());
    }
    let email = parse_email(&input.email)?;
    let phone = input
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let entry = WaitingListRepo::create_if_absent(
        &state.pool,
        &CreateWaitingListEntry {
            name: name.clone(),
            email: email.clone(),
            phone,
            subscribed_to_marketing: false,
        },
    )
    .await?;

    let contact = CreateContact {
        email: email.clone(),
        name: Some(name.clone()),
        created_by: None,
    };
    match ContactRepo::create_if_absent(&state.pool, &contact).await {
        Ok(true) => tracing::debug!(email = %email, "Waiting list member added to contacts"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to add waiting list member to contacts"),
    }

    let email_sent = match &state.mailer {
        Some(mailer) => {
            let message = templates::waiting_list_confirmation(&name);
            match mailer.send(&email, &message.subject, &message.html).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to send waiting list confirmation");
                    false
                }
            }
        }
        None => {
            tracing::debug!("No email provider configured, skipping confirmation");
            false
        }
    };

    let created = entry.is_some();
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse {
            data: JoinResponse {
                created,
                email_sent,
            },
        }),
    ))
}

/// GET /api/v1/waiting-list
pub async fn list_entries(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<WaitingListEntry>>>> {
    let entries = WaitingListRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// DELETE /api/v1/waiting-list/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !WaitingListRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "waiting list entry",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
