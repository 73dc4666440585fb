//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`Session`] and rejects requests whose roles do not
//! meet the requirement, so authorization is visible in handler signatures.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use empodhera_core::error::CoreError;
use empodhera_core::roles::{ROLE_ADMIN, ROLE_FINANCE, ROLE_VIEWER};

use super::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Header an external cron uses to trigger the campaign poller.
pub const SCHEDULER_TOKEN_HEADER: &str = "x-scheduler-token";

async fn session_with_any_role(
    parts: &mut Parts,
    state: &AppState,
    roles: &[&str],
    message: &str,
) -> Result<Session, AppError> {
    let session = Session::from_request_parts(parts, state).await?;
    if !session.has_any_role(roles) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(session)
}

/// Requires the `admin` role. Campaigns, contacts, the waiting list and the
/// dashboard sit behind it.
pub struct RequireAdmin(pub Session);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_with_any_role(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `admin` or `financeiro`. Used for finance writes.
pub struct RequireFinance(pub Session);

impl FromRequestParts<AppState> for RequireFinance {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_with_any_role(
            parts,
            state,
            &[ROLE_ADMIN, ROLE_FINANCE],
            "Finance or Admin role required",
        )
        .await
        .map(RequireFinance)
    }
}

/// Requires `admin`, `financeiro` or `viewer`. Used for finance reads.
pub struct RequireFinanceRead(pub Session);

impl FromRequestParts<AppState> for RequireFinanceRead {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_with_any_role(
            parts,
            state,
            &[ROLE_ADMIN, ROLE_FINANCE, ROLE_VIEWER],
            "Finance, Viewer or Admin role required",
        )
        .await
        .map(RequireFinanceRead)
    }
}

/// Any signed-in user. Workbook routes use it.
pub struct RequireAuth(pub Session);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(RequireAuth)
    }
}

/// Who triggered a poll: an admin session or the external cron.
#[derive(Debug)]
pub enum SchedulerCaller {
    Admin(Session),
    Cron,
}

/// Accepts a matching `x-scheduler-token` header, otherwise falls back to
/// [`RequireAdmin`].
pub struct RequireScheduler(pub SchedulerCaller);

impl FromRequestParts<AppState> for RequireScheduler {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SCHEDULER_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        if let (Some(presented), Some(expected)) = (presented, &state.config.scheduler_token) {
            if presented == expected {
                return Ok(RequireScheduler(SchedulerCaller::Cron));
            }
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid scheduler token".into(),
            )));
        }

        let RequireAdmin(session) = RequireAdmin::from_request_parts(parts, state).await?;
        Ok(RequireScheduler(SchedulerCaller::Admin(session)))
    }
}
