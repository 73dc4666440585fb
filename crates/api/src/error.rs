//! Mapping from failures to HTTP responses.
//!
//! Every error leaves the server as `{"error": <message>, "code": <CODE>}`.
//! Server-side failures are logged here and answered with a generic message
//! so SQL and provider internals never reach the admin panel.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use empodhera_core::error::CoreError;
use empodhera_mailer::{DispatchError, ProviderError};
use serde::Serialize;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The email provider refused the message or could not be reached.
    #[error("Email provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Hashing, token signing or a crashed task. The text is logged only.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Core(e) => Self::Core(e),
            DispatchError::Database(e) => Self::Database(e),
            DispatchError::Provider(e) => Self::Provider(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Core(CoreError::Validation(err.to_string()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

struct Reply {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Reply {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

fn core_reply(err: &CoreError) -> Reply {
    match err {
        CoreError::NotFound { entity, id } => Reply::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            Reply::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
        }
        CoreError::Conflict(msg) => Reply::new(StatusCode::CONFLICT, "CONFLICT", msg.as_str()),
        CoreError::EmptyAudience => Reply::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "EMPTY_AUDIENCE",
            err.to_string(),
        ),
        CoreError::Unauthorized(msg) => {
            Reply::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.as_str())
        }
        CoreError::Forbidden(msg) => Reply::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.as_str()),
        CoreError::Config(msg) => {
            tracing::error!(error = %msg, "Configuration error");
            Reply::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "The server is not configured for this operation",
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            Reply::internal()
        }
    }
}

/// `RowNotFound` is a 404. Unique violations on `uq_*` constraints are a 409,
/// check and foreign-key violations a 400. Anything else is a logged 500.
fn sqlx_reply(err: &sqlx::Error) -> Reply {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Reply::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
        }
        tracing::error!(error = %err, "Database error");
        return Reply::internal();
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => Reply::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        Some("23503" | "23514") => Reply::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates constraint: {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            Reply::internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let reply = match &self {
            AppError::Core(core) => core_reply(core),
            AppError::Database(err) => sqlx_reply(err),
            AppError::Provider(err) => {
                tracing::warn!(error = %err, "Email provider error");
                Reply::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", err.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Reply::internal()
            }
        };

        let body = ErrorBody {
            error: reply.message,
            code: reply.code,
        };
        (reply.status, axum::Json(body)).into_response()
    }
}
