//! Handlers for the `/auth` resource (signup, login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use empodhera_core::contacts::{normalize_email, parse_email};
use empodhera_core::error::CoreError;
use empodhera_core::roles::ROLE_USER;
use empodhera_core::types::DbId;
use empodhera_db::models::contact::CreateContact;
use empodhera_db::models::session::CreateSession;
use empodhera_db::models::user::{CreateUser, User};
use empodhera_db::models::waiting_list::CreateWaitingListEntry;
use empodhera_db::repositories::{ContactRepo, SessionRepo, UserRepo, WaitingListRepo};
use empodhera_mailer::templates;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Session;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Name must have 1 to 200 characters"))]
    pub name: String,
    pub phone: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by signup, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account with the `user` role and log it in. The new member is
/// also added to the contacts and the waiting list and receives the workbook
/// welcome email; failures in those follow-ups are logged, never returned.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    let email = parse_email(&input.email)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".into()).into());
    }
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            name,
            phone: input.phone.clone(),
            password_hash,
        },
    )
    .await?;
    UserRepo::add_role(&state.pool, user.id, ROLE_USER).await?;
    tracing::info!(user_id = user.id, "User signed up");

    welcome_new_member(&state, &user).await;

    let roles = vec![ROLE_USER.to_string()];
    let response = create_auth_response(&state, &user, roles).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    let roles = UserRepo::roles(&state.pool, user.id).await?;
    let response = create_auth_response(&state, &user, roles).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// refresh token stops working.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Rotation: a refresh token is single-use.
    SessionRepo::delete(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let roles = UserRepo::roles(&state.pool, user.id).await?;
    let response = create_auth_response(&state, &user, roles).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Delete every session of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, session: Session) -> AppResult<StatusCode> {
    let removed = SessionRepo::delete_all_for_user(&state.pool, session.user_id).await?;
    tracing::debug!(user_id = session.user_id, removed, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<DataResponse<UserInfo>>> {
    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: session.user_id,
        })?;
    let roles = UserRepo::roles(&state.pool, user.id).await?;

    Ok(Json(DataResponse {
        data: UserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
            roles,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign an access token, store a fresh refresh-token session and build the body
/// shared by signup, login and refresh.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    roles: Vec<String>,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.email, &roles, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            roles,
        },
    })
}

/// Register a new member as a marketing contact and send the welcome email.
async fn welcome_new_member(state: &AppState, user: &User) {
    let contact = CreateContact {
        email: user.email.clone(),
        name: Some(user.name.clone()),
        created_by: Some(user.id),
    };
    if let Err(e) = ContactRepo::create_if_absent(&state.pool, &contact).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to add new member to contacts");
    }

    let entry = CreateWaitingListEntry {
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        subscribed_to_marketing: true,
    };
    if let Err(e) = WaitingListRepo::create_if_absent(&state.pool, &entry).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to add new member to waiting list");
    }

    let Some(mailer) = &state.mailer else {
        tracing::debug!(user_id = user.id, "No email provider configured, skipping welcome email");
        return;
    };
    let email = templates::workbook_welcome(&user.name);
    if let Err(e) = mailer.send(&user.email, &email.subject, &email.html).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to send welcome email");
    }
}
