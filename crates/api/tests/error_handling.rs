//! Tests for `AppError` to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use empodhera_api::error::AppError;
use empodhera_core::error::CoreError;
use empodhera_mailer::{DispatchError, ProviderError};
use http_body_util::BodyExt;

async fn parts(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_names_the_entity() {
    let (status, json) = parts(AppError::Core(CoreError::NotFound {
        entity: "campaign",
        id: 7,
    }))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "campaign with id 7 not found");
}

#[tokio::test]
async fn conflict_and_validation_keep_their_message() {
    let (status, json) = parts(CoreError::Conflict("already sent".into()).into()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "already sent");

    let (status, json) = parts(CoreError::Validation("bad".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn empty_audience_is_unprocessable() {
    let (status, json) = parts(AppError::from(DispatchError::Core(CoreError::EmptyAudience))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "EMPTY_AUDIENCE");
}

#[tokio::test]
async fn config_and_internal_errors_hide_details() {
    let (status, json) = parts(CoreError::Config("RESEND_API_KEY missing".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIG_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("RESEND"));

    let (status, json) = parts(AppError::InternalError("secret detail".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn provider_rejection_is_bad_gateway() {
    let err = ProviderError::Rejected {
        status: 422,
        body: "invalid recipient".into(),
    };
    let (status, json) = parts(AppError::from(DispatchError::Provider(err))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PROVIDER_ERROR");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, _) = parts(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auth_errors_map_to_401_and_403() {
    let (status, _) = parts(CoreError::Unauthorized("no token".into()).into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, json) = parts(CoreError::Forbidden("Admin role required".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Admin role required");
}
