#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use empodhera_api::auth::jwt::{generate_access_token, JwtConfig};
use empodhera_api::auth::password::hash_password;
use empodhera_api::config::ServerConfig;
use empodhera_api::app::build_router;
use empodhera_api::state::AppState;
use empodhera_db::models::user::{CreateUser, User};
use empodhera_db::repositories::UserRepo;
use empodhera_mailer::{EmailProvider, Mailer, OutgoingEmail, ProviderError, SchedulerConfig};

pub const SCHEDULER_TOKEN: &str = "cron-secret";
pub const TEST_PASSWORD: &str = "senha-segura-123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        scheduler_token: Some(SCHEDULER_TOKEN.to_string()),
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 30,
        },
    }
}

/// Build the full application router without an email provider.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool, None)
}

/// The production router over a test state.
pub fn build_test_app_with_mailer(pool: PgPool, mailer: Option<Arc<Mailer>>) -> Router {
    build_router(AppState {
        pool,
        config: Arc::new(test_config()),
        mailer,
        scheduler: Arc::new(SchedulerConfig::default()),
    })
}

// ---------------------------------------------------------------------------
// Fake email provider
// ---------------------------------------------------------------------------

/// Records every message instead of delivering it. Addresses in `reject`
/// fail with a provider rejection.
#[derive(Default)]
pub struct RecordingProvider {
    sent: Mutex<Vec<OutgoingEmail>>,
    reject: HashSet<String>,
}

impl RecordingProvider {
    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            reject: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        if email.to.iter().any(|to| self.reject.contains(to)) {
            return Err(ProviderError::Rejected {
                status: 422,
                body: "invalid recipient".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

/// A mailer backed by `provider` with no pause between sends.
pub fn test_mailer(provider: Arc<RecordingProvider>) -> Arc<Mailer> {
    Arc::new(Mailer::new(
        provider,
        "EMPODHERA <contato@empodhera.com>",
        Duration::ZERO,
    ))
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert an active user with `roles` and the password [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, roles: &[&str]) -> User {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: "Usuária Teste".to_string(),
            phone: None,
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
        },
    )
    .await
    .unwrap();
    for role in roles {
        UserRepo::add_role(pool, user.id, role).await.unwrap();
    }
    user
}

/// A valid access token for `user` carrying `roles`.
pub fn token_for(user: &User, roles: &[&str]) -> String {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    generate_access_token(user.id, &user.email, &roles, &test_config().jwt).unwrap()
}

/// Create a user with `roles` and return an access token for it.
pub async fn user_token(pool: &PgPool, email: &str, roles: &[&str]) -> String {
    let user = create_user(pool, email, roles).await;
    token_for(&user, roles)
}

pub async fn admin_token(pool: &PgPool) -> String {
    user_token(pool, "admin@empodhera.com", &["admin"]).await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a plain-text body (CSV uploads).
pub async fn post_text_auth(app: Router, uri: &str, body: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "text/csv")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with a custom header and no auth (scheduler token).
pub async fn post_with_header(app: Router, uri: &str, name: &str, value: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
