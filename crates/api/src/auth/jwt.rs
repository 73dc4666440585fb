//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs that carry the caller's id, email
//! and roles, so authorization never touches the database. Refresh tokens are
//! random UUIDs handed to the client once; the `sessions` table keeps only
//! their SHA-256 digest.

use empodhera_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// `users.id`.
    pub sub: DbId,
    pub email: String,
    /// Snapshot of `user_roles` at issue time.
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `JWT_SECRET`              | **yes**  |         |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or blank, or if an expiry does not
    /// parse as an integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .expect("JWT_SECRET must be set to a non-empty value");

        let expiry = |key: &str, default: i64| -> i64 {
            std::env::var(key)
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .unwrap_or_else(|_| panic!("{key} must be an integer"))
                })
                .unwrap_or(default)
        };

        Self {
            secret,
            access_token_expiry_mins: expiry("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: expiry("JWT_REFRESH_EXPIRY_DAYS", 30),
        }
    }
}

/// Sign an access token for a user holding `roles`.
pub fn generate_access_token(
    user_id: DbId,
    email: &str,
    roles: &[String],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_mins * 60;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        roles: roles.to_vec(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, then return the payload.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default()
    )?;
    Ok(token_data.claims)
}

/// A new refresh token as `(plaintext, digest)`. Only the digest is stored.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

/// Lower-case hex SHA-256 of a refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
