//! HTTP server settings.

use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Settings for the back-office HTTP server, read once at startup.
///
/// Only `JWT_SECRET` is mandatory; everything else falls back to values
/// that work for a local admin panel dev server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS, one per admin panel deployment.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for background tasks at shutdown.
    pub shutdown_timeout_secs: u64,
    /// Shared secret an external cron presents in `x-scheduler-token` to
    /// trigger the campaign poller. Unset disables token access.
    pub scheduler_token: Option<String>,
    pub jwt: JwtConfig,
}

/// Parse `key` as `T`, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw:?}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `SCHEDULER_TOKEN`       | unset                   |
    ///
    /// `CORS_ORIGINS` is comma separated. JWT settings are documented on
    /// [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            scheduler_token: std::env::var("SCHEDULER_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            jwt: JwtConfig::from_env(),
        }
    }
}
