use std::sync::Arc;

use empodhera_core::error::CoreError;
use empodhera_mailer::{CampaignScheduler, Dispatcher, Mailer, SchedulerConfig};

use crate::config::ServerConfig;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: empodhera_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound email. `None` when no provider is configured.
    pub mailer: Option<Arc<Mailer>>,
    /// Campaign poller settings.
    pub scheduler: Arc<SchedulerConfig>,
}

impl AppState {
    /// The configured mailer, or a configuration error.
    pub fn mailer(&self) -> AppResult<Arc<Mailer>> {
        self.mailer.clone().ok_or_else(|| {
            CoreError::Config("No email provider configured (set RESEND_API_KEY or SMTP_HOST)".into())
                .into()
        })
    }

    pub fn dispatcher(&self) -> AppResult<Dispatcher> {
        Ok(Dispatcher::new(self.pool.clone(), self.mailer()?))
    }

    pub fn campaign_scheduler(&self) -> AppResult<CampaignScheduler> {
        Ok(CampaignScheduler::new(
            self.pool.clone(),
            self.dispatcher()?,
            SchedulerConfig::clone(&self.scheduler),
        ))
    }
}
