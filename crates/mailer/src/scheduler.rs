//! Scheduled campaign poller.
//!
//! [`CampaignScheduler`] runs as a background task in the API process and is
//! also invoked directly by the `process-scheduled` endpoint for an external
//! cron. Each poll dispatches due `scheduled` campaigns and then resumes
//! `sending` campaigns whose heartbeat went stale. Overlapping polls are safe:
//! the loser of each claim records the campaign as skipped.

use chrono::Utc;
use empodhera_core::campaign;
use empodhera_core::error::CoreError;
use empodhera_core::types::DbId;
use empodhera_db::repositories::CampaignRepo;
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Sent,
    Skipped,
    Error,
}

/// Outcome for one campaign in a poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollResult {
    pub id: DbId,
    pub status: PollStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollResult {
    fn from_outcome(id: DbId, outcome: Result<DispatchOutcome, DispatchError>) -> Self {
        match outcome {
            Ok(DispatchOutcome::Completed { sent, failed }) => Self {
                id,
                status: PollStatus::Sent,
                sent: Some(sent),
                failed: Some(failed),
                error: None,
            },
            // A campaign sent by a concurrent poll between listing and claiming.
            Ok(DispatchOutcome::AlreadyInProgress)
            | Err(DispatchError::Core(CoreError::Conflict(_))) => Self {
                id,
                status: PollStatus::Skipped,
                sent: None,
                failed: None,
                error: None,
            },
            Err(e) => {
                tracing::error!(campaign_id = id, error = %e, "Scheduled dispatch failed");
                Self {
                    id,
                    status: PollStatus::Error,
                    sent: None,
                    failed: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Summary of one poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub message: String,
    pub processed: usize,
    pub results: Vec<PollResult>,
}

/// Background service dispatching scheduled and stalled campaigns.
#[derive(Clone)]
pub struct CampaignScheduler {
    pool: PgPool,
    dispatcher: Dispatcher,
    config: SchedulerConfig,
}

impl CampaignScheduler {
    pub fn new(pool: PgPool, dispatcher: Dispatcher, config: SchedulerConfig) -> Self {
        Self {
            pool,
            dispatcher,
            config,
        }
    }

    /// Run the poll loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        if self.config.interval.is_zero() {
            tracing::error!("Campaign scheduler not started: poll interval is zero");
            return;
        }
        let mut interval = tokio::time::interval(self.config.interval);
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            "Campaign scheduler started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Campaign scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.process_due().await {
                        tracing::error!(error = %e, "Failed to process scheduled campaigns");
                    }
                }
            }
        }
    }

    /// Dispatch every due campaign, then resume stalled ones, one at a time.
    ///
    /// Per-campaign failures are recorded in the report; only a failure to
    /// list campaigns is returned as an error.
    pub async fn process_due(&self) -> Result<PollReport, sqlx::Error> {
        let now = Utc::now();
        let due = CampaignRepo::list_due(&self.pool, now).await?;
        let stale_before = campaign::stale_cutoff(now, self.config.stale_after);
        let stale = CampaignRepo::list_stale(&self.pool, stale_before).await?;

        let mut results = Vec::with_capacity(due.len() + stale.len());

        for campaign in &due {
            tracing::info!(campaign_id = campaign.id, "Dispatching scheduled campaign");
            let outcome = self.dispatcher.dispatch(campaign.id).await;
            results.push(PollResult::from_outcome(campaign.id, outcome));
        }

        for campaign in &stale {
            let outcome = self.dispatcher.resume(campaign.id, stale_before).await;
            results.push(PollResult::from_outcome(campaign.id, outcome));
        }

        if !results.is_empty() {
            tracing::info!(count = results.len(), "Processed scheduled campaigns");
        }

        Ok(PollReport {
            message: if results.is_empty() {
                "No campaigns to process".to_string()
            } else {
                "Campaigns processed".to_string()
            },
            processed: results.len(),
            results,
        })
    }
}
