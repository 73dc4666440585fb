//! Campaign dispatch and test sends.
//!
//! [`Dispatcher::dispatch`] claims a campaign with a conditional update
//! before sending anything, so a manual send racing the poller (or two
//! pollers) delivers each campaign once. The claim loser sees
//! [`DispatchOutcome::AlreadyInProgress`].

use std::sync::Arc;

use empodhera_core::campaign::{
    self, CampaignAction, CampaignStatus, EmailLogStatus, TEST_RECIPIENT_NAME,
};
use empodhera_core::contacts::parse_email;
use empodhera_core::error::CoreError;
use empodhera_core::types::{DbId, Timestamp};
use empodhera_db::models::campaign::{Campaign, CreateEmailLog};
use empodhera_db::models::contact::Contact;
use empodhera_db::repositories::{CampaignRepo, ContactRepo, EmailLogRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::DispatchError;
use crate::mailer::Mailer;

/// Result of a dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Every recipient was attempted and the campaign is now `sent`.
    Completed { sent: usize, failed: usize },
    /// Another caller holds the campaign.
    AlreadyInProgress,
}

/// Sends campaigns to the contact list.
#[derive(Clone)]
pub struct Dispatcher {
    pool: PgPool,
    mailer: Arc<Mailer>,
}

impl Dispatcher {
    pub fn new(pool: PgPool, mailer: Arc<Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Send a draft or scheduled campaign to every contact.
    ///
    /// Fails with `NotFound` for an unknown id, `Conflict` for a campaign
    /// already sent and `EmptyAudience` when there are no contacts; none of
    /// these change the campaign.
    pub async fn dispatch(&self, campaign_id: DbId) -> Result<DispatchOutcome, DispatchError> {
        let campaign = CampaignRepo::find_by_id(&self.pool, campaign_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "campaign",
                id: campaign_id,
            })?;

        match campaign.status {
            CampaignStatus::Sending => return Ok(DispatchOutcome::AlreadyInProgress),
            CampaignStatus::Draft | CampaignStatus::Scheduled | CampaignStatus::Sent => {
                campaign.status.apply(CampaignAction::Claim)?;
            }
        }

        let contacts = ContactRepo::list_audience(&self.pool).await?;
        if contacts.is_empty() {
            return Err(CoreError::EmptyAudience.into());
        }

        let Some(claimed) = CampaignRepo::claim(&self.pool, campaign_id).await? else {
            tracing::info!(campaign_id, "Campaign claimed by another dispatcher");
            return Ok(DispatchOutcome::AlreadyInProgress);
        };

        tracing::info!(campaign_id, recipients = contacts.len(), "Dispatching campaign");
        self.deliver(&claimed, &contacts).await
    }

    /// Take over a `sending` campaign whose heartbeat is older than
    /// `stale_before` and send it to the contacts that have not received it.
    pub async fn resume(
        &self,
        campaign_id: DbId,
        stale_before: Timestamp,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(campaign) = CampaignRepo::reclaim_stale(&self.pool, campaign_id, stale_before).await?
        else {
            return Ok(DispatchOutcome::AlreadyInProgress);
        };

        let contacts = ContactRepo::list_unsent_for_campaign(&self.pool, campaign_id).await?;
        tracing::warn!(
            campaign_id,
            remaining = contacts.len(),
            "Resuming stalled campaign dispatch",
        );
        self.deliver(&campaign, &contacts).await
    }

    /// Send one personalised email per contact, log each outcome, then mark
    /// the campaign sent. Database errors abort and leave it `sending`.
    async fn deliver(
        &self,
        campaign: &Campaign,
        contacts: &[Contact],
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut sent = 0;
        let mut failed = 0;
        let mut since_heartbeat = 0;
        let mut last_heartbeat = tokio::time::Instant::now();

        for (index, contact) in contacts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.mailer.send_delay()).await;
            }

            let html = campaign::personalize(&campaign.html_content, contact.name.as_deref());
            let result = self.mailer.send(&contact.email, &campaign.subject, &html).await;

            let error_message = match &result {
                Ok(_) => {
                    sent += 1;
                    None
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        campaign_id = campaign.id,
                        contact_id = contact.id,
                        error = %e,
                        "Campaign email failed",
                    );
                    Some(e.to_string())
                }
            };

            EmailLogRepo::create(
                &self.pool,
                &CreateEmailLog {
                    campaign_id: campaign.id,
                    contact_id: contact.id,
                    status: if error_message.is_none() {
                        EmailLogStatus::Sent
                    } else {
                        EmailLogStatus::Failed
                    },
                    error_message: error_message.as_deref(),
                },
            )
            .await?;

            since_heartbeat += 1;
            if campaign::heartbeat_due(since_heartbeat, last_heartbeat.elapsed()) {
                CampaignRepo::heartbeat(&self.pool, campaign.id).await?;
                since_heartbeat = 0;
                last_heartbeat = tokio::time::Instant::now();
            }
        }

        if CampaignRepo::complete(&self.pool, campaign.id).await?.is_none() {
            tracing::warn!(campaign_id = campaign.id, "Campaign left 'sending' before completion");
        }

        tracing::info!(campaign_id = campaign.id, sent, failed, "Campaign dispatch finished");
        Ok(DispatchOutcome::Completed { sent, failed })
    }

    /// Send a single preview of a campaign to `test_email`.
    ///
    /// The name placeholder becomes `Teste` and the subject gets a `[TESTE] `
    /// prefix. Nothing is logged and the campaign is not modified.
    pub async fn send_test(
        &self,
        campaign_id: DbId,
        test_email: &str,
    ) -> Result<String, DispatchError> {
        let campaign = CampaignRepo::find_by_id(&self.pool, campaign_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "campaign",
                id: campaign_id,
            })?;
        let to = parse_email(test_email)?;

        let html = campaign::personalize(&campaign.html_content, Some(TEST_RECIPIENT_NAME));
        let subject = campaign::test_subject(&campaign.subject);
        let message_id = self.mailer.send(&to, &subject, &html).await?;

        tracing::info!(campaign_id, to = %to, "Test email sent");
        Ok(message_id)
    }
}
