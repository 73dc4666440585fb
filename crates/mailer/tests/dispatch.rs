//! Integration tests for campaign dispatch, test sends and the poller.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Utc;
use empodhera_core::campaign::{CampaignStatus, EmailLogStatus};
use empodhera_core::error::CoreError;
use empodhera_db::models::campaign::{Campaign, CreateCampaign};
use empodhera_db::models::contact::CreateContact;
use empodhera_db::repositories::{CampaignRepo, ContactRepo, EmailLogRepo};
use empodhera_mailer::{
    CampaignScheduler, DispatchError, DispatchOutcome, Dispatcher, EmailProvider, Mailer,
    OutgoingEmail, PollStatus, ProviderError, SchedulerConfig,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fake provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingProvider {
    sent: Mutex<Vec<OutgoingEmail>>,
    reject: HashSet<String>,
}

impl RecordingProvider {
    fn rejecting(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            reject: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn sent(&self) -> Vec<OutgoingEmail> {
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

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dispatcher(pool: &PgPool, provider: Arc<RecordingProvider>) -> Dispatcher {
    let mailer = Mailer::new(provider, "EMPODHERA <contato@empodhera.com>", Duration::ZERO);
    Dispatcher::new(pool.clone(), Arc::new(mailer))
}

async fn seed_campaign(pool: &PgPool) -> Campaign {
    CampaignRepo::create(
        pool,
        &CreateCampaign {
            title: "Lançamento".to_string(),
            subject: "Olá".to_string(),
            html_content: "Oi {{nome}}!".to_string(),
            created_by: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_contact(pool: &PgPool, email: &str, name: Option<&str>) {
    ContactRepo::create(
        pool,
        &CreateContact {
            email: email.to_string(),
            name: name.map(str::to_string),
            created_by: None,
        },
    )
    .await
    .unwrap();
}

async fn status_of(pool: &PgPool, id: i64) -> CampaignStatus {
    CampaignRepo::find_by_id(pool, id).await.unwrap().unwrap().status
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn dispatch_personalises_each_recipient(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    seed_contact(&pool, "semnome@x.com", None).await;
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::default());

    let outcome = dispatcher(&pool, provider.clone()).dispatch(campaign.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Completed { sent: 2, failed: 0 });

    let sent = provider.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, vec!["ana@x.com"]);
    assert_eq!(sent[0].html, "Oi Ana!");
    assert_eq!(sent[1].html, "Oi !");
    assert!(sent.iter().all(|e| e.subject == "Olá"));

    let logs = EmailLogRepo::list_for_campaign(&pool, campaign.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.status == EmailLogStatus::Sent && l.sent_at.is_some()));

    let done = CampaignRepo::find_by_id(&pool, campaign.id).await.unwrap().unwrap();
    assert_eq!(done.status, CampaignStatus::Sent);
    assert!(done.sent_at.is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn provider_failures_are_logged_and_campaign_still_completes(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    seed_contact(&pool, "bounce@x.com", Some("Bia")).await;
    seed_contact(&pool, "carla@x.com", None).await;
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::rejecting(&["bounce@x.com"]));

    let outcome = dispatcher(&pool, provider).dispatch(campaign.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Completed { sent: 2, failed: 1 });

    let stats = EmailLogRepo::stats_for_campaign(&pool, campaign.id).await.unwrap();
    assert_eq!((stats.sent, stats.failed), (2, 1));

    let logs = EmailLogRepo::list_for_campaign(&pool, campaign.id).await.unwrap();
    let failed = logs.iter().find(|l| l.status == EmailLogStatus::Failed).unwrap();
    assert_eq!(failed.contact_email, "bounce@x.com");
    assert_eq!(failed.error_message.as_deref(), Some("invalid recipient"));
    assert!(failed.sent_at.is_none());

    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Sent);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_audience_leaves_campaign_untouched(pool: PgPool) {
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::default());

    let result = dispatcher(&pool, provider.clone()).dispatch(campaign.id).await;
    assert_matches!(result, Err(DispatchError::Core(CoreError::EmptyAudience)));
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Draft);
    assert!(provider.sent().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_campaign_is_not_found(pool: PgPool) {
    let result = dispatcher(&pool, Arc::default()).dispatch(9999).await;
    assert_matches!(result, Err(DispatchError::Core(CoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sent_campaign_cannot_be_sent_again(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::default());
    let dispatcher = dispatcher(&pool, provider.clone());

    dispatcher.dispatch(campaign.id).await.unwrap();
    let again = dispatcher.dispatch(campaign.id).await;

    assert_matches!(again, Err(DispatchError::Core(CoreError::Conflict(_))));
    assert_eq!(provider.sent().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn claimed_campaign_reports_already_in_progress(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    CampaignRepo::claim(&pool, campaign.id).await.unwrap().unwrap();
    let provider = Arc::new(RecordingProvider::default());

    let outcome = dispatcher(&pool, provider.clone()).dispatch(campaign.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::AlreadyInProgress);
    assert!(provider.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Test send
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_send_uses_placeholder_name_and_writes_no_log(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::default());

    dispatcher(&pool, provider.clone())
        .send_test(campaign.id, " QA@Empodhera.com ")
        .await
        .unwrap();

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["qa@empodhera.com"]);
    assert_eq!(sent[0].subject, "[TESTE] Olá");
    assert_eq!(sent[0].html, "Oi Teste!");

    assert!(EmailLogRepo::list_for_campaign(&pool, campaign.id).await.unwrap().is_empty());
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Draft);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_send_surfaces_provider_errors(pool: PgPool) {
    let campaign = seed_campaign(&pool).await;
    let provider = Arc::new(RecordingProvider::rejecting(&["qa@x.com"]));

    let result = dispatcher(&pool, provider).send_test(campaign.id, "qa@x.com").await;
    assert_matches!(result, Err(DispatchError::Provider(ProviderError::Rejected { status: 422, .. })));

    let invalid = dispatcher(&pool, Arc::default()).send_test(campaign.id, "nope").await;
    assert_matches!(invalid, Err(DispatchError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

async fn make_due(pool: &PgPool, id: i64) {
    CampaignRepo::schedule(pool, id, Utc::now() - chrono::Duration::minutes(1))
        .await
        .unwrap()
        .unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn two_polls_dispatch_a_due_campaign_once(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    make_due(&pool, campaign.id).await;
    let provider = Arc::new(RecordingProvider::default());
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, provider.clone()),
        SchedulerConfig::default(),
    );

    let (first, second) = tokio::join!(scheduler.process_due(), scheduler.process_due());
    let results: Vec<_> = first
        .unwrap()
        .results
        .into_iter()
        .chain(second.unwrap().results)
        .collect();

    assert_eq!(provider.sent().len(), 1);
    let sent = results.iter().filter(|r| r.status == PollStatus::Sent).count();
    assert_eq!(sent, 1);
    assert!(results.iter().all(|r| r.status != PollStatus::Error));

    let third = scheduler.process_due().await.unwrap();
    assert_eq!(third.processed, 0);
    assert_eq!(third.message, "No campaigns to process");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn zero_interval_scheduler_stops_instead_of_panicking(pool: PgPool) {
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, Arc::new(RecordingProvider::default())),
        SchedulerConfig {
            interval: Duration::ZERO,
            ..SchedulerConfig::default()
        },
    );

    let run = scheduler.run(tokio_util::sync::CancellationToken::new());
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("scheduler returned");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn future_schedules_are_left_alone(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    CampaignRepo::schedule(&pool, campaign.id, Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    let provider = Arc::new(RecordingProvider::default());
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, provider.clone()),
        SchedulerConfig::default(),
    );

    let report = scheduler.process_due().await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Scheduled);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn poll_records_empty_audience_as_error(pool: PgPool) {
    let campaign = seed_campaign(&pool).await;
    make_due(&pool, campaign.id).await;
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, Arc::default()),
        SchedulerConfig::default(),
    );

    let report = scheduler.process_due().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.results[0].status, PollStatus::Error);
    assert!(report.results[0].error.is_some());
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Scheduled);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stalled_campaign_resumes_with_unsent_contacts_only(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    seed_contact(&pool, "bia@x.com", Some("Bia")).await;
    let campaign = seed_campaign(&pool).await;
    CampaignRepo::claim(&pool, campaign.id).await.unwrap().unwrap();

    // Simulate a crash after Ana was served.
    let ana = ContactRepo::find_by_email(&pool, "ana@x.com").await.unwrap().unwrap();
    EmailLogRepo::create(
        &pool,
        &empodhera_db::models::campaign::CreateEmailLog {
            campaign_id: campaign.id,
            contact_id: ana.id,
            status: EmailLogStatus::Sent,
            error_message: None,
        },
    )
    .await
    .unwrap();
    sqlx::query("UPDATE campaigns SET heartbeat_at = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(campaign.id)
        .execute(&pool)
        .await
        .unwrap();

    let provider = Arc::new(RecordingProvider::default());
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, provider.clone()),
        SchedulerConfig::default(),
    );

    let report = scheduler.process_due().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.results[0].status, PollStatus::Sent);
    assert_eq!(report.results[0].sent, Some(1));

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["bia@x.com"]);
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Sent);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fresh_sending_campaign_is_not_resumed(pool: PgPool) {
    seed_contact(&pool, "ana@x.com", Some("Ana")).await;
    let campaign = seed_campaign(&pool).await;
    CampaignRepo::claim(&pool, campaign.id).await.unwrap().unwrap();
    let provider = Arc::new(RecordingProvider::default());
    let scheduler = CampaignScheduler::new(
        pool.clone(),
        dispatcher(&pool, provider.clone()),
        SchedulerConfig::default(),
    );

    let report = scheduler.process_due().await.unwrap();
    assert_eq!(report.processed, 0);
    assert!(provider.sent().is_empty());
    assert_eq!(status_of(&pool, campaign.id).await, CampaignStatus::Sending);
}
