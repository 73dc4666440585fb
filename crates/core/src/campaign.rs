//! Email campaign lifecycle and template personalisation.
//!
//! A campaign moves through a closed set of statuses:
//!
//! ```text
//! draft ──schedule──▶ scheduled ──cancel──▶ draft
//!   │                    │  ▲
//!   │                    └──┘ reschedule
//!   └──claim──▶ sending ◀──claim── scheduled
//!                 │  ▲
//!                 │  └── stale reclaim
//!                 └──complete──▶ sent
//! ```
//!
//! Every transition site matches on [`CampaignStatus`] exhaustively so a new
//! status cannot be added without revisiting them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// The only interpolation token supported in campaign templates.
pub const NAME_PLACEHOLDER: &str = "{{nome}}";

/// Name substituted for [`NAME_PLACEHOLDER`] in test sends.
pub const TEST_RECIPIENT_NAME: &str = "Teste";

/// Prefix added to the subject of test sends.
pub const TEST_SUBJECT_PREFIX: &str = "[TESTE] ";

/// Default pause between two recipients of the same campaign.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(100);

/// Refresh `heartbeat_at` after this many recipients.
pub const HEARTBEAT_EVERY: usize = 25;

/// Refresh `heartbeat_at` once it is this old, however few recipients went
/// out. The stale window must exceed this plus one provider timeout.
pub const HEARTBEAT_MAX_AGE: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Campaign status
// ---------------------------------------------------------------------------

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
}

/// What a status change is trying to do. Used to validate transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignAction {
    /// Set a future `scheduled_at`.
    Schedule,
    /// Clear `scheduled_at` and return to draft.
    CancelSchedule,
    /// Start dispatching.
    Claim,
    /// Dispatch loop finished.
    Complete,
    /// Change title, subject or body.
    Edit,
    /// Remove the campaign and its logs.
    Delete,
}

impl CampaignStatus {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Sending => "sending",
            Self::Sent => "sent",
        }
    }

    /// Status reached by applying `action`, or a `Conflict` error if the
    /// action is not allowed from `self`.
    pub fn apply(self, action: CampaignAction) -> Result<CampaignStatus, CoreError> {
        use CampaignAction as A;
        use CampaignStatus as S;

        let next = match (self, action) {
            (S::Draft | S::Scheduled, A::Schedule) => Some(S::Scheduled),
            (S::Scheduled, A::CancelSchedule) => Some(S::Draft),
            (S::Draft | S::Scheduled, A::Claim) => Some(S::Sending),
            (S::Sending, A::Complete) => Some(S::Sent),
            (S::Draft, A::Edit) => Some(S::Draft),
            (S::Draft | S::Scheduled | S::Sent, A::Delete) => Some(self),
            (S::Sending | S::Sent, A::Schedule)
            | (S::Draft | S::Sending | S::Sent, A::CancelSchedule)
            | (S::Sending | S::Sent, A::Claim)
            | (S::Draft | S::Scheduled | S::Sent, A::Complete)
            | (S::Scheduled | S::Sending | S::Sent, A::Edit)
            | (S::Sending, A::Delete) => None,
        };

        next.ok_or_else(|| {
            CoreError::Conflict(format!(
                "Cannot {} a campaign with status '{}'",
                action.verb(),
                self
            ))
        })
    }

    /// Statuses from which a dispatcher may claim the campaign.
    pub fn claimable() -> [CampaignStatus; 2] {
        [CampaignStatus::Draft, CampaignStatus::Scheduled]
    }
}

impl CampaignAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::CancelSchedule => "cancel the schedule of",
            Self::Claim => "send",
            Self::Complete => "complete",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            other => Err(CoreError::Validation(format!(
                "Unknown campaign status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for CampaignStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Email log status
// ---------------------------------------------------------------------------

/// Outcome recorded for one recipient of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailLogStatus {
    Sent,
    Failed,
}

impl EmailLogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EmailLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EmailLogStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown email log status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Personalisation
// ---------------------------------------------------------------------------

/// Replace every occurrence of [`NAME_PLACEHOLDER`] with `name`.
///
/// A missing name becomes the empty string. This is a plain global string
/// replace: no escaping and no other tokens.
pub fn personalize(template: &str, name: Option<&str>) -> String {
    template.replace(NAME_PLACEHOLDER, name.unwrap_or(""))
}

/// Subject line used for a test send.
pub fn test_subject(subject: &str) -> String {
    format!("{TEST_SUBJECT_PREFIX}{subject}")
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Reject a `scheduled_at` that is not strictly after `now`.
pub fn validate_schedule(scheduled_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if scheduled_at <= now {
        return Err(CoreError::Validation(
            "scheduled_at must be in the future".into(),
        ));
    }
    Ok(())
}

/// Heartbeats older than the returned instant are stale.
pub fn stale_cutoff(now: Timestamp, stale_after: Duration) -> Timestamp {
    chrono::Duration::from_std(stale_after)
        .ok()
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(Timestamp::MIN_UTC)
}

/// Whether a `sending` campaign's heartbeat is older than `stale_after`.
///
/// A missing heartbeat counts as stale.
pub fn is_stale(heartbeat_at: Option<Timestamp>, now: Timestamp, stale_after: Duration) -> bool {
    match heartbeat_at {
        Some(at) => at < stale_cutoff(now, stale_after),
        None => true,
    }
}

/// Whether a dispatch loop should refresh its heartbeat, given the recipients
/// handled and the time elapsed since the last refresh.
pub fn heartbeat_due(handled_since: usize, elapsed: Duration) -> bool {
    handled_since >= HEARTBEAT_EVERY || elapsed >= HEARTBEAT_MAX_AGE
}
