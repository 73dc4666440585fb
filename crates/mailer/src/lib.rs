//! Outbound email for the EMPODHERA back-office.
//!
//! - [`provider`]: the [`EmailProvider`] boundary with Resend (HTTP) and SMTP
//!   implementations.
//! - [`Mailer`]: a configured provider plus sender address and throttle.
//! - [`Dispatcher`]: sends one campaign to every contact and logs outcomes.
//! - [`CampaignScheduler`]: periodic poller for due and stalled campaigns.
//! - [`templates`]: transactional emails (waiting list, workbook welcome).

pub mod config;
pub mod dispatch;
pub mod error;
pub mod mailer;
pub mod provider;
pub mod scheduler;
pub mod templates;

pub use config::{MailConfig, SchedulerConfig};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{DispatchError, ProviderError};
pub use mailer::Mailer;
pub use provider::{EmailProvider, OutgoingEmail};
pub use scheduler::{CampaignScheduler, PollReport, PollResult, PollStatus};
