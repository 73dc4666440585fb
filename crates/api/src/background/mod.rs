//! Background tasks owned by the API process.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown.
//!
//! The campaign poller lives in `empodhera_mailer::CampaignScheduler` and is
//! spawned from `main` next to these.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod session_cleanup;
