//! Email provider boundary.
//!
//! A provider accepts one fully rendered message and reports either the
//! provider's message id or a [`ProviderError`]. No retries happen here.

mod resend;
mod smtp;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

pub use resend::ResendProvider;
pub use smtp::SmtpProvider;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver `email`, returning the provider's message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError>;
}
