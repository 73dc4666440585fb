//! A configured email provider with its sender address and throttle.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{MailBackend, MailConfig};
use crate::error::ProviderError;
use crate::provider::{EmailProvider, OutgoingEmail, ResendProvider, SmtpProvider};

/// Sends single-recipient mail from the configured sender.
#[derive(Clone)]
pub struct Mailer {
    provider: Arc<dyn EmailProvider>,
    from: String,
    send_delay: Duration,
}

impl Mailer {
    pub fn new(provider: Arc<dyn EmailProvider>, from: impl Into<String>, send_delay: Duration) -> Self {
        Self {
            provider,
            from: from.into(),
            send_delay,
        }
    }

    /// Build the provider selected by `config`.
    ///
    /// Returns `Ok(None)` when no backend is configured.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>, ProviderError> {
        let provider: Arc<dyn EmailProvider> = match &config.backend {
            None => return Ok(None),
            Some(MailBackend::Resend { api_key, api_url }) => Arc::new(ResendProvider::new(
                api_key.clone(),
                api_url.clone(),
                config.timeout,
            )?),
            Some(MailBackend::Smtp {
                host,
                port,
                user,
                password,
            }) => Arc::new(SmtpProvider::new(
                host,
                *port,
                user.as_deref(),
                password.as_deref(),
                config.timeout,
            )?),
        };
        Ok(Some(Self::new(provider, config.from.clone(), config.send_delay)))
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Pause the dispatcher takes between two recipients.
    pub fn send_delay(&self) -> Duration {
        self.send_delay
    }

    /// Send one HTML message to one recipient.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, ProviderError> {
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };
        self.provider.send(&email).await
    }
}
