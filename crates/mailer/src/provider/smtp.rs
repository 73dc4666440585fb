//! SMTP provider built on the `lettre` async transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailProvider, OutgoingEmail};
use crate::error::ProviderError;

/// Sends HTML mail through a STARTTLS relay.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpProvider {
    pub fn new(
        host: &str,
        port: u16,
        user: Option<&str>,
        password: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .timeout(Some(timeout));

        if let (Some(user), Some(pass)) = (user, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Assemble the MIME message for `email`.
fn build_message(email: &OutgoingEmail) -> Result<Message, ProviderError> {
    let mut builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML);
    for to in &email.to {
        builder = builder.to(to.parse()?);
    }
    builder
        .body(email.html.clone())
        .map_err(|e| ProviderError::Build(e.to_string()))
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        let message = build_message(email)?;
        let response = self.transport.send(message).await?;
        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}
