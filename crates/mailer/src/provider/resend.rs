//! Resend HTTP API provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{EmailProvider, OutgoingEmail};
use crate::error::ProviderError;

/// Sends mail through `POST {api_url}` with bearer authentication.
pub struct ResendProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

impl ResendProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // Accepted. The message id is informational, so an unreadable body
        // still counts as delivered.
        let id = response
            .json::<SendResponse>()
            .await
            .map(|parsed| parsed.id)
            .unwrap_or_default();
        Ok(id)
    }
}
