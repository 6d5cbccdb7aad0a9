use std::time::Duration;

use async_trait::async_trait;
use eshop_deals_core::{DeliveryError, NotificationSink, WebhookPayload};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

/// Posts `{ "text": ... }` to a Slack incoming webhook.
pub struct WebhookSink {
    client: reqwest::Client,
    webhook_url: SecretString,
}

impl WebhookSink {
    pub fn new(webhook_url: SecretString, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;
        Ok(Self { client, webhook_url })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        debug!(bytes = payload.text.len(), "posting slack webhook");

        let response = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(payload)
            .send()
            .await
            // reqwest errors can echo the URL, which carries the webhook secret.
            .map_err(|error| DeliveryError::Transport(error.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "slack webhook rejected payload");
            return Err(DeliveryError::Status { status: status.as_u16(), body });
        }

        Ok(())
    }
}
