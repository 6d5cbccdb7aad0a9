use async_trait::async_trait;
use eshop_deals_core::{DeliveryError, NotificationSink, WebhookPayload};
use tracing::info;

/// Logs the message instead of posting it, for `run --dry-run`.
#[derive(Debug, Default)]
pub struct DryRunSink;

#[async_trait]
impl NotificationSink for DryRunSink {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        info!(
            event_name = "cli.run.dry_run",
            bytes = payload.text.len(),
            text = %payload.text,
            "dry run: notification not posted"
        );
        Ok(())
    }
}
