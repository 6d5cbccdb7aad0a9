use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::query::QueryMode;
use crate::format::DisplayLine;
use crate::providers::{NotificationSink, WebhookPayload};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Deliver whenever at least one line resulted.
    NonEmpty,
    /// Deliver only if at least one line is a sale.
    OnSaleOnly,
}

impl From<QueryMode> for DeliveryPolicy {
    fn from(mode: QueryMode) -> Self {
        match mode {
            QueryMode::Watchlist => Self::OnSaleOnly,
            _ => Self::NonEmpty,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    NoContent,
    NothingOnSale,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoContent => "no_content",
            Self::NothingOnSale => "nothing_on_sale",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotifyOutcome {
    Delivered { lines: usize },
    Suppressed { reason: SuppressReason },
    Failed { reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifierSettings {
    /// Optional first line of every message.
    pub header: Option<String>,
}

impl From<&AppConfig> for NotifierSettings {
    fn from(config: &AppConfig) -> Self {
        Self { header: config.notifier.header.clone() }
    }
}

pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    header: Option<String>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, settings: NotifierSettings) -> Self {
        Self { sink, header: settings.header.filter(|header| !header.trim().is_empty()) }
    }

    /// Message body for `lines`, or `None` when there is nothing to say.
    pub fn compose(&self, lines: &[DisplayLine]) -> Option<WebhookPayload> {
        if lines.is_empty() {
            return None;
        }

        let body = lines.iter().map(DisplayLine::as_str).collect::<Vec<_>>().join("\n");
        let text = match &self.header {
            Some(header) => format!("{header}\n{body}"),
            None => body,
        };
        Some(WebhookPayload { text })
    }

    /// Posts one message for `lines`. Empty results are never delivered.
    /// Delivery failures are logged and reported, not raised.
    pub async fn notify(&self, lines: &[DisplayLine], policy: DeliveryPolicy) -> NotifyOutcome {
        if policy == DeliveryPolicy::OnSaleOnly
            && !lines.is_empty()
            && !lines.iter().any(DisplayLine::is_on_sale)
        {
            info!(
                event_name = "core.notify.suppressed",
                reason = "nothing_on_sale",
                lines = lines.len(),
                "no watched title is on sale; skipping notification"
            );
            return NotifyOutcome::Suppressed { reason: SuppressReason::NothingOnSale };
        }

        let Some(payload) = self.compose(lines) else {
            info!(
                event_name = "core.notify.suppressed",
                reason = "no_content",
                "nothing to notify"
            );
            return NotifyOutcome::Suppressed { reason: SuppressReason::NoContent };
        };

        match self.sink.post(&payload).await {
            Ok(()) => {
                info!(event_name = "core.notify.delivered", lines = lines.len(), "notification sent");
                NotifyOutcome::Delivered { lines: lines.len() }
            }
            Err(delivery_error) => {
                error!(
                    event_name = "core.notify.failed",
                    error = %delivery_error,
                    "notification delivery failed"
                );
                NotifyOutcome::Failed { reason: delivery_error.to_string() }
            }
        }
    }
}
