//! Slack delivery for price notifications.
//!
//! [`WebhookSink`] is the production [`eshop_deals_core::NotificationSink`]:
//! one incoming-webhook POST per run, body `{ "text": "<lines>" }`.
//! Set `ESHOP_DEALS_SLACK_WEBHOOK_URL` (or the legacy `SLACK_WEBHOOK`).

pub mod webhook;

pub use webhook::WebhookSink;
