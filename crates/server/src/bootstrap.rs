use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use eshop_deals_core::config::{AppConfig, ConfigError};
use eshop_deals_core::{DeliveryError, LookupError};
use eshop_deals_slack::WebhookSink;
use eshop_deals_storefront::StorefrontClient;
use thiserror::Error;
use tracing::info;

use crate::health;
use crate::invoke::{self, InvokeState};

pub struct Application {
    pub config: AppConfig,
    pub state: InvokeState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("storefront client setup failed: {0}")]
    Storefront(#[source] LookupError),
    #[error("webhook client setup failed: {0}")]
    Webhook(#[source] DeliveryError),
}

impl Application {
    pub fn router(&self) -> Router {
        let storefront = &self.config.storefront;
        health::router(storefront.region, storefront.locale.clone())
            .merge(invoke::router(self.state.clone()))
    }
}

/// The hosted surface always posts, so a webhook is mandatory here.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        region = %config.storefront.region,
        locale = %config.storefront.locale,
        "starting application bootstrap"
    );

    let storefront = Arc::new(
        StorefrontClient::from_config(&config.storefront).map_err(BootstrapError::Storefront)?,
    );
    let webhook_url = config.require_webhook_url()?.clone();
    let sink = Arc::new(
        WebhookSink::new(webhook_url, Duration::from_secs(config.slack.timeout_secs))
            .map_err(BootstrapError::Webhook)?,
    );

    let state = InvokeState::new(storefront.clone(), storefront, sink, &config);
    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        watchlist = config.query.watchlist.len(),
        "storefront and webhook clients initialized"
    );

    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use eshop_deals_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::{bootstrap_with_config, BootstrapError};

    #[test]
    fn bootstrap_requires_a_webhook() {
        let result = bootstrap_with_config(AppConfig::default());
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[test]
    fn bootstrap_builds_clients_from_config() {
        let config = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: ConfigOverrides {
                webhook_url: Some("https://hooks.slack.com/services/T/B/X".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load");

        let app = bootstrap_with_config(config).expect("bootstrap should succeed");
        assert_eq!(app.config.server.port, 8080);
        let _router = app.router();
    }
}
