//! Collaborator seams: catalog and price lookups, and the chat webhook sink.
//!
//! Production implementations live in the `storefront` and `slack` crates;
//! [`crate::testing`] has in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::{CatalogEntry, ProductId, Region};
use crate::domain::price::{Locale, PriceResponse};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("storefront returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response could not be decoded: {0}")]
    Decode(String),
    #[error("no catalog source is available for region `{0}`")]
    UnsupportedRegion(Region),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(String),
    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_catalog(&self, region: Region) -> Result<Vec<CatalogEntry>, LookupError>;
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_prices(
        &self,
        locale: &Locale,
        product_ids: &[ProductId],
    ) -> Result<PriceResponse, LookupError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub text: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError>;
}
