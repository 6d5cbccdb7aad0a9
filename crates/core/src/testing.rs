//! In-memory collaborators for tests and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::catalog::{CatalogEntry, ProductId, Region};
use crate::domain::price::{Locale, PriceRecord, PriceResponse};
use crate::providers::{
    CatalogProvider, DeliveryError, LookupError, NotificationSink, PriceProvider, WebhookPayload,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
    failure: Option<LookupError>,
    regions: Mutex<Vec<Region>>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries, ..Self::default() }
    }

    pub fn failing(error: LookupError) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    pub fn call_count(&self) -> usize {
        lock(&self.regions).len()
    }

    pub fn requested_regions(&self) -> Vec<Region> {
        lock(&self.regions).clone()
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn fetch_catalog(&self, region: Region) -> Result<Vec<CatalogEntry>, LookupError> {
        lock(&self.regions).push(region);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.entries.clone()),
        }
    }
}

/// Price feed double. Records every batch it is asked for and can delay
/// answers per product id to force out-of-order completion.
#[derive(Default)]
pub struct StaticPrices {
    records: Vec<PriceRecord>,
    failure: Option<LookupError>,
    delays: HashMap<ProductId, Duration>,
    requests: Mutex<Vec<(Locale, Vec<ProductId>)>>,
}

impl StaticPrices {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records, ..Self::default() }
    }

    pub fn failing(error: LookupError) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    pub fn with_delay(mut self, product_id: impl Into<ProductId>, delay: Duration) -> Self {
        self.delays.insert(product_id.into(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests(&self) -> Vec<(Locale, Vec<ProductId>)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PriceProvider for StaticPrices {
    async fn fetch_prices(
        &self,
        locale: &Locale,
        product_ids: &[ProductId],
    ) -> Result<PriceResponse, LookupError> {
        lock(&self.requests).push((locale.clone(), product_ids.to_vec()));

        let delay = product_ids.iter().filter_map(|id| self.delays.get(id)).max().copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let prices = self
            .records
            .iter()
            .filter(|record| product_ids.contains(&record.product_id))
            .cloned()
            .collect();
        Ok(PriceResponse::new(prices))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    failure: Option<DeliveryError>,
    payloads: Mutex<Vec<WebhookPayload>>,
}

impl RecordingSink {
    pub fn failing(error: DeliveryError) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    pub fn payloads(&self) -> Vec<WebhookPayload> {
        lock(&self.payloads).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        lock(&self.payloads).push(payload.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
