//! HTTP catalog and price lookups for the eShop.
//!
//! [`StorefrontClient`] implements both [`CatalogProvider`] and
//! [`PriceProvider`]. Only the Europe catalog is wired to a data source;
//! other regions fail with [`LookupError::UnsupportedRegion`].

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use eshop_deals_core::config::StorefrontConfig;
use eshop_deals_core::{
    CatalogEntry, CatalogProvider, Locale, LookupError, PriceProvider, PriceResponse, ProductId,
    Region,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::types::{PriceEnvelope, SearchResponse};

/// The price endpoint answers at most this many ids per request.
pub const PRICE_BATCH_LIMIT: usize = 50;

const CATALOG_FILTER: &str = "type:GAME AND system_type:nintendoswitch* AND product_code_txt:*";

#[derive(Clone, Debug)]
pub struct StorefrontSettings {
    pub search_base_url: String,
    pub price_base_url: String,
    pub timeout: Duration,
    pub max_rows: u32,
}

impl From<&StorefrontConfig> for StorefrontSettings {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            search_base_url: config.search_base_url.trim_end_matches('/').to_owned(),
            price_base_url: config.price_base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_rows: config.max_rows,
        }
    }
}

pub struct StorefrontClient {
    client: reqwest::Client,
    settings: StorefrontSettings,
}

impl StorefrontClient {
    pub fn new(settings: StorefrontSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| LookupError::Transport(error.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self, LookupError> {
        Self::new(StorefrontSettings::from(config))
    }

    pub fn catalog_url(&self, region: Region) -> Result<String, LookupError> {
        match region {
            Region::Europe => Ok(format!("{}/en/select", self.settings.search_base_url)),
            Region::Americas | Region::Asia => Err(LookupError::UnsupportedRegion(region)),
        }
    }

    pub fn price_url(&self) -> String {
        format!("{}/v1/price", self.settings.price_base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LookupError> {
        let response =
            request.send().await.map_err(|error| LookupError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status: status.as_u16(), body });
        }

        response.json::<T>().await.map_err(|error| LookupError::Decode(error.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for StorefrontClient {
    async fn fetch_catalog(&self, region: Region) -> Result<Vec<CatalogEntry>, LookupError> {
        let url = self.catalog_url(region)?;
        let rows = self.settings.max_rows.to_string();
        let request = self.client.get(&url).query(&[
            ("q", "*"),
            ("fq", CATALOG_FILTER),
            ("sort", "sorting_title asc"),
            ("start", "0"),
            ("rows", rows.as_str()),
            ("wt", "json"),
        ]);

        let search: SearchResponse = self.get_json(request).await?;
        let found = search.response.num_found;
        let documents = search.response.docs.len();
        let entries: Vec<CatalogEntry> =
            search.response.docs.into_iter().filter_map(|doc| doc.into_entry()).collect();

        info!(
            event_name = "storefront.catalog.fetched",
            region = %region,
            found,
            documents,
            entries = entries.len(),
            "catalog fetched"
        );
        Ok(entries)
    }
}

#[async_trait]
impl PriceProvider for StorefrontClient {
    async fn fetch_prices(
        &self,
        locale: &Locale,
        product_ids: &[ProductId],
    ) -> Result<PriceResponse, LookupError> {
        debug!(locale = %locale, count = product_ids.len(), "requesting prices");

        let mut prices = Vec::with_capacity(product_ids.len());
        let mut requests = 0_usize;
        for chunk in product_ids.chunks(PRICE_BATCH_LIMIT) {
            let ids = chunk.iter().map(ProductId::as_str).collect::<Vec<_>>().join(",");
            let request = self.client.get(self.price_url()).query(&[
                ("country", locale.as_str()),
                ("lang", "en"),
                ("ids", ids.as_str()),
            ]);

            let envelope: PriceEnvelope = self.get_json(request).await?;
            prices.extend(PriceResponse::from(envelope).prices);
            requests += 1;
        }

        let response = PriceResponse::new(prices);
        info!(
            event_name = "storefront.prices.fetched",
            locale = %locale,
            requested = product_ids.len(),
            returned = response.prices.len(),
            requests,
            "prices fetched"
        );
        Ok(response)
    }
}
