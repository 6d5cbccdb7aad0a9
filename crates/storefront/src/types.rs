//! Wire shapes of the storefront endpoints and their mapping to domain types.

use chrono::{DateTime, Utc};
use eshop_deals_core::{CatalogEntry, DiscountPrice, PriceRecord, PriceResponse, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Solr-style search envelope returned by the Europe catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub response: SearchBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchBody {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<GameDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameDoc {
    pub title: String,
    #[serde(default)]
    pub nsuid_txt: Vec<String>,
    #[serde(default)]
    pub price_has_discount_b: bool,
    pub price_sorting_f: Option<Decimal>,
}

impl GameDoc {
    /// Games without an nsuid cannot be priced and are left out.
    pub fn into_entry(self) -> Option<CatalogEntry> {
        let product_id = self.nsuid_txt.into_iter().map(|id| id.trim().to_owned()).next()?;
        if product_id.is_empty() {
            return None;
        }
        Some(CatalogEntry {
            title: self.title,
            product_id: ProductId(product_id),
            has_discount: self.price_has_discount_b,
            sorting_price: self.price_sorting_f.unwrap_or(Decimal::ZERO),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceEnvelope {
    #[serde(default)]
    pub prices: Vec<WirePrice>,
}

/// The feed sends numeric ids; some mirrors send them quoted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for ProductId {
    fn from(value: WireId) -> Self {
        match value {
            WireId::Number(number) => ProductId(number.to_string()),
            WireId::Text(text) => ProductId(text.trim().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePrice {
    pub title_id: WireId,
    pub sales_status: Option<String>,
    pub regular_price: Option<WireAmount>,
    pub discount_price: Option<WireDiscount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAmount {
    pub raw_value: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDiscount {
    pub raw_value: Decimal,
    pub end_datetime: DateTime<Utc>,
}

impl WirePrice {
    /// `not_found` entries carry no regular price and map to no record.
    pub fn into_record(self) -> Option<PriceRecord> {
        let regular_price = self.regular_price?.raw_value;
        Some(PriceRecord {
            product_id: self.title_id.into(),
            regular_price,
            discount_price: self.discount_price.map(|discount| DiscountPrice {
                amount: discount.raw_value,
                end_datetime: discount.end_datetime,
            }),
        })
    }
}

impl From<PriceEnvelope> for PriceResponse {
    fn from(envelope: PriceEnvelope) -> Self {
        PriceResponse::new(envelope.prices.into_iter().filter_map(WirePrice::into_record).collect())
    }
}
