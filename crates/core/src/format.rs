//! Joins catalog entries to price records and renders one display line each.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::catalog::{CatalogEntry, ProductId};
use crate::domain::price::{Locale, PriceRecord};
use crate::providers::{LookupError, PriceProvider};

/// Which pricing branch produced a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePricing {
    Regular,
    Discounted,
    /// Catalog flags a discount but the price feed has no discount sub-record.
    DegradedDiscount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLine {
    pub text: String,
    pub pricing: LinePricing,
}

impl DisplayLine {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_on_sale(&self) -> bool {
        matches!(self.pricing, LinePricing::Discounted | LinePricing::DegradedDiscount)
    }
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub struct PriceFormatter {
    prices: Arc<dyn PriceProvider>,
    locale: Locale,
}

impl PriceFormatter {
    pub fn new(prices: Arc<dyn PriceProvider>, locale: Locale) -> Self {
        Self { prices, locale }
    }

    /// Renders `entries` in order with a single batched price lookup.
    /// An empty slice renders nothing and never touches the price feed.
    pub async fn render(&self, entries: &[CatalogEntry]) -> Result<Vec<DisplayLine>, LookupError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<ProductId> =
            entries.iter().map(|entry| entry.product_id.clone()).collect();
        let response = self.prices.fetch_prices(&self.locale, &product_ids).await?;
        debug!(
            event_name = "core.format.prices_fetched",
            locale = %self.locale,
            requested = product_ids.len(),
            returned = response.prices.len(),
            "price lookup completed"
        );

        Ok(entries.iter().map(|entry| render_line(entry, response.find(&entry.product_id))).collect())
    }

    /// Single-title form: no entry means no output.
    pub async fn render_one(
        &self,
        entry: Option<&CatalogEntry>,
    ) -> Result<Vec<DisplayLine>, LookupError> {
        match entry {
            Some(entry) => self.render(std::slice::from_ref(entry)).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Picks the pricing branch for one entry. Never fails; inconsistent data
/// degrades to the entry's sorting price.
pub fn render_line(entry: &CatalogEntry, record: Option<&PriceRecord>) -> DisplayLine {
    if !entry.has_discount {
        return regular_line(entry);
    }

    let Some(record) = record else {
        warn!(
            event_name = "core.format.price_missing",
            product_id = %entry.product_id,
            title = %entry.title,
            "discounted entry has no price record; using sorting price"
        );
        return regular_line(entry);
    };

    match &record.discount_price {
        Some(discount) => DisplayLine {
            text: format!(
                "*{}: €{}* until {}, normal price: €{}",
                entry.title,
                format_amount(discount.amount),
                format_end_date(&discount.end_datetime),
                format_amount(record.regular_price),
            ),
            pricing: LinePricing::Discounted,
        },
        None => {
            warn!(
                event_name = "core.format.discount_missing",
                product_id = %entry.product_id,
                title = %entry.title,
                "catalog flags a discount the price feed does not carry"
            );
            let sorting = format_amount(entry.sorting_price);
            DisplayLine {
                text: format!(
                    "*{}: €{sorting}* until unknown, normal price: €{sorting}",
                    entry.title
                ),
                pricing: LinePricing::DegradedDiscount,
            }
        }
    }
}

fn regular_line(entry: &CatalogEntry) -> DisplayLine {
    DisplayLine {
        text: format!("*{}*: normal price: *€{}*", entry.title, format_amount(entry.sorting_price)),
        pricing: LinePricing::Regular,
    }
}

/// `day/month/year` in UTC, month 1-indexed, no padding.
pub fn format_end_date(end: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", end.day(), end.month(), end.year())
}

pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}
