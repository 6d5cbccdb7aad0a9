use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::ProductId;
use crate::errors::DomainError;

/// Two-letter storefront country code used by the price feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale(String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("FI".to_owned())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(DomainError::InvalidLocale(value.to_owned()))
        }
    }
}

/// An active, time-boxed discount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPrice {
    pub amount: Decimal,
    pub end_datetime: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub product_id: ProductId,
    pub regular_price: Decimal,
    pub discount_price: Option<DiscountPrice>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub prices: Vec<PriceRecord>,
}

impl PriceResponse {
    pub fn new(prices: Vec<PriceRecord>) -> Self {
        Self { prices }
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&PriceRecord> {
        self.prices.iter().find(|record| &record.product_id == product_id)
    }
}
