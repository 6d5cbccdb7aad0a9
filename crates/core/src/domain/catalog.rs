use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Opaque storefront product identifier. Compared as-is, never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Americas,
    Europe,
    Asia,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Americas => "americas",
            Self::Europe => "europe",
            Self::Asia => "asia",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "americas" | "america" => Ok(Self::Americas),
            "europe" => Ok(Self::Europe),
            "asia" | "japan" => Ok(Self::Asia),
            other => Err(DomainError::UnknownRegion(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub product_id: ProductId,
    pub has_discount: bool,
    /// Nominal list price, used whenever no better price is known.
    pub sorting_price: Decimal,
}

impl CatalogEntry {
    pub fn new(
        title: impl Into<String>,
        product_id: impl Into<ProductId>,
        has_discount: bool,
        sorting_price: Decimal,
    ) -> Self {
        Self { title: title.into(), product_id: product_id.into(), has_discount, sorting_price }
    }

    /// `prefix` must already be lowercased.
    fn title_starts_with(&self, prefix: &str) -> bool {
        self.title.to_lowercase().starts_with(prefix)
    }
}

/// One region's catalog as returned by a single lookup.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// First entry whose title starts with `title`, ignoring case.
    /// A blank title never matches.
    pub fn find_title(&self, title: &str) -> Option<&CatalogEntry> {
        let prefix = normalize_title(title)?;
        self.entries.iter().find(|entry| entry.title_starts_with(&prefix))
    }

    pub fn search_prefix(&self, title: &str) -> Vec<CatalogEntry> {
        let Some(prefix) = normalize_title(title) else {
            return Vec::new();
        };
        self.entries.iter().filter(|entry| entry.title_starts_with(&prefix)).cloned().collect()
    }

    pub fn discounted(&self) -> Vec<CatalogEntry> {
        self.entries.iter().filter(|entry| entry.has_discount).cloned().collect()
    }
}

fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}
