//! Storefront price lookups rendered as chat notifications.
//!
//! A run resolves one [`Query`] against the storefront catalog, formats a
//! price line per matching title and posts the lines as one webhook message:
//!
//! ```text
//! Query → QueryResolver → CatalogProvider
//!                ↓
//!          PriceFormatter → PriceProvider (one batched lookup)
//!                ↓
//!            Notifier → NotificationSink
//! ```
//!
//! Collaborators are traits in [`providers`]; the HTTP implementations live
//! in the `eshop-deals-storefront` and `eshop-deals-slack` crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod notify;
pub mod providers;
pub mod resolver;
pub mod runner;
pub mod testing;

pub use domain::catalog::{Catalog, CatalogEntry, ProductId, Region};
pub use domain::price::{DiscountPrice, Locale, PriceRecord, PriceResponse};
pub use domain::query::{Query, QueryMode};
pub use errors::{ApplicationError, DomainError, InterfaceError, ResolveError};
pub use format::{DisplayLine, LinePricing, PriceFormatter};
pub use notify::{DeliveryPolicy, Notifier, NotifierSettings, NotifyOutcome, SuppressReason};
pub use providers::{
    CatalogProvider, DeliveryError, LookupError, NotificationSink, PriceProvider, WebhookPayload,
};
pub use resolver::{QueryResolver, ResolverSettings};
pub use runner::{run_query, RunReport};
