//! Turns a [`Query`] into display lines: catalog lookup, filtering, formatting.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::catalog::{Catalog, Region};
use crate::domain::price::Locale;
use crate::domain::query::{Query, QueryMode};
use crate::errors::ResolveError;
use crate::format::{DisplayLine, PriceFormatter};
use crate::providers::{CatalogProvider, PriceProvider};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverSettings {
    pub region: Region,
    pub locale: Locale,
    /// Titles used by a watchlist query without an explicit argument.
    pub watchlist: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { region: Region::Europe, locale: Locale::default(), watchlist: Vec::new() }
    }
}

impl From<&AppConfig> for ResolverSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            region: config.storefront.region,
            locale: config.storefront.locale.clone(),
            watchlist: config.query.watchlist.clone(),
        }
    }
}

pub struct QueryResolver {
    catalog: Arc<dyn CatalogProvider>,
    formatter: PriceFormatter,
    region: Region,
    watchlist: Vec<String>,
}

impl QueryResolver {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        prices: Arc<dyn PriceProvider>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            catalog,
            formatter: PriceFormatter::new(prices, settings.locale),
            region: settings.region,
            watchlist: settings.watchlist,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub async fn resolve(&self, query: &Query) -> Result<Vec<DisplayLine>, ResolveError> {
        debug!(mode = %query.mode, argument = %query.argument, "resolving query");

        let lines = match query.mode {
            QueryMode::SingleTitle => self.resolve_title(&query.argument).await?,
            QueryMode::PrefixSearch => {
                let catalog = self.fetch_catalog().await?;
                let matches = catalog.search_prefix(&query.argument);
                debug!(prefix = %query.argument, matches = matches.len(), "prefix search");
                self.formatter.render(&matches).await.map_err(ResolveError::Prices)?
            }
            QueryMode::AllDiscounted => {
                let catalog = self.fetch_catalog().await?;
                let discounted = catalog.discounted();
                debug!(discounted = discounted.len(), "discounted entries selected");
                self.formatter.render(&discounted).await.map_err(ResolveError::Prices)?
            }
            QueryMode::TitleList => self.resolve_titles(&query.titles()).await?,
            QueryMode::Watchlist => {
                let titles = query.titles();
                if titles.is_empty() {
                    self.resolve_titles(&self.watchlist).await?
                } else {
                    self.resolve_titles(&titles).await?
                }
            }
        };

        info!(
            event_name = "core.resolve.completed",
            mode = %query.mode,
            region = %self.region,
            lines = lines.len(),
            "query resolved"
        );
        Ok(lines)
    }

    async fn fetch_catalog(&self) -> Result<Catalog, ResolveError> {
        let entries =
            self.catalog.fetch_catalog(self.region).await.map_err(ResolveError::Catalog)?;
        debug!(region = %self.region, entries = entries.len(), "catalog fetched");
        Ok(Catalog::new(entries))
    }

    async fn resolve_title(&self, title: &str) -> Result<Vec<DisplayLine>, ResolveError> {
        let catalog = self.fetch_catalog().await?;
        let entry = catalog.find_title(title);
        if entry.is_none() {
            debug!(title, "no catalog entry matches title");
        }
        self.formatter.render_one(entry).await.map_err(ResolveError::Prices)
    }

    /// Each title runs the single-title path concurrently; output keeps the
    /// order of `titles`. The first failure fails the whole list.
    async fn resolve_titles(&self, titles: &[String]) -> Result<Vec<DisplayLine>, ResolveError> {
        let per_title = try_join_all(titles.iter().map(|title| self.resolve_title(title))).await?;
        Ok(per_title.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::{QueryResolver, ResolverSettings};
    use crate::domain::catalog::{CatalogEntry, Region};
    use crate::domain::query::Query;
    use crate::errors::ResolveError;
    use crate::providers::LookupError;
    use crate::testing::{StaticCatalog, StaticPrices};

    fn entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("Metroid Dread", "1", false, Decimal::new(5999, 2)),
            CatalogEntry::new("Mario Kart 8", "2", false, Decimal::new(5999, 2)),
            CatalogEntry::new("Mario Odyssey", "3", true, Decimal::new(4999, 2)),
        ]
    }

    fn resolver(catalog: Arc<StaticCatalog>, prices: Arc<StaticPrices>) -> QueryResolver {
        QueryResolver::new(catalog, prices, ResolverSettings::default())
    }

    #[tokio::test]
    async fn catalog_failure_surfaces_as_catalog_error() {
        let catalog = Arc::new(StaticCatalog::failing(LookupError::Transport("down".to_owned())));
        let prices = Arc::new(StaticPrices::default());

        let result = resolver(catalog, prices.clone()).resolve(&Query::all_discounted()).await;

        assert!(matches!(result, Err(ResolveError::Catalog(LookupError::Transport(_)))));
        assert_eq!(prices.call_count(), 0);
    }

    #[tokio::test]
    async fn price_failure_surfaces_as_price_error() {
        let catalog = Arc::new(StaticCatalog::new(entries()));
        let prices =
            Arc::new(StaticPrices::failing(LookupError::Status { status: 503, body: String::new() }));

        let result = resolver(catalog, prices).resolve(&Query::prefix_search("mario")).await;

        assert!(matches!(result, Err(ResolveError::Prices(LookupError::Status { .. }))));
    }

    #[tokio::test]
    async fn catalog_is_fetched_for_configured_region() {
        let catalog = Arc::new(StaticCatalog::new(entries()));
        let prices = Arc::new(StaticPrices::default());
        let resolver = QueryResolver::new(
            catalog.clone(),
            prices,
            ResolverSettings { region: Region::Americas, ..ResolverSettings::default() },
        );

        resolver.resolve(&Query::single_title("metroid")).await.expect("resolve");

        assert_eq!(catalog.requested_regions(), vec![Region::Americas]);
    }

    #[tokio::test]
    async fn watchlist_without_argument_uses_configured_titles() {
        let catalog = Arc::new(StaticCatalog::new(entries()));
        let prices = Arc::new(StaticPrices::default());
        let resolver = QueryResolver::new(
            catalog,
            prices,
            ResolverSettings {
                watchlist: vec!["mario odyssey".to_owned(), "metroid".to_owned()],
                ..ResolverSettings::default()
            },
        );

        let lines = resolver.resolve(&Query::watchlist("")).await.expect("resolve");
        let texts: Vec<&str> = lines.iter().map(|line| line.as_str()).collect();

        assert_eq!(
            texts,
            vec!["*Mario Odyssey*: normal price: *€49.99*", "*Metroid Dread*: normal price: *€59.99*"]
        );
    }

    #[tokio::test]
    async fn title_list_fails_when_any_title_fails() {
        let catalog = Arc::new(StaticCatalog::new(entries()));
        let prices =
            Arc::new(StaticPrices::failing(LookupError::Decode("bad json".to_owned())));

        let result = resolver(catalog, prices).resolve(&Query::title_list("nothing,metroid")).await;

        assert!(matches!(result, Err(ResolveError::Prices(_))));
    }
}
