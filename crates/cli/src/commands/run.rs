use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use eshop_deals_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use eshop_deals_core::runner::new_correlation_id;
use eshop_deals_core::{
    run_query, CatalogProvider, DomainError, NotificationSink, Notifier, NotifierSettings,
    NotifyOutcome, PriceProvider, Query, QueryMode, QueryResolver, Region, ResolverSettings,
    RunReport,
};
use eshop_deals_slack::WebhookSink;
use eshop_deals_storefront::StorefrontClient;

use crate::commands::{
    CommandResult, EXIT_DELIVERY_FAILED, EXIT_INVALID_INPUT, EXIT_LOOKUP_FAILED,
};
use crate::logging;
use crate::sink::DryRunSink;

/// Without a mode flag the configured watchlist is checked.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[arg(short = 't', long, value_name = "TITLE", conflicts_with_all = ["search", "all", "list", "watchlist"], help = "First title starting with TITLE")]
    pub title: Option<String>,
    #[arg(short = 's', long, value_name = "PREFIX", conflicts_with_all = ["all", "list", "watchlist"], help = "Every title starting with PREFIX")]
    pub search: Option<String>,
    #[arg(short = 'a', long, conflicts_with_all = ["list", "watchlist"], help = "Every discounted title")]
    pub all: bool,
    #[arg(short = 'l', long, value_name = "TITLES", conflicts_with = "watchlist", help = "Comma-separated titles")]
    pub list: Option<String>,
    #[arg(
        short = 'w',
        long,
        value_name = "TITLES",
        num_args = 0..=1,
        default_missing_value = "",
        help = "Comma-separated titles, notify only when one is on sale (defaults to query.watchlist)"
    )]
    pub watchlist: Option<String>,
    #[arg(long, help = "Print the message instead of posting it")]
    pub dry_run: bool,
    #[arg(long, value_name = "REGION", help = "Storefront region (only europe has a catalog source)")]
    pub region: Option<String>,
    #[arg(long, value_name = "CODE", help = "Two-letter price locale, e.g. FI")]
    pub locale: Option<String>,
}

impl RunArgs {
    pub fn query(&self) -> Result<Query, DomainError> {
        if let Some(title) = &self.title {
            return Query::new(QueryMode::SingleTitle, title.as_str());
        }
        if let Some(prefix) = &self.search {
            return Query::new(QueryMode::PrefixSearch, prefix.as_str());
        }
        if self.all {
            return Query::new(QueryMode::AllDiscounted, "");
        }
        if let Some(titles) = &self.list {
            return Query::new(QueryMode::TitleList, titles.as_str());
        }
        Query::new(QueryMode::Watchlist, self.watchlist.clone().unwrap_or_default())
    }

    pub fn overrides(&self) -> Result<ConfigOverrides, DomainError> {
        let region = self.region.as_deref().map(str::parse::<Region>).transpose()?;
        Ok(ConfigOverrides { region, locale: self.locale.clone(), ..ConfigOverrides::default() })
    }
}

pub fn run(args: &RunArgs, config_path: Option<PathBuf>) -> CommandResult {
    let (query, overrides) = match args.query().and_then(|query| Ok((query, args.overrides()?))) {
        Ok(parsed) => parsed,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "invalid_query",
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let config = match AppConfig::load(LoadOptions {
        config_path,
        overrides,
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "config_validation",
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };
    logging::init(&config.logging);

    let sink: Arc<dyn NotificationSink> = if args.dry_run {
        Arc::new(DryRunSink)
    } else {
        let webhook_url = match config.require_webhook_url() {
            Ok(webhook_url) => webhook_url.clone(),
            Err(error) => {
                return CommandResult::failure(
                    "run",
                    "config_validation",
                    error.to_string(),
                    EXIT_INVALID_INPUT,
                )
            }
        };
        match WebhookSink::new(webhook_url, Duration::from_secs(config.slack.timeout_secs)) {
            Ok(sink) => Arc::new(sink),
            Err(error) => {
                return CommandResult::failure(
                    "run",
                    "delivery_failed",
                    error.to_string(),
                    EXIT_DELIVERY_FAILED,
                )
            }
        }
    };

    let storefront = match StorefrontClient::from_config(&config.storefront) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            return CommandResult::failure(
                "run",
                "lookup_failed",
                error.to_string(),
                EXIT_LOOKUP_FAILED,
            )
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    runtime.block_on(execute(&config, &query, storefront.clone(), storefront, sink))
}

/// Resolves and notifies with the given collaborators.
pub async fn execute(
    config: &AppConfig,
    query: &Query,
    catalog: Arc<dyn CatalogProvider>,
    prices: Arc<dyn PriceProvider>,
    sink: Arc<dyn NotificationSink>,
) -> CommandResult {
    let resolver = QueryResolver::new(catalog, prices, ResolverSettings::from(config));
    let notifier = Notifier::new(sink, NotifierSettings::from(config));
    let correlation_id = new_correlation_id();

    match run_query(&resolver, &notifier, query, &correlation_id).await {
        Ok(report) => report_result(&report),
        Err(error) => {
            CommandResult::failure("run", "lookup_failed", error.to_string(), EXIT_LOOKUP_FAILED)
        }
    }
}

fn report_result(report: &RunReport) -> CommandResult {
    let lines =
        report.lines.iter().map(|line| line.as_str()).collect::<Vec<_>>().join("\n");

    match &report.delivery {
        NotifyOutcome::Delivered { lines: count } => {
            CommandResult::success("run", format!("delivered {count} line(s)\n{lines}"))
        }
        NotifyOutcome::Suppressed { reason } if lines.is_empty() => {
            CommandResult::success("run", format!("no notification sent ({})", reason.as_str()))
        }
        NotifyOutcome::Suppressed { reason } => CommandResult::success(
            "run",
            format!("no notification sent ({})\n{lines}", reason.as_str()),
        ),
        NotifyOutcome::Failed { reason } => {
            CommandResult::failure("run", "delivery_failed", reason.clone(), EXIT_DELIVERY_FAILED)
        }
    }
}
