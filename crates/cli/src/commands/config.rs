use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use eshop_deals_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run(config_path: Option<PathBuf>) -> String {
    let config = match AppConfig::load(LoadOptions {
        config_path: config_path.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = config_path.filter(|path| path.exists()).or_else(detect_config_path);
    let sources = SourceLookup {
        doc: load_config_file_doc(config_file_path.as_deref()),
        path: config_file_path,
    };

    let webhook_url = config
        .slack
        .webhook_url
        .as_ref()
        .map(|url| redact_webhook(url.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let watchlist = if config.query.watchlist.is_empty() {
        "<empty>".to_string()
    } else {
        config.query.watchlist.join(",")
    };
    let storefront = &config.storefront;

    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        sources.line(
            "storefront.region",
            storefront.region.as_str(),
            &["ESHOP_DEALS_STOREFRONT_REGION"],
        ),
        sources.line(
            "storefront.locale",
            storefront.locale.as_str(),
            &["ESHOP_DEALS_STOREFRONT_LOCALE"],
        ),
        sources.line(
            "storefront.search_base_url",
            &storefront.search_base_url,
            &["ESHOP_DEALS_STOREFRONT_SEARCH_BASE_URL"],
        ),
        sources.line(
            "storefront.price_base_url",
            &storefront.price_base_url,
            &["ESHOP_DEALS_STOREFRONT_PRICE_BASE_URL"],
        ),
        sources.line(
            "storefront.timeout_secs",
            &storefront.timeout_secs.to_string(),
            &["ESHOP_DEALS_STOREFRONT_TIMEOUT_SECS"],
        ),
        sources.line(
            "storefront.max_rows",
            &storefront.max_rows.to_string(),
            &["ESHOP_DEALS_STOREFRONT_MAX_ROWS"],
        ),
        sources.line(
            "slack.webhook_url",
            &webhook_url,
            &["ESHOP_DEALS_SLACK_WEBHOOK_URL", "SLACK_WEBHOOK"],
        ),
        sources.line(
            "slack.timeout_secs",
            &config.slack.timeout_secs.to_string(),
            &["ESHOP_DEALS_SLACK_TIMEOUT_SECS"],
        ),
        sources.line(
            "notifier.header",
            config.notifier.header.as_deref().unwrap_or("<unset>"),
            &["ESHOP_DEALS_NOTIFIER_HEADER"],
        ),
        sources.line(
            "query.watchlist",
            &watchlist,
            &["ESHOP_DEALS_QUERY_WATCHLIST", "ESHOP_DEALS_WATCHLIST"],
        ),
        sources.line(
            "server.bind_address",
            &config.server.bind_address,
            &["ESHOP_DEALS_SERVER_BIND_ADDRESS"],
        ),
        sources.line("server.port", &config.server.port.to_string(), &["ESHOP_DEALS_SERVER_PORT"]),
        sources.line(
            "logging.level",
            &config.logging.level,
            &["ESHOP_DEALS_LOGGING_LEVEL", "ESHOP_DEALS_LOG_LEVEL"],
        ),
        sources.line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["ESHOP_DEALS_LOGGING_FORMAT", "ESHOP_DEALS_LOG_FORMAT"],
        ),
    ];

    lines.join("\n")
}

struct SourceLookup {
    doc: Option<Value>,
    path: Option<PathBuf>,
}

impl SourceLookup {
    fn line(&self, key: &str, value: &str, env_keys: &[&str]) -> String {
        let source = field_source(key, env_keys, self.doc.as_ref(), self.path.as_deref());
        format!("- {key} = {value} (source: {source})")
    }
}

fn detect_config_path() -> Option<PathBuf> {
    ["eshop-deals.toml", "config/eshop-deals.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps scheme and host, hides the path that carries the webhook secret.
fn redact_webhook(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{host}/***")
        }
        None => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_webhook};

    #[test]
    fn webhook_redaction_keeps_only_the_host() {
        assert_eq!(
            redact_webhook("https://hooks.slack.com/services/T000/B000/XXXX"),
            "https://hooks.slack.com/***"
        );
        assert_eq!(redact_webhook("  "), "<empty>");
        assert_eq!(redact_webhook("not-a-url"), "<redacted>");
    }

    #[test]
    fn dotted_paths_are_looked_up_in_the_file() {
        let doc: Value = "[storefront]\nlocale = \"SE\"\n".parse().expect("valid toml");
        assert!(contains_path(&doc, "storefront.locale"));
        assert!(!contains_path(&doc, "storefront.region"));
        assert!(!contains_path(&doc, "slack.webhook_url"));
    }
}
