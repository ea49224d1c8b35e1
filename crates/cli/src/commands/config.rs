use std::env;
use std::fs;
use std::path::Path;

use bookworm_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::raw(EXIT_CONFIG, format!("config validation failed: {error}"))
        }
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    CommandResult::raw(0, render(&config, config_file_path.as_deref(), &options.overrides))
}

pub fn render(
    config: &AppConfig,
    config_file_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> String {
    let config_file_doc = load_config_file_doc(config_file_path);
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path)
    };

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    lines.push(render_line(
        "feed.base_url",
        &config.feed.base_url,
        source("feed.base_url", &["BOOKWORM_FEED_BASE_URL"]),
    ));
    let list_source = if overrides.feed_list_name.is_some() {
        "flag (--list)".to_string()
    } else {
        source("feed.list_name", &["BOOKWORM_FEED_LIST_NAME"])
    };
    lines.push(render_line("feed.list_name", &config.feed.list_name, list_source));
    let api_key = if config.feed.has_api_key() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "feed.api_key",
        api_key,
        source("feed.api_key", &["BOOKWORM_FEED_API_KEY"]),
    ));
    let timeout = config
        .feed
        .timeout_secs
        .map(|secs| secs.to_string())
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "feed.timeout_secs",
        &timeout,
        source("feed.timeout_secs", &["BOOKWORM_FEED_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "storefront.title",
        &config.storefront.title,
        source("storefront.title", &["BOOKWORM_STOREFRONT_TITLE"]),
    ));
    lines.push(render_line(
        "storefront.currency",
        &config.storefront.currency,
        source("storefront.currency", &["BOOKWORM_STOREFRONT_CURRENCY"]),
    ));
    lines.push(render_line(
        "storefront.discount_pct",
        &config.storefront.discount_pct.to_string(),
        source("storefront.discount_pct", &["BOOKWORM_STOREFRONT_DISCOUNT_PCT"]),
    ));
    lines.push(render_line(
        "storefront.price_min",
        &config.storefront.price_min.to_string(),
        source("storefront.price_min", &["BOOKWORM_STOREFRONT_PRICE_MIN"]),
    ));
    lines.push(render_line(
        "storefront.price_max",
        &config.storefront.price_max.to_string(),
        source("storefront.price_max", &["BOOKWORM_STOREFRONT_PRICE_MAX"]),
    ));

    let level_source = if overrides.log_level.is_some() {
        "flag (--log-level)".to_string()
    } else {
        source("logging.level", &["BOOKWORM_LOGGING_LEVEL", "BOOKWORM_LOG_LEVEL"])
    };
    lines.push(render_line("logging.level", &config.logging.level, level_source));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["BOOKWORM_LOGGING_FORMAT", "BOOKWORM_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// `env_keys` are checked in the order the loader reads them; blank values do not count.
fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(env_key) = env_key {
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
