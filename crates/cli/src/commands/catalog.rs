use std::path::Path;

use bookworm_core::config::{AppConfig, LoadOptions};
use bookworm_core::storefront::catalog::Catalog;
use bookworm_feed::FeedError;

use crate::commands::{build_loader, current_thread_runtime, CommandResult};
use crate::screen::format_amount;

/// Fetches the list once and prints it. Unlike `shop`, a failed fetch is reported.
pub fn run(options: &LoadOptions, json_output: bool, feed_file: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("catalog", error),
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("catalog", "runtime", error.to_string(), 1),
    };

    let loaded = runtime.block_on(async {
        match build_loader(&config, feed_file).await {
            Ok(mut loader) => loader.try_load().await,
            Err(error) => Err(FeedError::Unavailable(format!("{error:#}"))),
        }
    });

    match loaded {
        Ok(catalog) if json_output => match serde_json::to_string_pretty(&catalog) {
            Ok(output) => CommandResult::raw(0, output),
            Err(error) => CommandResult::failure("catalog", "serialization", error.to_string(), 1),
        },
        Ok(catalog) => CommandResult::raw(0, render_listing(&catalog, &config.storefront.currency)),
        Err(error) => CommandResult::feed_failure("catalog", error),
    }
}

pub fn render_listing(catalog: &Catalog, currency: &str) -> String {
    let mut lines = Vec::new();
    let heading = catalog.metadata.display_name.as_deref().unwrap_or("bestsellers");
    lines.push(format!("{heading}: {} book(s)", catalog.len()));

    for (position, item) in catalog.items().iter().enumerate() {
        let isbn = if item.id.as_str().is_empty() { "<no isbn>" } else { item.id.as_str() };
        lines.push(format!(
            "{:>3}. {} [{isbn}] {} {currency}",
            position + 1,
            item.title,
            format_amount(item.price)
        ));
    }

    lines.join("\n")
}
