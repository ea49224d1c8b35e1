pub mod catalog;
pub mod config;
pub mod doctor;
pub mod shop;

use std::path::Path;

use anyhow::Context;
use bookworm_core::config::{AppConfig, ConfigError};
use bookworm_core::errors::ApplicationError;
use bookworm_core::storefront::catalog::RandomPriceAssigner;
use bookworm_feed::{BookFeed, CatalogLoader, FeedError, HttpBookFeed, StaticBookFeed};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_FEED: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
    pub stream: OutputStream,
}

/// Where the final command output is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    /// Used when stdout already carries an interactive screen.
    Stderr,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload), stream: OutputStream::Stdout }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload), stream: OutputStream::Stdout }
    }

    pub fn raw(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into(), stream: OutputStream::Stdout }
    }

    pub fn on_stderr(mut self) -> Self {
        self.stream = OutputStream::Stderr;
        self
    }

    pub fn config_failure(command: &str, error: ConfigError) -> Self {
        let error = ApplicationError::from(error);
        Self::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    }

    pub fn feed_failure(command: &str, error: FeedError) -> Self {
        let class = error.class();
        Self::failure(command, class, ApplicationError::from(error).to_string(), EXIT_FEED)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub type StorefrontLoader = CatalogLoader<Box<dyn BookFeed>, RandomPriceAssigner>;

/// Builds the loader for either a local feed file or the configured HTTP list.
pub async fn build_loader(
    config: &AppConfig,
    feed_file: Option<&Path>,
) -> anyhow::Result<StorefrontLoader> {
    let feed: Box<dyn BookFeed> = match feed_file {
        Some(path) => Box::new(
            StaticBookFeed::from_file(path)
                .await
                .with_context(|| format!("loading feed file `{}`", path.display()))?,
        ),
        None => Box::new(
            HttpBookFeed::from_config(&config.feed).context("building bestseller http client")?,
        ),
    };

    Ok(CatalogLoader::new(feed, RandomPriceAssigner::new(config.storefront.price_range())))
}

pub fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
