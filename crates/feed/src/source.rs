use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bookworm_core::config::FeedConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::FeedError;
use crate::wire::{decode, FeedResponse};

#[async_trait]
pub trait BookFeed: Send + Sync {
    async fn fetch(&self) -> Result<FeedResponse, FeedError>;

    /// Where the feed reads from, safe to log.
    fn describe(&self) -> String;
}

#[async_trait]
impl BookFeed for Box<dyn BookFeed> {
    async fn fetch(&self) -> Result<FeedResponse, FeedError> {
        self.as_ref().fetch().await
    }

    fn describe(&self) -> String {
        self.as_ref().describe()
    }
}

/// Bestseller list over HTTP. The api key travels as the `api-key` query parameter.
pub struct HttpBookFeed {
    client: Client,
    list_url: String,
    api_key: Option<SecretString>,
}

impl HttpBookFeed {
    pub fn new(client: Client, list_url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self { client, list_url: list_url.into(), api_key }
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        let mut builder = Client::builder();
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder.build()?;

        Ok(Self::new(client, config.list_url(), config.api_key.clone()))
    }
}

#[async_trait]
impl BookFeed for HttpBookFeed {
    async fn fetch(&self) -> Result<FeedResponse, FeedError> {
        let mut request = self.client.get(&self.list_url);
        if let Some(api_key) = &self.api_key {
            request = request.query(&[("api-key", api_key.expose_secret())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            event_name = "feed.http.response",
            list_url = %self.list_url,
            bytes = body.len(),
            body = %body,
            "bestseller feed responded"
        );
        decode(&body)
    }

    fn describe(&self) -> String {
        self.list_url.clone()
    }
}

/// Serves a canned body or failure; used offline and in tests.
#[derive(Clone, Debug)]
pub struct StaticBookFeed {
    label: String,
    outcome: Result<String, FeedError>,
}

impl StaticBookFeed {
    pub fn from_body(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self { label: label.into(), outcome: Ok(body.into()) }
    }

    pub fn failing(label: impl Into<String>, error: FeedError) -> Self {
        Self { label: label.into(), outcome: Err(error) }
    }

    pub async fn from_file(path: &Path) -> Result<Self, FeedError> {
        let body = tokio::fs::read_to_string(path).await.map_err(|error| {
            FeedError::Unavailable(format!("could not read `{}`: {error}", path.display()))
        })?;
        Ok(Self::from_body(path.display().to_string(), body))
    }
}

#[async_trait]
impl BookFeed for StaticBookFeed {
    async fn fetch(&self) -> Result<FeedResponse, FeedError> {
        match &self.outcome {
            Ok(body) => decode(body),
            Err(error) => Err(error.clone()),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
