use bookworm_core::errors::ApplicationError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(String),
    #[error("feed returned HTTP {0}")]
    Status(u16),
    #[error("feed body could not be decoded: {0}")]
    Decode(String),
    #[error("feed response is missing `{0}`")]
    MissingField(&'static str),
    #[error("feed source unavailable: {0}")]
    Unavailable(String),
}

impl FeedError {
    /// Stable label used in log fields and CLI error classes.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "http_status",
            Self::Decode(_) | Self::MissingField(_) => "malformed_response",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl From<FeedError> for ApplicationError {
    fn from(value: FeedError) -> Self {
        ApplicationError::Integration(value.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(value: reqwest::Error) -> Self {
        // The request URL carries the api key; never let it into messages.
        Self::Transport(value.without_url().to_string())
    }
}
