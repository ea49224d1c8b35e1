use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::book::BookId;
use crate::session::states::{SessionEvent, SessionState};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid session transition from {from:?} on {event:?}")]
    InvalidSessionTransition { from: SessionState, event: SessionEvent },
    #[error("no cart line for book `{0}`")]
    MissingCartLine(BookId),
    #[error("no catalog entry at position {position} (catalog has {len} items)")]
    UnknownPosition { position: usize, len: usize },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl DomainError {
    /// Failures the storefront absorbs as a no-op instead of surfacing.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::MissingCartLine(_))
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        ApplicationError::Configuration(value.to_string())
    }
}

impl ApplicationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::UnknownPosition { .. }) => {
                "That card number is not on the shelf."
            }
            Self::Domain(_) => "That action is not available right now.",
            Self::Integration(_) => "The bestseller list could not be loaded.",
            Self::Configuration(_) => "The storefront is not configured correctly.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::domain::book::BookId;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn missing_cart_line_is_ignorable() {
        assert!(DomainError::MissingCartLine(BookId::new("A")).is_ignorable());
        assert!(!DomainError::UnknownPosition { position: 9, len: 2 }.is_ignorable());
    }

    #[test]
    fn domain_errors_convert_into_application_errors() {
        let error = ApplicationError::from(DomainError::UnknownPosition { position: 9, len: 2 });
        assert_eq!(error.user_message(), "That card number is not on the shelf.");
    }

    #[test]
    fn integration_error_has_user_safe_message() {
        let error = ApplicationError::Integration("connection refused".to_owned());
        assert_eq!(error.user_message(), "The bestseller list could not be loaded.");
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn config_errors_keep_their_detail() {
        let error = ApplicationError::from(ConfigError::Validation(
            "storefront.currency must not be empty".to_owned(),
        ));
        assert_eq!(error.user_message(), "The storefront is not configured correctly.");
        assert!(error.to_string().contains("storefront.currency"));
    }
}
