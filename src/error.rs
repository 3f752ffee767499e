//! Error types for loop-market

use crate::protocol::ErrorKind;
use thiserror::Error;

/// Main error type for loop-market
#[derive(Error, Debug)]
pub enum MarketError {
    // Negotiation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Message not found: {0}")]
    NotFound(String),

    #[error("Invalid offer state transition: {0}")]
    InvalidTransition(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Negotiation thread not found: {0}")]
    ThreadNotFound(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Protocol-level classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::Validation(_) => ErrorKind::Validation,
            MarketError::NotFound(_) | MarketError::ThreadNotFound(_) => ErrorKind::NotFound,
            MarketError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            MarketError::Forbidden(_) => ErrorKind::Forbidden,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        MarketError::Configuration(err.to_string())
    }
}

/// Result type alias for loop-market operations
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MarketError::NotFound("msg-7".to_string());
        assert_eq!(err.to_string(), "Message not found: msg-7");
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            MarketError::Validation("empty".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            MarketError::ThreadNotFound("abc".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            MarketError::InvalidTransition("accepted".into()).kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            MarketError::Forbidden("own offer".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            MarketError::Internal("boom".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_conversion() {
        fn json_error_function() -> Result<()> {
            serde_json::from_str::<serde_json::Value>("{not json")?;
            Ok(())
        }

        let result = json_error_function();
        assert!(matches!(result.unwrap_err(), MarketError::Json(_)));
    }
}
