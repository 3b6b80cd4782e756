//! Error Types

use thiserror::Error;

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisoryError>;

/// Advisory text service error types
#[derive(Error, Debug)]
pub enum AdvisoryError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with a non-2xx status
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error (e.g. missing API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// A newer request for the same slot replaced this one
    #[error("Request superseded by a newer request for slot '{0}'")]
    Superseded(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AdvisoryError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable(_) | Self::RateLimited(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The advisory service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) | Self::Http { .. } => {
                "The advisory service is currently unavailable. Showing rule-based analysis.".into()
            }
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication with the advisory service failed. Check your API key.".into(),
            Self::Config(msg) => format!("Advisory service not configured: {msg}"),
            Self::Superseded(_) => "A newer request replaced this one.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AdvisoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(AdvisoryError::Http { status: 503, body: String::new() }.is_retryable());
        assert!(AdvisoryError::Http { status: 429, body: String::new() }.is_retryable());
        assert!(!AdvisoryError::Http { status: 400, body: String::new() }.is_retryable());
        assert!(!AdvisoryError::Config("missing key".into()).is_retryable());
    }

    #[test]
    fn user_message_hides_transport_detail() {
        let err = AdvisoryError::Http { status: 502, body: "<html>bad gateway</html>".into() };
        assert!(!err.user_message().contains("html"));
    }
}
