//! Error Types for Portfolio Advisor

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Profile not supported: {0}")]
    UnsupportedProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Advisory service error: {0}")]
    Advisory(#[from] advisor_core::AdvisoryError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn quote_unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QuoteUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

/// A rejected user input, named by the rule it breaks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Fixed income must be between 0 and 100% (got {0}%)")]
    FixedIncomeOutOfRange(Decimal),

    #[error("Core + Explore + Protect must sum to {expected:.1}% (got {actual}%)")]
    EquityBucketMismatch { expected: Decimal, actual: Decimal },

    #[error("Invalid ticker symbol: '{0}'")]
    InvalidTicker(String),

    #[error("Ticker {0} is already in the watch list")]
    DuplicateTicker(String),

    #[error("Investment amount cannot be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Investment amount cannot exceed {max} (got {amount})")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("Invalid {provider} API key format")]
    InvalidApiKey { provider: &'static str },

    #[error("Age must be between 1 and 120 (got {0})")]
    AgeOutOfRange(u32),

    #[error("Ticker {symbol} is not an option for the {bucket} bucket")]
    TickerNotInBucket { symbol: String, bucket: &'static str },

    #[error("Invalid backup file: {0}")]
    InvalidSnapshot(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mismatch_message_names_expected_equity() {
        let err = ValidationError::EquityBucketMismatch {
            expected: dec!(60),
            actual: dec!(68),
        };
        assert_eq!(
            err.to_string(),
            "Core + Explore + Protect must sum to 60.0% (got 68%)"
        );
    }

    #[test]
    fn validation_converts_into_advisor_error() {
        let err: AdvisorError = ValidationError::DuplicateTicker("SPY".into()).into();
        assert!(matches!(err, AdvisorError::Validation(ValidationError::DuplicateTicker(_))));
    }
}
