//! Error types for the SND system
//!
//! This module defines all error types used throughout the crate.
//!
//! Note that an unavailable rank is deliberately *not* represented here:
//! rank lookups collapse to the `UNRANKED` sentinel instead of failing
//! (see [`crate::traits::ProviderClient::resolve_rank_by_id`]).

use thiserror::Error;

/// Result type alias for SND operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the SND system
#[derive(Error, Debug)]
pub enum Error {
    /// History store errors
    #[error("History store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (transport level)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors (rejected API key)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Lookup yielded no match
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempt to track an external id that is already tracked
    #[error("Already tracked: {0}")]
    DuplicateEntity(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a history store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a "duplicate entity" error
    pub fn duplicate(external_id: impl Into<String>) -> Self {
        Self::DuplicateEntity(external_id.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a "no match" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::duplicate("42").to_string(),
            "Already tracked: 42"
        );
        assert_eq!(
            Error::provider("riot", "HTTP request failed").to_string(),
            "Provider error (riot): HTTP request failed"
        );
        assert!(Error::not_found("Summoner not found.").is_not_found());
    }
}
