//! Errors returned by streaming provider calls.

use thiserror::Error;

/// Errors that can occur while talking to the streaming provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request to the provider failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Provider response could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    /// Caller-supplied value rejected before any request was sent.
    #[error("Invalid provider input: {0}")]
    InvalidInput(String),
}

/// Convenient Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Returns true if this error is transient and the operation may succeed
    /// when retried.
    ///
    /// Transient statuses:
    /// - 429: Rate limited
    /// - 502/503/504: Provider gateway or backend unavailable
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpStatus(status, _) => matches!(status, 429 | 502 | 503 | 504),
            ProviderError::Http(e) => e.is_timeout() || e.is_connect(),
            ProviderError::Decode(_) | ProviderError::InvalidInput(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_gateway_errors_are_transient() {
        for status in [429, 502, 503, 504] {
            assert!(ProviderError::HttpStatus(status, String::new()).is_transient());
        }
    }

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!ProviderError::HttpStatus(401, "expired".into()).is_transient());
        assert!(!ProviderError::HttpStatus(404, "NO_ACTIVE_DEVICE".into()).is_transient());
        assert!(!ProviderError::Decode("missing field".into()).is_transient());
        assert!(!ProviderError::InvalidInput("bad id".into()).is_transient());
    }
}
