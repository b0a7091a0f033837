//! Rerank error types with retry strategies.
//!
//! # Error Handling Philosophy
//!
//! Only [`RerankError::InvalidInput`] ever reaches the caller of the
//! reconciler. Every other variant describes a provider failure and is
//! turned into a degraded result (see [`crate::rerank::Reconciler`]).
//!
//! # Common Errors and Solutions
//!
//! | Error | Cause | Solution |
//! |-------|-------|----------|
//! | `InvalidInput` | Empty query, no usable documents | Fix the upstream node |
//! | `ConfigError` | Missing API key, bad env value | Check `RERANK_API_KEY` |
//! | `AuthError` | Invalid/expired API key | Rotate the credential |
//! | `RateLimited` | Too many requests | Wait before retrying |
//! | `Timeout` | Provider slow | Increase `RERANK_TIMEOUT_SECS` |
//!
//! # Retry Strategies
//!
//! Each error type has an associated retry strategy:
//! - `ExponentialBackoff`: For transient network/server errors
//! - `WaitAndRetry`: For rate limiting
//! - `NoRetry`: For permanent errors (auth, invalid input, config)

use std::time::Duration;
use thiserror::Error;

/// Result type for rerank operations.
pub type Result<T> = std::result::Result<T, RerankError>;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying a failed provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff (for transient errors).
    ExponentialBackoff {
        /// Initial delay before first retry.
        base_delay: Duration,
        /// Maximum delay between retries.
        max_delay: Duration,
        /// Maximum number of attempts, including the first one.
        max_attempts: u32,
    },

    /// Wait for a specific duration then retry once (for rate limits).
    WaitAndRetry {
        /// Duration to wait before retrying.
        wait: Duration,
    },

    /// Do not retry at all (permanent error).
    NoRetry,
}

impl RetryStrategy {
    /// Standard exponential backoff for network errors.
    pub fn network_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(125),
            max_delay: Duration::from_secs(5),
            max_attempts: 3,
        }
    }

    /// Standard exponential backoff for server errors.
    pub fn server_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: 2,
        }
    }

    /// Check if this strategy allows retrying.
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::NoRetry)
    }
}

// ============================================================================
// Rerank Error Types
// ============================================================================

/// Errors that can occur while reranking.
#[derive(Debug, Error)]
pub enum RerankError {
    /// Query or documents unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Provider rejected the credentials (HTTP 401/403).
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// Transport failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Timeout error.
    #[error("Request timed out")]
    Timeout,

    /// Response body was not valid JSON.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RerankError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RerankError::Timeout
        } else if err.is_connect() {
            RerankError::NetworkError(format!("Connection failed: {}", err))
        } else {
            RerankError::NetworkError(err.to_string())
        }
    }
}

impl RerankError {
    /// Get the appropriate retry strategy for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use edgequake_rerank::{RerankError, RetryStrategy};
    ///
    /// let error = RerankError::NetworkError("connection failed".to_string());
    /// assert!(error.retry_strategy().should_retry());
    /// ```
    pub fn retry_strategy(&self) -> RetryStrategy {
        match self {
            Self::NetworkError(_) | Self::Timeout => RetryStrategy::network_backoff(),

            Self::RateLimited(_) => RetryStrategy::WaitAndRetry {
                wait: Duration::from_secs(2),
            },

            Self::ApiError { status, .. } if *status >= 500 => RetryStrategy::server_backoff(),

            Self::InvalidInput(_)
            | Self::ConfigError(_)
            | Self::AuthError(_)
            | Self::ApiError { .. }
            | Self::SerializationError(_) => RetryStrategy::NoRetry,
        }
    }

    /// Check if this error is recoverable (can be retried).
    pub fn is_recoverable(&self) -> bool {
        self.retry_strategy().should_retry()
    }

    /// True when the error came from the provider call rather than from
    /// the caller's input or configuration.
    pub fn is_provider_failure(&self) -> bool {
        !matches!(self, Self::InvalidInput(_) | Self::ConfigError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerank_error_display() {
        let error = RerankError::InvalidInput("No user query found".to_string());
        assert_eq!(error.to_string(), "Invalid input: No user query found");

        let error = RerankError::ApiError {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(error.to_string(), "API error (502): bad gateway");

        assert_eq!(RerankError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RerankError = json_err.into();
        assert!(matches!(err, RerankError::SerializationError(_)));
        assert!(err.is_provider_failure());
    }

    #[test]
    fn test_network_error_retry_strategy() {
        let error = RerankError::NetworkError("connection refused".to_string());
        match error.retry_strategy() {
            RetryStrategy::ExponentialBackoff { max_attempts, .. } => {
                assert_eq!(max_attempts, 3);
            }
            other => panic!("Expected ExponentialBackoff, got {:?}", other),
        }
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_server_error_retry_strategy() {
        let error = RerankError::ApiError {
            status: 503,
            body: String::new(),
        };
        assert_eq!(error.retry_strategy(), RetryStrategy::server_backoff());
    }

    #[test]
    fn test_client_error_no_retry() {
        let error = RerankError::ApiError {
            status: 400,
            body: "bad model".to_string(),
        };
        assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_rate_limited_waits() {
        let error = RerankError::RateLimited("slow down".to_string());
        assert!(matches!(
            error.retry_strategy(),
            RetryStrategy::WaitAndRetry { .. }
        ));
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(RerankError::Timeout.is_provider_failure());
        assert!(RerankError::AuthError("bad key".to_string()).is_provider_failure());
        assert!(!RerankError::InvalidInput("empty".to_string()).is_provider_failure());
        assert!(!RerankError::ConfigError("missing key".to_string()).is_provider_failure());
    }
}
