//! Retry executor for provider calls with exponential backoff.
//!
//! The reconciler itself makes exactly one provider call. Callers that want
//! resilience wrap their provider in [`RetryingProvider`], which keeps the
//! reconciler's contract intact: the wrapper still returns either a
//! response or the last error.
//!
//! # Usage
//!
//! ```ignore
//! use edgequake_rerank::{HttpRerankProvider, RetryingProvider, RetryStrategy};
//!
//! let provider = RetryingProvider::new(
//!     HttpRerankProvider::new(config)?,
//!     RetryStrategy::network_backoff(),
//! );
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Result, RetryStrategy};
use crate::rerank::{RankResponse, RerankProvider};

/// Executor for retry logic with configurable backoff strategies.
#[derive(Debug, Default)]
pub struct RetryExecutor {
    log_retries: bool,
}

impl RetryExecutor {
    /// Create a new retry executor.
    pub fn new() -> Self {
        Self { log_retries: true }
    }

    /// Create a retry executor without logging.
    pub fn silent() -> Self {
        Self { log_retries: false }
    }

    /// Execute an async operation with automatic retry based on strategy.
    ///
    /// Returns the result of the operation, or the last error if all
    /// attempts fail. An error whose own strategy is `NoRetry` stops the
    /// loop immediately.
    pub async fn execute<F, Fut, T>(&self, strategy: &RetryStrategy, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match strategy {
            RetryStrategy::NoRetry => operation().await,

            RetryStrategy::WaitAndRetry { wait } => {
                match operation().await {
                    Ok(v) => Ok(v),
                    Err(e) if !e.is_recoverable() => Err(e),
                    Err(e) => {
                        if self.log_retries {
                            warn!("Operation failed, waiting {:?} before retry: {}", wait, e);
                        }
                        sleep(*wait).await;
                        operation().await
                    }
                }
            }

            RetryStrategy::ExponentialBackoff {
                base_delay,
                max_delay,
                max_attempts,
            } => {
                self.execute_exponential_backoff(*base_delay, *max_delay, *max_attempts, operation)
                    .await
            }
        }
    }

    async fn execute_exponential_backoff<F, Fut, T>(
        &self,
        base_delay: Duration,
        max_delay: Duration,
        max_attempts: u32,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = base_delay;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(v) => {
                    if attempts > 1 && self.log_retries {
                        info!("Operation succeeded after {} attempts", attempts);
                    }
                    return Ok(v);
                }
                Err(e) => {
                    if attempts >= max_attempts {
                        if self.log_retries {
                            warn!(
                                "Operation failed after {} attempts, giving up: {}",
                                attempts, e
                            );
                        }
                        return Err(e);
                    }

                    if !e.is_recoverable() {
                        if self.log_retries {
                            debug!("Error is non-retryable, stopping: {}", e);
                        }
                        return Err(e);
                    }

                    if self.log_retries {
                        warn!(
                            "Attempt {}/{} failed, retrying in {:?}: {}",
                            attempts, max_attempts, delay, e
                        );
                    }

                    sleep(delay).await;
                    delay = (delay * 2).min(max_delay);
                }
            }
        }
    }
}

/// Provider wrapper that retries failed `rank` calls.
///
/// A format mismatch is a successful call and is never retried.
pub struct RetryingProvider<P> {
    inner: P,
    strategy: RetryStrategy,
    executor: RetryExecutor,
}

impl<P: RerankProvider> RetryingProvider<P> {
    /// Wrap `inner` with the given strategy.
    pub fn new(inner: P, strategy: RetryStrategy) -> Self {
        Self {
            inner,
            strategy,
            executor: RetryExecutor::new(),
        }
    }

    /// Use a silent executor (no retry logging).
    pub fn silent(mut self) -> Self {
        self.executor = RetryExecutor::silent();
        self
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: RerankProvider> RerankProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn rank(&self, query: &str, documents: &[String], top_n: usize) -> Result<RankResponse> {
        self.executor
            .execute(&self.strategy, || self.inner.rank(query, documents, top_n))
            .await
    }
}
