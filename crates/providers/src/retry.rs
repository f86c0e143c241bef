//! Bounded retry with exponential backoff for transient completion failures.
//!
//! Only rate-limit / overload failures are retried. Connectivity, auth and
//! malformed-request failures are returned immediately so the caller can
//! degrade gracefully.

use async_trait::async_trait;
use ragdesk_core::error::CompletionError;
use ragdesk_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A completion client that retries its inner client on rate limiting.
pub struct RetryingClient {
    inner: Arc<dyn CompletionClient>,
    max_retries: u32,
    base_backoff: Duration,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn CompletionClient>, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff,
        }
    }

    /// Sleep before retry number `attempt` (0-based): `base * 2^attempt`,
    /// raised to the server's `Retry-After` hint, capped at [`MAX_BACKOFF`].
    fn backoff_for(&self, attempt: u32, error: &CompletionError) -> Duration {
        let exp = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        let hinted = match error {
            CompletionError::RateLimited { retry_after_secs } => {
                exp.max(Duration::from_secs(*retry_after_secs))
            }
            _ => exp,
        };
        hinted.min(MAX_BACKOFF)
    }
}

#[async_trait]
impl CompletionClient for RetryingClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(client = %self.inner.name(), attempt = attempt + 1, "Retry: request succeeded");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt, &e);
                    warn!(
                        client = %self.inner.name(),
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retry: transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        self.inner.health_check().await
    }
}
