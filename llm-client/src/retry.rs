//! Retry wrapper: per-attempt timeout plus exponential backoff.

use std::time::Duration;

use tracing::warn;

use crate::error::ProviderError;
use crate::{ChatTurn, LlmClient};

/// How generation requests are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff before attempt n+1 is `base_delay * 2^n`.
    pub base_delay: Duration,
    /// Deadline for each individual attempt.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff after the attempt with the given zero-based index failed.
    pub fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt_index)
    }
}

/// Runs `client.generate` under the policy.
///
/// Each attempt gets its own timeout; a timeout counts as a retryable
/// failure. Non-retryable errors (unknown model) abort immediately. After
/// the final attempt the last error is returned without sleeping.
pub async fn generate_with_retry(
    client: &dyn LlmClient,
    policy: &RetryPolicy,
    model: &str,
    turns: &[ChatTurn],
) -> Result<String, ProviderError> {
    let mut last_error = ProviderError::Other("no attempts made".to_string());

    for attempt in 0..policy.max_attempts {
        let result = tokio::time::timeout(policy.request_timeout, client.generate(model, turns))
            .await
            .unwrap_or(Err(ProviderError::Timeout));

        match result {
            Ok(text) => return Ok(text),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Generation attempt failed"
                );
                last_error = e;
            }
        }

        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
        }
    }

    Err(last_error)
}
