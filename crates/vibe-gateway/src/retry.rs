//! Retry with capped exponential backoff and a hard per-attempt timeout.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GatewayResult, ModelCallError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Wall-clock limit for one attempt.
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 5_000,
            max_delay_ms: 30_000,
            timeout_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based):
    /// `min(base * 2^(attempt-1), max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Run `attempt_fn` under `policy`.
///
/// Rate-limit failures are retried after the backoff delay until attempts
/// run out. A timeout ends the call immediately with
/// [`ModelCallError::Timeout`]; any other error is returned as is.
pub async fn call_with_retry<F, Fut, T>(policy: &RetryPolicy, attempt_fn: F) -> GatewayResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = GatewayResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match tokio::time::timeout(policy.timeout(), attempt_fn()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if err.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "model rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Ok(Err(ModelCallError::RateLimited { .. })) => {
                return Err(ModelCallError::RateLimited { attempts: attempt })
            }
            Ok(Err(err)) => return Err(err),
            Err(_elapsed) => {
                return Err(ModelCallError::Timeout {
                    limit_ms: policy.timeout_ms,
                })
            }
        }
    }

    Err(ModelCallError::RateLimited {
        attempts: max_attempts,
    })
}
