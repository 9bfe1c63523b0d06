//! Retry policy with exponential backoff and jitter.
//!
//! Implements production-grade retry behavior:
//! - Exponential backoff with full jitter
//! - Respects a Retry-After-style hint when the error carries one
//! - Configurable base and max delays

use std::time::Duration;

use recap_models::PipelineError;
use tracing::{info_span, warn, Instrument};

use crate::error::AuthError;
use crate::metrics::record_retry;

/// Errors that know whether they're worth retrying, and optionally carry an
/// explicit delay hint (e.g. a parsed `Retry-After` header).
pub trait Retryable {
    fn is_retryable(&self) -> bool;
    fn retry_after_ms(&self) -> Option<u64> {
        None
    }
}

impl Retryable for AuthError {
    fn is_retryable(&self) -> bool {
        AuthError::is_retryable(self)
    }

    fn retry_after_ms(&self) -> Option<u64> {
        match self {
            AuthError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}

impl Retryable for PipelineError {
    fn is_retryable(&self) -> bool {
        PipelineError::is_retryable(self)
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    pub fn from_env() -> Self {
        let base_delay_ms: u64 = std::env::var("RETRY_BASE_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        let max_delay_ms: u64 = std::env::var("RETRY_MAX_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000);

        let max_retries: u32 = std::env::var("RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Execute an async operation with retry. Retries while `e.is_retryable()`
/// and attempts remain; anything else propagates immediately.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, operation: &str, op: F) -> Result<T, E>
where
    E: Retryable,
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let span = info_span!("with_retry", operation = %operation, attempt = attempt + 1);
        let result = op().instrument(span).await;

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = calculate_delay(config, attempt, e.retry_after_ms());

                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "operation failed, retrying"
                );

                record_retry(operation);

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.expect("loop always assigns last_error before exhausting attempts"))
}

/// Calculate retry delay with exponential backoff and full jitter:
/// `min(base * 2^attempt, cap)`, then jittered down to a uniform fraction of
/// that cap (never below `base_delay_ms`).
fn calculate_delay(config: &RetryConfig, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
    if let Some(after) = retry_after_ms {
        return Duration::from_millis(after);
    }

    let exp_delay = config.base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    let capped_delay = exp_delay.min(config.max_delay_ms);

    // Full jitter via SystemTime nanos, to avoid adding a rand dependency.
    let jittered = if capped_delay > 0 {
        use std::time::SystemTime;
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let random_factor = (nanos % 1000) as f64 / 1000.0;
        ((capped_delay as f64) * random_factor) as u64
    } else {
        0
    };

    Duration::from_millis(jittered.max(config.base_delay_ms.min(capped_delay.max(1))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.max_delay_ms, 10_000);
    }

    #[test]
    fn honors_retry_after_hint() {
        let config = RetryConfig::default();
        let delay = calculate_delay(&config, 0, Some(2000));
        assert_eq!(delay, Duration::from_millis(2000));
    }

    #[test]
    fn respects_max_delay_cap() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 2000,
        };
        let delay = calculate_delay(&config, 10, None);
        assert!(delay.as_millis() <= 2000);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let config = RetryConfig::default().with_max_retries(2);
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<&str, AuthError> = with_retry(&config, "test-op", || async {
            let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n < 1 {
                Err(AuthError::RateLimited(1))
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let config = RetryConfig::default().with_max_retries(1);
        let result: Result<(), AuthError> =
            with_retry(&config, "test-op", || async { Err(AuthError::RateLimited(1)) }).await;
        assert!(result.is_err());
    }
}
