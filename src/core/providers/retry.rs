//! Provider Retry Policy
//!
//! Bounded attempts with a fixed delay between them. The last error is
//! surfaced unchanged once the attempts are exhausted so the caller can
//! decide whether the stage aborts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::core::config::RetryConfig;
use crate::core::{CoreError, CoreResult};

/// Runs `operation` up to `retry.max_attempts` times, sleeping
/// `retry.delay_secs` between failures.
pub async fn with_retries<T, F, Fut>(
    what: &str,
    retry: RetryConfig,
    mut operation: F,
) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let attempts = retry.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt < attempts {
                    warn!(
                        "{} failed on attempt {}/{}: {}, retrying in {}s",
                        what, attempt, attempts, err, retry.delay_secs
                    );
                    tokio::time::sleep(Duration::from_secs(retry.delay_secs)).await;
                } else {
                    warn!("{} failed after {} attempt(s): {}", what, attempts, err);
                }
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| CoreError::provider(what, "no attempts executed")))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = with_retries("op", fast_retry(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, CoreError>(42) }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retries("op", fast_retry(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(CoreError::provider("op", "transient"))
                } else {
                    Ok(7)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: CoreResult<()> = with_retries("op", fast_retry(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoreError::provider("op", "down")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(CoreError::Provider { .. })));
    }
}
