//! Retry and condition-wait primitives for flaky UI state

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};

/// Linear backoff: retry number `k` waits `k * base_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Run `action` until it succeeds or `policy.max_attempts` is used up.
///
/// The closure receives the 1-based attempt number. The error of the final
/// attempt is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut action: F) -> E2eResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match action(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                warn!("Giving up after {} attempt(s): {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_before(attempt);
                debug!("Attempt {}/{} failed ({}); retrying in {:?}", attempt, attempts, e, delay);
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Poll `condition` every `interval` until it holds or `timeout` elapses
pub async fn wait_until<F, Fut>(
    description: &str,
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> E2eResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if condition().await {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(E2eError::Timeout(description.to_string()));
        }
        sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_default_schedule_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_before(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_before(2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt <= 2 {
                    Err(E2eError::Timeout(format!("attempt {}", attempt)))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: E2eResult<()> = with_retry(&fast(4), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(E2eError::ElementNotFound(format!("attempt {}", attempt))) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(E2eError::ElementNotFound(msg)) => assert_eq!(msg, "attempt 4"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let _ = with_retry(&fast(0), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(E2eError::Timeout("x".into())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_one_then_two_seconds() {
        let start = Instant::now();
        let _: E2eResult<()> = with_retry(&RetryPolicy::default(), |_| async {
            Err(E2eError::Timeout("never".into()))
        })
        .await;
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_wait_until_observes_condition() {
        let polls = AtomicU32::new(0);
        let result = wait_until("counter", Duration::from_secs(1), Duration::from_millis(1), || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let result = wait_until("never", Duration::from_millis(20), Duration::from_millis(5), || async {
            false
        })
        .await;
        assert!(matches!(result, Err(E2eError::Timeout(ref what)) if what == "never"));
    }
}
