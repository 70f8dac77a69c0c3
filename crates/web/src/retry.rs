//! Exponential backoff for outbound API calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Errors that can tell whether repeating the call might succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// How many times to try and how long to wait between tries.
///
/// The wait before retry `n` (zero-based) is `base_delay × 2ⁿ`. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Three attempts, waiting 1s then 2s.
    pub const DEFAULT: Self = Self {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
    };

    /// Delay after the given failed attempt (zero-based).
    #[must_use]
    pub const fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Run `f` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. The last error is returned.
///
/// # Errors
///
/// Returns the error from the final attempt.
pub async fn with_backoff<F, Fut, T, E>(policy: RetryPolicy, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0_u32;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "retryable error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Busy,
        Broken,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Busy)
        }
    }

    const FAST: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    };

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::DEFAULT;
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let attempts = AtomicU32::new(0);
        let result = with_backoff(FAST, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, TestError>(42) }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let result = with_backoff(FAST, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(TestError::Broken) }
        })
        .await;
        assert_eq!(result, Err(TestError::Broken));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_error_stops_after_three_attempts() {
        let attempts = AtomicU32::new(0);
        let result = with_backoff(FAST, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(TestError::Busy) }
        })
        .await;
        assert_eq!(result, Err(TestError::Busy));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_succeeds_on_final_attempt() {
        let attempts = AtomicU32::new(0);
        let result = with_backoff(FAST, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(TestError::Busy)
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(99));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
