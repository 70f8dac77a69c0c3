//! Backoff on rate-limited upstream calls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokoku_web::gemini::GeminiError;
use tokoku_web::retry::{RetryPolicy, Retryable, with_backoff};

const FAST: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    base_delay: Duration::from_millis(1),
};

#[test]
fn test_default_policy_waits_one_then_two_seconds() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay_for(0), Duration::from_secs(1));
    assert_eq!(policy.delay_for(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for(2), Duration::from_secs(4));
}

#[test]
fn test_only_rate_limits_are_retryable() {
    assert!(GeminiError::RateLimited(1).is_retryable());
    assert!(!GeminiError::Unauthorized("bad key".to_owned()).is_retryable());
    assert!(!GeminiError::EmptyResponse("no candidates".to_owned()).is_retryable());
}

#[tokio::test]
async fn test_rate_limited_call_succeeds_on_third_attempt() {
    let calls = AtomicU32::new(0);

    let result = with_backoff(FAST, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(GeminiError::RateLimited(1))
            } else {
                Ok("balasan")
            }
        }
    })
    .await;

    assert_eq!(result.expect("third attempt succeeds"), "balasan");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let calls = AtomicU32::new(0);

    let result: Result<(), GeminiError> = with_backoff(FAST, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(GeminiError::RateLimited(1)) }
    })
    .await;

    assert!(matches!(result, Err(GeminiError::RateLimited(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_retryable_error_is_returned_immediately() {
    let calls = AtomicU32::new(0);

    let result: Result<(), GeminiError> = with_backoff(FAST, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(GeminiError::Unauthorized("bad key".to_owned())) }
    })
    .await;

    assert!(matches!(result, Err(GeminiError::Unauthorized(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
