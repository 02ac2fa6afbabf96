//! Explicit retry loop with pluggable backoff
//!
//! A flat loop instead of nested timers: callers pass the attempt budget and a
//! backoff function, and get a plain result back.

use std::future::Future;
use std::time::Duration;

/// Terminal failure after exhausting all attempts
#[derive(Debug)]
pub struct RetryError {
    /// Message from the last failed attempt
    pub message: String,
    /// Total attempts made
    pub attempts: u32,
}

/// Exponential backoff: `2^(attempt-1)` seconds (1s, 2s, 4s, ...)
#[must_use]
pub fn exponential_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(16))
}

/// Run `op` up to `max_attempts` times, sleeping `backoff(attempt)` between
/// failures
///
/// The attempt number (starting at 1) is passed to each invocation. Returns
/// the successful value together with the attempt count that produced it.
///
/// # Errors
///
/// Returns [`RetryError`] carrying the last error's message once all attempts
/// are exhausted.
pub async fn with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff: fn(u32) -> Duration,
    mut op: F,
) -> Result<(T, u32), RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(e) => {
                last_error = e.to_string();
                if attempt < max_attempts {
                    let delay = backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %last_error,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(RetryError {
        message: last_error,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::Error;

    fn fast_backoff(_attempt: u32) -> Duration {
        Duration::from_millis(1)
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(exponential_backoff(1), Duration::from_secs(1));
        assert_eq!(exponential_backoff(2), Duration::from_secs(2));
        assert_eq!(exponential_backoff(3), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn succeeds_first_try() {
        let (value, attempts) = with_backoff(3, fast_backoff, |_| async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn recovers_after_failures() {
        let calls = AtomicU32::new(0);
        let (value, attempts) = with_backoff(3, fast_backoff, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(Error::Provider("boom".to_string()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ok");
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_and_reports_last_error() {
        let err = with_backoff(3, fast_backoff, |attempt| async move {
            Err::<(), _>(Error::Provider(format!("fail {attempt}")))
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(err.message.contains("fail 3"));
    }
}
