//! Property tests for the retry executor.
//!
//! Invariants tested:
//! - Never exceeds max_attempts
//! - Stops at the first success
//! - Permanent errors are attempted once
//! - Backoff delays are monotonic and capped
//! - Jittered delays stay inside their band

use super::paused_runtime;
use mintguard_core::RemoteError;
use mintguard_retry::{RetryConfig, RetryExecutor};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn executor(max_attempts: usize) -> RetryExecutor<RemoteError> {
    RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .max_attempts(max_attempts)
            .initial_delay(Duration::from_millis(10))
            .max_delay(Duration::from_millis(200))
            .transient_only()
            .build(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: transient failures are attempted exactly max_attempts times
    #[test]
    fn respects_max_attempts(max_attempts in 1usize..=10) {
        paused_runtime().block_on(async {
            let retry = executor(max_attempts);
            let calls = &AtomicUsize::new(0);

            let result = retry
                .run(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(RemoteError::transient("socket hang up"))
                })
                .await;

            prop_assert!(result.is_err());
            prop_assert_eq!(calls.load(Ordering::SeqCst), max_attempts);

            let stats = retry.stats();
            prop_assert_eq!(stats.attempts, max_attempts as u64);
            prop_assert_eq!(stats.retries, max_attempts as u64 - 1);
            prop_assert_eq!(stats.exhausted, 1);

            Ok(())
        })?;
    }

    /// Property: success on the Nth attempt stops retrying
    #[test]
    fn stops_on_success(
        max_attempts in 1usize..=10,
        fail_first in 0usize..=12,
    ) {
        paused_runtime().block_on(async {
            let retry = executor(max_attempts);
            let calls = &AtomicUsize::new(0);

            let result = retry
                .run(|| async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < fail_first {
                        Err(RemoteError::with_code("ETIMEDOUT", "timed out"))
                    } else {
                        Ok(true)
                    }
                })
                .await;

            prop_assert_eq!(result.is_ok(), fail_first < max_attempts);
            prop_assert_eq!(calls.load(Ordering::SeqCst), (fail_first + 1).min(max_attempts));

            Ok(())
        })?;
    }

    /// Property: permanent errors are never retried
    #[test]
    fn permanent_errors_run_once(
        max_attempts in 1usize..=10,
        message in "[a-z ]{1,20}",
    ) {
        let error = RemoteError::permanent(message);
        paused_runtime().block_on(async {
            let retry = executor(max_attempts);
            let calls = &AtomicUsize::new(0);
            let error = &error;

            let result = retry
                .run(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(error.clone())
                })
                .await;

            prop_assert_eq!(result.unwrap_err(), error.clone());
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            prop_assert_eq!(retry.stats().non_retryable, 1);

            Ok(())
        })?;
    }

    /// Property: delays never decrease and never exceed the cap
    #[test]
    fn backoff_is_monotonic_and_capped(
        initial_ms in 1u64..=5_000,
        max_ms in 1u64..=60_000,
        multiplier in 1.0f64..=5.0,
    ) {
        let max_ms = max_ms.max(initial_ms);
        let config = RetryConfig::<RemoteError>::builder()
            .initial_delay(Duration::from_millis(initial_ms))
            .max_delay(Duration::from_millis(max_ms))
            .backoff_multiplier(multiplier)
            .build();

        prop_assert_eq!(config.delay_after(1), Duration::from_millis(initial_ms));

        let mut previous = Duration::ZERO;
        for failed in 1..=64 {
            let delay = config.delay_after(failed);
            prop_assert!(delay >= previous, "delay decreased at attempt {}", failed);
            prop_assert!(delay <= Duration::from_millis(max_ms));
            previous = delay;
        }
    }

    /// Property: jitter keeps each delay within factor of its base
    #[test]
    fn jitter_stays_in_band(
        initial_ms in 10u64..=1_000,
        factor in 0.0f64..=1.0,
        failed in 1usize..=8,
    ) {
        let base = RetryConfig::<RemoteError>::builder()
            .initial_delay(Duration::from_millis(initial_ms))
            .max_delay(Duration::from_secs(60))
            .build()
            .delay_after(failed)
            .as_secs_f64();
        let jittered = RetryConfig::<RemoteError>::builder()
            .initial_delay(Duration::from_millis(initial_ms))
            .max_delay(Duration::from_secs(60))
            .jitter(factor)
            .build();

        for _ in 0..20 {
            let delay = jittered.delay_after(failed).as_secs_f64();
            prop_assert!(delay >= base * (1.0 - factor) - 1e-6, "{} below band", delay);
            prop_assert!(delay <= base * (1.0 + factor) + 1e-6, "{} above band", delay);
        }
    }
}
