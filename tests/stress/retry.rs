//! Retry stress tests

use mintguard_core::RemoteError;
use mintguard_retry::{RetryConfig, RetryExecutor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::ConcurrencyTracker;

/// Test: 100k operations that each recover on their third attempt
#[tokio::test(start_paused = true)]
#[ignore]
async fn stress_many_recoveries() {
    let retry = RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .max_attempts(5)
            .initial_delay(Duration::from_millis(1))
            .transient_only()
            .build(),
    );

    let start = Instant::now();
    for _ in 0..100_000 {
        let attempts = &AtomicUsize::new(0);
        let result = retry
            .run(|| async move {
                if attempts.fetch_add(1, Ordering::Relaxed) < 2 {
                    Err(RemoteError::with_code("ECONNRESET", "connection reset"))
                } else {
                    Ok(())
                }
            })
            .await;
        assert!(result.is_ok());
    }

    println!("100k recovered operations in {:?}", start.elapsed());

    let stats = retry.stats();
    assert_eq!(stats.calls, 100_000);
    assert_eq!(stats.attempts, 300_000);
    assert_eq!(stats.retries, 200_000);
    assert_eq!(stats.successes, 100_000);
}

/// Test: thousands of tasks retrying concurrently against one executor
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_retries() {
    let retry = RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .max_attempts(3)
            .initial_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(5))
            .jitter(0.5)
            .transient_only()
            .build(),
    );
    let tracker = ConcurrencyTracker::new();
    let total_attempts = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..2_000usize {
        let retry = retry.clone();
        let tracker = Arc::clone(&tracker);
        let total_attempts = Arc::clone(&total_attempts);
        handles.push(tokio::spawn(async move {
            let attempts = AtomicUsize::new(0);
            let (tracker, total, attempts) = (&tracker, &total_attempts, &attempts);
            retry
                .run(|| async move {
                    tracker.enter();
                    total.fetch_add(1, Ordering::Relaxed);
                    let n = attempts.fetch_add(1, Ordering::Relaxed);
                    tokio::task::yield_now().await;
                    tracker.exit();
                    // Every other task exhausts its attempts.
                    if task % 2 == 0 || n < 1 {
                        Err(RemoteError::transient("socket hang up"))
                    } else {
                        Ok(())
                    }
                })
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    println!("2k concurrent retry sequences in {:?}", start.elapsed());
    println!("Peak concurrency: {}", tracker.peak());

    assert_eq!(successes, 1_000);
    // 1000 exhausted tasks x 3 attempts + 1000 recovered tasks x 2 attempts
    assert_eq!(total_attempts.load(Ordering::Relaxed), 5_000);
    assert_eq!(retry.stats().exhausted, 1_000);
    assert_eq!(tracker.current(), 0);
}
