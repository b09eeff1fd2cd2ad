use super::{flaky, timeout, INITIAL};
use mintguard_core::RemoteError;
use mintguard_retry::{RetryConfig, RetryExecutor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn transient_only() -> RetryExecutor<RemoteError> {
    RetryExecutor::new(
        RetryConfig::builder()
            .max_attempts(5)
            .initial_delay(INITIAL)
            .transient_only()
            .build(),
    )
}

/// A permanent error ends the run after one attempt
#[tokio::test(start_paused = true)]
async fn permanent_error_is_not_retried() {
    let retry = transient_only();
    let (calls, operation) = flaky(usize::MAX, RemoteError::new("entity type is invalid"));

    let err = retry.run(operation).await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.message(), "entity type is invalid");
    assert_eq!(retry.stats().non_retryable, 1);
}

/// Every transient shape is retried
#[tokio::test(start_paused = true)]
async fn transient_errors_are_retried() {
    let retry = transient_only();
    for error in [
        timeout(),
        RemoteError::with_code("ECONNREFUSED", "connect failed"),
        RemoteError::new("DNS resolution failed"),
        RemoteError::new("socket hang up"),
    ] {
        let (calls, operation) = flaky(2, error);
        retry.run(operation).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

/// A transient failure followed by a permanent one stops at the permanent one
#[tokio::test(start_paused = true)]
async fn permanent_after_transient_stops() {
    let retry = transient_only();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let result = retry
        .run(move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err::<(), _>(timeout())
                } else {
                    Err(RemoteError::permanent("quota exhausted"))
                }
            }
        })
        .await;

    assert_eq!(result.unwrap_err().message(), "quota exhausted");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Without a predicate every error is retried
#[tokio::test(start_paused = true)]
async fn default_predicate_retries_everything() {
    let retry = RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .max_attempts(3)
            .initial_delay(INITIAL)
            .build(),
    );
    let (calls, operation) = flaky(usize::MAX, RemoteError::permanent("denied"));

    retry.run(operation).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// The default executor only retries transient errors
#[tokio::test(start_paused = true)]
async fn default_executor_is_transient_only() {
    let retry = RetryExecutor::<RemoteError>::default();
    let (calls, operation) = flaky(usize::MAX, RemoteError::permanent("denied"));

    retry.run(operation).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Custom predicates see the concrete error type
#[tokio::test(start_paused = true)]
async fn custom_predicate() {
    let ignored = Arc::new(AtomicUsize::new(0));
    let i = Arc::clone(&ignored);
    let retry = RetryExecutor::new(
        RetryConfig::builder()
            .max_attempts(4)
            .initial_delay(INITIAL)
            .retry_on(|err: &RemoteError| err.code() == Some("E_BUSY"))
            .on_ignored_error(move || {
                i.fetch_add(1, Ordering::SeqCst);
            })
            .build(),
    );

    let (busy, operation) = flaky(3, RemoteError::with_code("E_BUSY", "busy"));
    retry.run(operation).await.unwrap();
    assert_eq!(busy.load(Ordering::SeqCst), 4);

    let (calls, operation) = flaky(3, timeout());
    retry.run(operation).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ignored.load(Ordering::SeqCst), 1);
}

/// io errors classify by kind
#[tokio::test(start_paused = true)]
async fn io_errors_use_kind() {
    let retry = RetryExecutor::new(
        RetryConfig::<std::io::Error>::builder()
            .max_attempts(3)
            .initial_delay(INITIAL)
            .transient_only()
            .build(),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    retry
        .run(move || {
            c.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                ))
            }
        })
        .await
        .unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
