//! Tests for the retry executor.
//!
//! Test organization:
//! - attempts.rs: attempt counting and exhaustion
//! - backoff.rs: delay schedule, caps and jitter bounds
//! - classification.rs: which errors are retried
//! - cancellation.rs: dropping a run mid-delay

mod classification;

use mintguard_core::RemoteError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// An operation failing `failures` times with `error` before succeeding.
pub(crate) fn flaky(
    failures: usize,
    error: RemoteError,
) -> (
    Arc<AtomicUsize>,
    impl FnMut() -> futures::future::Ready<Result<&'static str, RemoteError>>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let operation = move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            futures::future::ready(Err(error.clone()))
        } else {
            futures::future::ready(Ok("valid"))
        }
    };
    (calls, operation)
}

pub(crate) fn timeout() -> RemoteError {
    RemoteError::with_code("ETIMEDOUT", "request timed out")
}

pub(crate) const INITIAL: Duration = Duration::from_millis(100);
