//! A validation client protected by the full runtime.
//!
//! Run with: cargo run --example full_stack -p mintguard --features tracing
//!
//! The simulated authority times out on its first attempts, then recovers.
//! Watch the retries, the breaker and the cache in the logs.

use mintguard::{CallError, ResilienceRuntime, ResilienceSettings};
use mintguard_core::RemoteError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut settings = ResilienceSettings::default();
    settings.name = "authority".to_string();
    settings.retry.initial_delay_ms = 100;
    settings.retry.max_delay_ms = 400;
    settings.circuit_breaker.failure_threshold = 2;
    settings.circuit_breaker.reset_timeout_ms = 1_000;
    settings.connection.health_check_interval_ms = 500;

    let calls = Arc::new(AtomicUsize::new(0));
    let runtime: ResilienceRuntime<RemoteError> = ResilienceRuntime::with_probe(settings, || async {
        Ok::<_, RemoteError>(true)
    })
    .expect("valid settings");

    println!("connected: {}", runtime.start().await);

    // 1. Two timeouts, then success: recovered by retries.
    let result = validate(&runtime, "entity-1", &calls, 2).await;
    println!("entity-1 -> {result:?}");

    // 2. Same key again: served from cache, no remote call.
    let before = calls.load(Ordering::SeqCst);
    let result = validate(&runtime, "entity-1", &calls, 0).await;
    println!(
        "entity-1 (cached) -> {result:?}, remote calls: {}",
        calls.load(Ordering::SeqCst) - before
    );

    // 3. A permanently failing key: one attempt each, breaker opens after two.
    for _ in 0..3 {
        let result = runtime
            .facade()
            .call(|| async { Err::<bool, _>(RemoteError::with_code("E_DENIED", "token rejected")) })
            .await;
        match result {
            Err(CallError::CircuitOpen { retry_after }) => {
                println!("rejected by breaker, retry after {retry_after:?}")
            }
            other => println!("denied -> {other:?}"),
        }
    }

    let status = runtime.status().await;
    println!("\nhealth: {}", status.health);
    println!("breaker: {:?}", status.circuit_breaker_stats);
    println!("retry: {:?}", status.retry);
    println!("cache: hit rate {:.0}%", status.cache.hit_rate() * 100.0);

    runtime.shutdown();
}

/// Validates `key`, failing with a timeout on the first `failures` attempts.
async fn validate(
    runtime: &ResilienceRuntime<RemoteError>,
    key: &str,
    calls: &Arc<AtomicUsize>,
    failures: usize,
) -> Result<bool, CallError<RemoteError>> {
    let attempt = AtomicUsize::new(0);
    runtime
        .facade()
        .cached_call(runtime.cache(), key, || {
            calls.fetch_add(1, Ordering::SeqCst);
            let n = attempt.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < failures {
                    Err(RemoteError::with_code("ETIMEDOUT", "request timed out"))
                } else {
                    Ok(true)
                }
            }
        })
        .await
}
