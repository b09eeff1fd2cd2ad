use mintguard_core::RemoteError;
use mintguard_retry::{FnInterval, RetryConfig, RetryExecutor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("mintguard retry example");
    println!("=======================\n");

    // Example 1: transient failures are retried with exponential backoff
    println!("Example 1: recovering from timeouts");
    let retry = RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .name("authority")
            .max_attempts(4)
            .initial_delay(Duration::from_millis(50))
            .max_delay(Duration::from_millis(200))
            .transient_only()
            .on_retry(|attempt, delay| {
                println!("  [RETRY] attempt {} failed, waiting {:?}", attempt, delay);
            })
            .on_success(|attempts| {
                println!("  [SUCCESS] after {} total attempts", attempts);
            })
            .build(),
    );

    let calls = &AtomicUsize::new(0);
    let id = retry
        .run(|| async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(RemoteError::with_code("ETIMEDOUT", "authority timed out"))
            } else {
                Ok("01-A-CHI-1234-P-2509-3-X".to_string())
            }
        })
        .await?;
    println!("  minted: {}\n", id);

    // Example 2: permanent failures surface immediately
    println!("Example 2: permanent error");
    let result = retry
        .run(|| async { Err::<String, _>(RemoteError::new("401 unauthorized")) })
        .await;
    println!("  result: {:?}\n", result.map_err(|e| e.to_string()));

    // Example 3: custom schedule
    println!("Example 3: linear schedule");
    let linear = RetryExecutor::new(
        RetryConfig::<RemoteError>::builder()
            .max_attempts(3)
            .backoff(FnInterval::new(|attempt| {
                Duration::from_millis(25 * (attempt as u64 + 1))
            }))
            .on_error(|attempts| println!("  [EXHAUSTED] after {} attempts", attempts))
            .build(),
    );
    let _ = linear
        .run(|| async { Err::<(), _>(RemoteError::transient("connection reset")) })
        .await;

    println!("\nstats: {:?}", retry.stats());
    Ok(())
}
