//! Health check example demonstrating state inspection.
//!
//! Trips a breaker with failing calls, then shows how `state_sync()`,
//! `health_status()` and `metrics()` report it while it recovers.
//!
//! Run with:
//! ```bash
//! cargo run --example circuitbreaker_health_check --features tracing
//! ```

use mintguard_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use std::time::Duration;

async fn authority(request: &str) -> Result<String, String> {
    tokio::time::sleep(Duration::from_millis(10)).await;
    if request.contains("fail") {
        Err("authority returned 502".to_string())
    } else {
        Ok(format!("minted for {}", request))
    }
}

fn report(breaker: &CircuitBreaker) {
    let http = if breaker.is_open() { 503 } else { 200 };
    println!(
        "  health: {} ({}), state {}",
        breaker.health_status(),
        http,
        breaker.state_sync()
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let breaker = CircuitBreaker::new(
        CircuitBreakerConfig::fast_fail()
            .name("authority")
            .reset_timeout(Duration::from_millis(300))
            .on_state_transition(|from, to| println!("  [TRANSITION] {} -> {}", from, to))
            .build(),
    );

    println!("Sending failing requests");
    for i in 0..4 {
        let request = format!("fail-{}", i);
        match breaker.execute(|| authority(&request)).await {
            Ok(body) => println!("  ok: {}", body),
            Err(CircuitBreakerError::OpenCircuit { retry_after }) => {
                println!("  rejected, retry after {:?}", retry_after)
            }
            Err(CircuitBreakerError::Inner(e)) => println!("  failed: {}", e),
        }
    }
    report(&breaker);

    let metrics = breaker.metrics().await;
    println!("  metrics: {:?}", metrics);

    println!("\nWaiting for reset timeout");
    tokio::time::sleep(Duration::from_millis(350)).await;

    match breaker.execute(|| authority("probe")).await {
        Ok(body) => println!("  probe ok: {}", body),
        Err(e) => println!("  probe failed: {}", e),
    }
    report(&breaker);
    println!("  stats: {:?}", breaker.stats());
}
