//! Health monitoring with automatic reconnection.
//!
//! Run with: cargo run --example health_monitor -p mintguard-connection
//!
//! The probe below fails for a few seconds after startup, then recovers.

use mintguard_connection::{
    ConnectionConfig, ConnectionEvent, ConnectionEventKind, ConnectionManager,
};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::main]
async fn main() {
    println!("Connection Manager - Health Monitor Example\n");

    let started = Instant::now();
    let probe = move || async move {
        if started.elapsed() < Duration::from_secs(3) {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        } else {
            Ok(true)
        }
    };

    let manager = ConnectionManager::new(
        probe,
        ConnectionConfig::builder()
            .name("authority")
            .health_check_interval(Duration::from_secs(1))
            .health_check_timeout(Duration::from_millis(500))
            .reconnect_delay(Duration::from_millis(250))
            .max_reconnect_delay(Duration::from_secs(2))
            .on_state_change(|from, to| println!("  [STATE] {from} -> {to}"))
            .build(),
    );

    manager.on(ConnectionEventKind::Reconnecting, |event| {
        if let ConnectionEvent::Reconnecting { attempt, delay, .. } = event {
            println!("  [RECONNECT] attempt {attempt} in {delay:?}");
        }
    });
    manager.on(ConnectionEventKind::Unhealthy, |event| {
        if let ConnectionEvent::Unhealthy { error, .. } = event {
            println!("  [UNHEALTHY] {error}");
        }
    });

    println!("connect() -> {}", manager.connect().await);
    tokio::time::sleep(Duration::from_secs(6)).await;

    let metrics = manager.metrics();
    let stats = manager.stats();
    println!("\nstate: {}", metrics.state);
    println!(
        "checks: {} ({} ok, {} failed), reconnects: {}",
        stats.health_checks, stats.successful_checks, stats.failed_checks, stats.reconnect_attempts
    );

    manager.disconnect();
    println!("after disconnect: {}", manager.state());
}
