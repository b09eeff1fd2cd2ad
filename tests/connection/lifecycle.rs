use super::{config, Switch};
use mintguard_connection::{ConnectionManager, ConnectionState, ConnectionStats};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// A healthy first check connects and starts periodic monitoring
#[tokio::test(start_paused = true)]
async fn connect_then_monitor() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    assert!(manager.connect().await);
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(switch.probes(), 1);

    sleep(Duration::from_secs(95)).await;
    assert_eq!(switch.probes(), 4);
    assert_eq!(manager.state(), ConnectionState::Connected);
}

/// Connecting twice does not start a second monitor
#[tokio::test(start_paused = true)]
async fn connect_is_idempotent_while_connected() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());

    assert!(manager.connect().await);
    assert!(manager.connect().await);
    assert_eq!(switch.probes(), 1);

    sleep(Duration::from_secs(31)).await;
    assert_eq!(switch.probes(), 2);
}

/// An unhealthy first check goes straight to reconnecting
#[tokio::test(start_paused = true)]
async fn failed_first_check_reconnects() {
    let switch = Switch::new(false);
    let manager = switch.manager(config());

    assert!(!manager.connect().await);
    assert_eq!(manager.state(), ConnectionState::Reconnecting);
    assert_eq!(manager.metrics().reconnect_attempts, 1);

    switch.set(true);
    sleep(Duration::from_millis(1_001)).await;
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(manager.metrics().reconnect_attempts, 0);
}

/// A monitoring failure moves to reconnecting; recovery returns to connected
#[tokio::test(start_paused = true)]
async fn loss_and_recovery() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());
    manager.connect().await;

    switch.set(false);
    sleep(Duration::from_millis(30_001)).await;
    assert_eq!(manager.state(), ConnectionState::Reconnecting);
    assert!(manager.metrics().last_error.is_some());

    switch.set(true);
    sleep(Duration::from_millis(1_001)).await;
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(manager.stats().connections, 2);
}

/// Disconnect cancels pending reconnects
#[tokio::test(start_paused = true)]
async fn disconnect_cancels_reconnects() {
    let switch = Switch::new(false);
    let manager = switch.manager(config());
    manager.connect().await;
    assert_eq!(manager.state(), ConnectionState::Reconnecting);

    manager.disconnect();
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(manager.metrics().reconnect_attempts, 0);

    sleep(Duration::from_secs(300)).await;
    assert_eq!(switch.probes(), 1);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

/// Disconnect cancels periodic monitoring
#[tokio::test(start_paused = true)]
async fn disconnect_stops_monitoring() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());
    manager.connect().await;

    manager.disconnect();
    sleep(Duration::from_secs(300)).await;
    assert_eq!(switch.probes(), 1);
}

/// Disconnecting an idle manager changes nothing
#[tokio::test(start_paused = true)]
async fn disconnect_when_disconnected() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());

    manager.disconnect();
    manager.disconnect();
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

/// Dropping every clone stops the background task
#[tokio::test(start_paused = true)]
async fn drop_stops_monitoring() {
    let switch = Switch::new(true);
    let manager = switch.manager(config());
    manager.connect().await;
    let clone = manager.clone();

    drop(manager);
    sleep(Duration::from_secs(31)).await;
    assert_eq!(switch.probes(), 2);

    drop(clone);
    sleep(Duration::from_secs(300)).await;
    assert_eq!(switch.probes(), 2);
}

/// Reset disconnects and clears counters and history
#[tokio::test(start_paused = true)]
async fn reset_clears_history() {
    let switch = Switch::new(false);
    let manager = switch.manager(config());
    manager.connect().await;

    manager.reset();

    let metrics = manager.metrics();
    assert_eq!(metrics.state, ConnectionState::Disconnected);
    assert_eq!(metrics.reconnect_attempts, 0);
    assert_eq!(metrics.last_error, None);
    assert_eq!(metrics.time_since_last_success, None);
    assert_eq!(manager.stats(), ConnectionStats::default());
}

/// Reconnecting after a reset starts from a clean budget
#[tokio::test(start_paused = true)]
async fn connect_after_reset() {
    let switch = Switch::new(false);
    let manager = switch.manager(config().max_reconnect_attempts(1));
    manager.connect().await;
    sleep(Duration::from_secs(2)).await;
    assert_eq!(manager.state(), ConnectionState::Failed);

    manager.reset();
    switch.set(true);
    assert!(manager.connect().await);
    assert_eq!(manager.stats().connections, 1);
}

/// Abandoning connect() part way through still settles the state
#[tokio::test(start_paused = true)]
async fn abandoned_connect_still_settles() {
    let probes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&probes);
    let manager = ConnectionManager::new(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_secs(3)).await;
                Ok::<_, std::io::Error>(true)
            }
        },
        config().build(),
    );

    let abandoned = tokio::time::timeout(Duration::from_secs(1), manager.connect()).await;
    assert!(abandoned.is_err());
    assert_eq!(manager.state(), ConnectionState::Connecting);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(probes.load(Ordering::SeqCst), 1);

    assert!(manager.connect().await);
    assert_eq!(probes.load(Ordering::SeqCst), 1);
}

/// A caller that gives up on connect() does not block the next one
#[tokio::test(start_paused = true)]
async fn connect_after_abandoned_failure() {
    let switch = Switch::new(false);
    let manager = switch.manager(config().max_reconnect_attempts(0));

    let _ = tokio::time::timeout(Duration::ZERO, manager.connect()).await;
    sleep(Duration::from_millis(10)).await;
    assert_eq!(manager.state(), ConnectionState::Failed);

    switch.set(true);
    assert!(manager.connect().await);
    assert_eq!(switch.probes(), 2);
}
