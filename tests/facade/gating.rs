use super::facade;
use mintguard::connection::{BoxHealthProbe, ConnectionConfig, ConnectionManager, ConnectionState};
use mintguard::core::RemoteError;
use mintguard::CallError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn manager(healthy: Arc<AtomicBool>, max_attempts: u32) -> ConnectionManager<BoxHealthProbe> {
    ConnectionManager::new(
        BoxHealthProbe::new(move || {
            let healthy = healthy.load(Ordering::SeqCst);
            async move { Ok::<_, RemoteError>(healthy) }
        }),
        ConnectionConfig::builder()
            .name("authority")
            .reconnect_delay(Duration::from_secs(1))
            .max_reconnect_attempts(max_attempts)
            .build(),
    )
}

/// A failed connection rejects calls without running them
#[tokio::test(start_paused = true)]
async fn failed_connection_rejects() {
    let healthy = Arc::new(AtomicBool::new(false));
    let manager = manager(Arc::clone(&healthy), 0);
    assert!(!manager.connect().await);
    assert_eq!(manager.state(), ConnectionState::Failed);

    let facade = facade(5, 3).with_connection(manager, true);
    let calls = AtomicUsize::new(0);
    let err = facade
        .call(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RemoteError>(true) }
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CallError::Unavailable {
            state: ConnectionState::Failed
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(facade.breaker().stats().calls, 0);
}

/// While reconnection is still in progress calls are let through
#[tokio::test(start_paused = true)]
async fn reconnecting_passes() {
    let healthy = Arc::new(AtomicBool::new(false));
    let manager = manager(Arc::clone(&healthy), 3);
    manager.connect().await;
    assert_eq!(manager.state(), ConnectionState::Reconnecting);

    let facade = facade(5, 3).with_connection(manager.clone(), true);
    assert!(facade
        .call(|| async { Ok::<_, RemoteError>(true) })
        .await
        .unwrap());
    manager.disconnect();
}

/// Without `require` the connection state is advisory only
#[tokio::test(start_paused = true)]
async fn advisory_connection_never_gates() {
    let manager = manager(Arc::new(AtomicBool::new(false)), 0);
    manager.connect().await;
    assert_eq!(manager.state(), ConnectionState::Failed);

    let facade = facade(5, 3).with_connection(manager, false);
    assert!(facade.connection().is_some());
    assert!(facade
        .call(|| async { Ok::<_, RemoteError>(true) })
        .await
        .is_ok());
}

/// Resetting the manager lifts the gate
#[tokio::test(start_paused = true)]
async fn reset_lifts_gate() {
    let healthy = Arc::new(AtomicBool::new(false));
    let manager = manager(Arc::clone(&healthy), 0);
    manager.connect().await;

    let facade = facade(5, 3).with_connection(manager.clone(), true);
    assert!(facade
        .call(|| async { Ok::<_, RemoteError>(true) })
        .await
        .is_err());

    healthy.store(true, Ordering::SeqCst);
    manager.reset();
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert!(facade
        .call(|| async { Ok::<_, RemoteError>(true) })
        .await
        .unwrap());

    assert!(manager.connect().await);
    manager.disconnect();
}

/// Disabled mode skips the gate as well
#[tokio::test(start_paused = true)]
async fn disabled_skips_gate() {
    let manager = manager(Arc::new(AtomicBool::new(false)), 0);
    manager.connect().await;

    let facade = facade(5, 3).with_connection(manager, true).enabled(false);
    assert!(facade
        .call(|| async { Ok::<_, RemoteError>(true) })
        .await
        .unwrap());
}
