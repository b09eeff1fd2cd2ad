//! Connection manager metrics regression tests

use super::helpers::*;
use mintguard_connection::{ConnectionConfig, ConnectionManager};
use mintguard_core::RemoteError;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn connection_metrics_exist() {
    init_recorder();

    let healthy = Arc::new(AtomicBool::new(false));
    let h = Arc::clone(&healthy);
    let manager = ConnectionManager::new(
        move || {
            let healthy = h.load(Ordering::SeqCst);
            async move { Ok::<_, RemoteError>(healthy) }
        },
        ConnectionConfig::builder()
            .name("test_conn")
            .reconnect_delay(Duration::from_millis(10))
            .build(),
    );

    assert!(!manager.connect().await);
    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_counter_exists("connection_health_checks_total");
    assert_metric_has_label("connection_health_checks_total", "connection", "test_conn");
    assert_metric_has_label("connection_health_checks_total", "result", "success");
    assert_metric_has_label("connection_health_checks_total", "result", "failure");

    assert_counter_exists("connection_reconnect_attempts_total");
    assert_metric_has_label("connection_reconnect_attempts_total", "connection", "test_conn");

    assert_gauge_exists("connection_state");
    assert_eq!(gauge_value("connection_state", &[("connection", "test_conn")]), Some(2.0));

    manager.disconnect();
    assert_eq!(gauge_value("connection_state", &[("connection", "test_conn")]), Some(0.0));
}

#[tokio::test(start_paused = true)]
#[serial]
async fn connection_failed_state_gauge() {
    init_recorder();

    let manager = ConnectionManager::new(
        || async { Ok::<_, RemoteError>(false) },
        ConnectionConfig::builder()
            .name("failing_conn")
            .reconnect_delay(Duration::from_secs(1))
            .max_reconnect_attempts(2)
            .build(),
    );

    manager.connect().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    // The initial probe plus two reconnect probes
    assert_eq!(
        counter_value(
            "connection_health_checks_total",
            &[("connection", "failing_conn"), ("result", "failure")],
        ),
        3
    );
    assert_eq!(
        counter_value("connection_reconnect_attempts_total", &[("connection", "failing_conn")]),
        2
    );
    assert_eq!(gauge_value("connection_state", &[("connection", "failing_conn")]), Some(4.0));
}
