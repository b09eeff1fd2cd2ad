use super::breaker;
use mintguard_circuitbreaker::CircuitState;
use mintguard_core::RemoteError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Concurrent failures across clones open one shared circuit
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clones_share_one_circuit() {
    let breaker = breaker(10, Duration::from_secs(60), Duration::from_secs(60));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let breaker = breaker.clone();
        handles.push(tokio::spawn(async move {
            breaker
                .execute(|| async { Err::<(), _>(RemoteError::new("connection reset")) })
                .await
        }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    assert_eq!(breaker.state().await, CircuitState::Open);
    assert_eq!(breaker.stats().failures, 10);
}

/// Under mixed load every call is either run or rejected, never lost
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_call_is_accounted_for() {
    let breaker = breaker(20, Duration::from_secs(60), Duration::from_secs(60));
    let executed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..200usize {
        let breaker = breaker.clone();
        let executed = Arc::clone(&executed);
        handles.push(tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    executed.fetch_add(1, Ordering::SeqCst);
                    if i % 3 == 0 {
                        Err(RemoteError::new("timeout"))
                    } else {
                        Ok(i)
                    }
                })
                .await
        }));
    }

    let mut rejected = 0;
    for handle in handles {
        if let Err(err) = handle.await.unwrap() {
            if err.is_circuit_open() {
                rejected += 1;
            }
        }
    }

    let stats = breaker.stats();
    assert_eq!(stats.calls, 200);
    assert_eq!(stats.rejections as usize, rejected);
    assert_eq!(
        (stats.successes + stats.failures) as usize,
        executed.load(Ordering::SeqCst)
    );
    assert_eq!(executed.load(Ordering::SeqCst) + rejected, 200);
}

/// The lock-free state read agrees with the locked one once calls settle
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sync_state_matches_async_state() {
    let breaker = breaker(3, Duration::from_secs(60), Duration::from_secs(60));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let breaker = breaker.clone();
        handles.push(tokio::spawn(async move {
            breaker
                .execute(|| async { Err::<(), _>(RemoteError::new("dns failure")) })
                .await
        }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    assert_eq!(breaker.state_sync(), breaker.state().await);
    assert!(breaker.is_open());
}
