use crate::config::ConnectionConfig;
use crate::events::{ConnectionEvent, ConnectionEventKind};
use crate::probe::{HealthProbe, ProbeError};
use crate::stats::{ConnectionStats, StatsCounters};
use crate::ConnectionState;
use mintguard_core::events::{EventListeners, FnListener, ListenerId};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// Point-in-time view of a [`ConnectionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConnectionMetrics {
    pub state: ConnectionState,
    /// Reconnect attempts scheduled since the last successful check.
    pub reconnect_attempts: u32,
    /// Time since the last health check that passed, if any has.
    pub time_since_last_success: Option<Duration>,
    /// Message of the most recent failed health check.
    pub last_error: Option<String>,
}

/// Keeps track of whether a remote dependency is reachable.
///
/// After [`connect`](Self::connect) the manager probes the dependency every
/// `health_check_interval`. A failed probe moves it to
/// [`ConnectionState::Reconnecting`] and schedules reconnect probes with
/// exponential backoff until one passes or `max_reconnect_attempts` runs out.
///
/// Cloning is cheap; clones share state. Background timers stop on
/// [`disconnect`](Self::disconnect), [`reset`](Self::reset), or when the last
/// clone is dropped.
///
/// # Example
///
/// ```
/// use mintguard_connection::{ConnectionConfig, ConnectionManager, ConnectionState};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let manager = ConnectionManager::new(
///     || async { Ok::<_, std::io::Error>(true) },
///     ConnectionConfig::builder()
///         .name("authority")
///         .health_check_interval(Duration::from_secs(10))
///         .build(),
/// );
///
/// manager.connect().await;
/// assert_eq!(manager.state(), ConnectionState::Connected);
/// manager.disconnect();
/// # }
/// ```
pub struct ConnectionManager<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for ConnectionManager<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<P> {
    probe: P,
    config: ConnectionConfig,
    listeners: RwLock<EventListeners<ConnectionEvent>>,
    shared: Mutex<Shared>,
    state_atomic: AtomicU8,
    stats: StatsCounters,
}

struct Shared {
    state: ConnectionState,
    /// Bumped whenever timers are cancelled. A timer acts only while its
    /// generation is current.
    generation: u64,
    reconnect_attempts: u32,
    last_success: Option<Instant>,
    last_error: Option<String>,
    timer: Option<JoinHandle<()>>,
}

impl Shared {
    fn cancel_timer(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// What the background task does next.
enum Next {
    Check,
    Monitor,
    Reconnect(Duration),
}

impl<P> Drop for Inner<P> {
    fn drop(&mut self) {
        let shared = self.shared.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = shared.timer.take() {
            timer.abort();
        }
    }
}

impl<P: HealthProbe> ConnectionManager<P> {
    /// Creates a disconnected manager. Nothing runs until [`connect`](Self::connect).
    pub fn new(probe: P, config: ConnectionConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "connection_health_checks_total",
                "Total number of health checks by result"
            );
            describe_counter!(
                "connection_reconnect_attempts_total",
                "Total number of scheduled reconnect attempts"
            );
            describe_gauge!(
                "connection_state",
                "Connection state (0=disconnected, 1=connecting, 2=connected, 3=reconnecting, 4=failed)"
            );
        }

        let listeners = config.event_listeners.clone();
        Self {
            inner: Arc::new(Inner {
                probe,
                config,
                listeners: RwLock::new(listeners),
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    generation: 0,
                    reconnect_attempts: 0,
                    last_success: None,
                    last_error: None,
                    timer: None,
                }),
                state_atomic: AtomicU8::new(ConnectionState::Disconnected as u8),
                stats: StatsCounters::default(),
            }),
        }
    }

    /// Performs one health check and starts background monitoring or
    /// reconnecting depending on its outcome.
    ///
    /// Does nothing if already Connected or Connecting. Returns whether the
    /// manager is Connected afterwards.
    ///
    /// The check runs on the manager's background task, so dropping this
    /// future does not leave the manager in [`ConnectionState::Connecting`].
    pub async fn connect(&self) -> bool {
        let (generation, events) = {
            let mut shared = self.inner.lock();
            if matches!(
                shared.state,
                ConnectionState::Connected | ConnectionState::Connecting
            ) {
                return shared.state.is_connected();
            }
            shared.cancel_timer();
            shared.reconnect_attempts = 0;
            let mut events = Vec::new();
            self.inner
                .transition(&mut shared, ConnectionState::Connecting, &mut events);
            (shared.generation, events)
        };
        self.inner.emit_all(events);

        let (tx, rx) = oneshot::channel();
        self.spawn_timer(generation, Next::Check, Some(tx));
        match rx.await {
            Ok(connected) => connected,
            Err(_) => self.state().is_connected(),
        }
    }

    /// Stops all timers, forgets reconnect progress and enters
    /// [`ConnectionState::Disconnected`].
    pub fn disconnect(&self) {
        let mut events = Vec::new();
        {
            let mut shared = self.inner.lock();
            shared.cancel_timer();
            shared.reconnect_attempts = 0;
            if shared.state != ConnectionState::Disconnected {
                self.inner
                    .transition(&mut shared, ConnectionState::Disconnected, &mut events);
                events.push(ConnectionEvent::Disconnected {
                    pattern_name: self.inner.config.name.clone(),
                    timestamp: Instant::now(),
                });
            }
        }

        #[cfg(feature = "tracing")]
        {
            if !events.is_empty() {
                info!(connection = %self.inner.config.name, "disconnected");
            }
        }

        self.inner.emit_all(events);
    }

    /// Disconnects and zeroes statistics.
    pub fn reset(&self) {
        self.disconnect();
        {
            let mut shared = self.inner.lock();
            shared.last_success = None;
            shared.last_error = None;
        }
        self.inner.stats.reset();
    }

    /// Probes the dependency once under the configured timeout.
    ///
    /// Updates counters, the last error and the last success time. Does not
    /// change state.
    pub async fn perform_health_check(&self) -> bool {
        self.inner.health_check().await
    }

    /// Subscribes `handler` to events of `kind`.
    pub fn on<F>(&self, kind: ConnectionEventKind, handler: F) -> ListenerId
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.add(FnListener::new(move |event: &ConnectionEvent| {
            if event.kind() == kind {
                handler(event);
            }
        }))
    }

    /// Removes a listener added with [`on`](Self::on). Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Current state, without locking.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state_atomic.load(Ordering::Acquire))
    }

    /// Returns a point-in-time view of the manager.
    pub fn metrics(&self) -> ConnectionMetrics {
        let shared = self.inner.lock();
        ConnectionMetrics {
            state: shared.state,
            reconnect_attempts: shared.reconnect_attempts,
            time_since_last_success: shared.last_success.map(|at| at.elapsed()),
            last_error: shared.last_error.clone(),
        }
    }

    /// Returns cumulative counters.
    pub fn stats(&self) -> ConnectionStats {
        self.inner.stats.snapshot()
    }

    /// Returns the manager's configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    fn spawn_timer(&self, generation: u64, next: Next, first: Option<oneshot::Sender<bool>>) {
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(supervise(weak, generation, next, first));

        let mut shared = self.inner.lock();
        if shared.generation == generation {
            shared.timer = Some(task);
        } else {
            task.abort();
        }
    }
}

/// Background loop shared by the first check, monitoring and reconnecting.
/// Holds only a weak reference while sleeping so dropping the manager ends it.
///
/// `first` receives whether the manager is Connected after the first check.
async fn supervise<P: HealthProbe>(
    weak: Weak<Inner<P>>,
    generation: u64,
    mut next: Next,
    mut first: Option<oneshot::Sender<bool>>,
) {
    loop {
        let delay = match next {
            Next::Check => Duration::ZERO,
            Next::Monitor => match weak.upgrade() {
                Some(inner) => inner.config.health_check_interval,
                None => return,
            },
            Next::Reconnect(delay) => delay,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let Some(inner) = weak.upgrade() else {
            return;
        };
        if !inner.is_current(generation) {
            return;
        }
        let healthy = inner.health_check().await;
        let step = inner.after_check(generation, healthy);
        if let Some(tx) = first.take() {
            let connected = ConnectionState::from_u8(inner.state_atomic.load(Ordering::Acquire));
            let _ = tx.send(connected.is_connected());
        }
        match step {
            Some(step) => next = step,
            None => return,
        }
    }
}

impl<P: HealthProbe> Inner<P> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    async fn health_check(&self) -> bool {
        let timeout = self.config.health_check_timeout;
        let outcome = match tokio::time::timeout(timeout, self.probe.probe()).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(ProbeError::Unhealthy),
            Ok(Err(err)) => Err(ProbeError::Failed(err)),
            Err(_) => Err(ProbeError::Timeout(timeout)),
        };

        let healthy = outcome.is_ok();
        self.stats.check(healthy);

        #[cfg(feature = "metrics")]
        counter!(
            "connection_health_checks_total",
            "connection" => self.config.name.clone(),
            "result" => if healthy { "success" } else { "failure" }
        )
        .increment(1);

        match outcome {
            Ok(()) => {
                self.lock().last_success = Some(Instant::now());
            }
            Err(err) => {
                let message = err.to_string();

                #[cfg(feature = "tracing")]
                warn!(connection = %self.config.name, error = %message, "health check failed");

                self.lock().last_error = Some(message.clone());
                self.emit(&ConnectionEvent::Unhealthy {
                    pattern_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    error: message,
                });
            }
        }
        healthy
    }

    /// Applies the outcome of a check made under `generation` and decides
    /// what the background task does next. `None` means stop.
    fn after_check(&self, generation: u64, healthy: bool) -> Option<Next> {
        let mut events = Vec::new();
        let next = {
            let mut shared = self.lock();
            if shared.generation != generation {
                return None;
            }

            if healthy {
                shared.reconnect_attempts = 0;
                if shared.state != ConnectionState::Connected {
                    self.transition(&mut shared, ConnectionState::Connected, &mut events);
                    self.stats.connection();
                    events.push(ConnectionEvent::Connected {
                        pattern_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                    });
                }
                Some(Next::Monitor)
            } else {
                self.schedule_reconnect(&mut shared, &mut events)
            }
        };

        self.emit_all(events);
        next
    }

    fn schedule_reconnect(
        &self,
        shared: &mut Shared,
        events: &mut Vec<ConnectionEvent>,
    ) -> Option<Next> {
        if let Some(max) = self.config.max_reconnect_attempts {
            if shared.reconnect_attempts >= max {
                #[cfg(feature = "tracing")]
                warn!(
                    connection = %self.config.name,
                    attempts = shared.reconnect_attempts,
                    "reconnect attempts exhausted"
                );

                self.transition(shared, ConnectionState::Failed, events);
                events.push(ConnectionEvent::MaxReconnectAttemptsReached {
                    pattern_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: shared.reconnect_attempts,
                });
                shared.timer = None;
                return None;
            }
        }

        let delay = self.config.reconnect_delay_for(shared.reconnect_attempts);
        shared.reconnect_attempts += 1;
        self.stats.reconnect_attempt();

        #[cfg(feature = "metrics")]
        counter!("connection_reconnect_attempts_total", "connection" => self.config.name.clone())
            .increment(1);

        #[cfg(feature = "tracing")]
        debug!(
            connection = %self.config.name,
            attempt = shared.reconnect_attempts,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );

        self.transition(shared, ConnectionState::Reconnecting, events);
        events.push(ConnectionEvent::Reconnecting {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            attempt: shared.reconnect_attempts,
            delay,
        });
        Some(Next::Reconnect(delay))
    }

    fn transition(
        &self,
        shared: &mut Shared,
        to: ConnectionState,
        events: &mut Vec<ConnectionEvent>,
    ) {
        let from = shared.state;
        if from == to {
            return;
        }
        shared.state = to;
        self.state_atomic.store(to as u8, Ordering::Release);

        #[cfg(feature = "tracing")]
        info!(
            connection = %self.config.name,
            from = %from,
            to = %to,
            "connection state transition"
        );

        #[cfg(feature = "metrics")]
        gauge!("connection_state", "connection" => self.config.name.clone()).set(to as u8 as f64);

        events.push(ConnectionEvent::StateChange {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            from_state: from,
            to_state: to,
        });
    }

    fn emit(&self, event: &ConnectionEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        listeners.emit(event);
    }

    fn emit_all(&self, events: Vec<ConnectionEvent>) {
        if events.is_empty() {
            return;
        }
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for event in &events {
            listeners.emit(event);
        }
    }
}

impl<P> std::fmt::Debug for ConnectionManager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("name", &self.inner.config.name)
            .field(
                "state",
                &ConnectionState::from_u8(self.inner.state_atomic.load(Ordering::Acquire)),
            )
            .finish()
    }
}
