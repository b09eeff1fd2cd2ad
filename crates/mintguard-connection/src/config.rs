use crate::events::{ConnectionEvent, ConnectionEventKind};
use crate::ConnectionState;
use mintguard_core::events::{EventListeners, FnListener};
use mintguard_retry::{ExponentialBackoff, IntervalFunction};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`ConnectionManager`](crate::ConnectionManager).
pub struct ConnectionConfig {
    pub(crate) health_check_interval: Duration,
    pub(crate) health_check_timeout: Duration,
    pub(crate) reconnect_delay: Duration,
    pub(crate) max_reconnect_delay: Duration,
    pub(crate) reconnect_multiplier: f64,
    pub(crate) max_reconnect_attempts: Option<u32>,
    pub(crate) backoff: Arc<dyn IntervalFunction>,
    pub(crate) event_listeners: EventListeners<ConnectionEvent>,
    pub(crate) name: String,
}

impl ConnectionConfig {
    /// Creates a new builder with default settings.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    pub fn health_check_interval(&self) -> Duration {
        self.health_check_interval
    }

    pub fn health_check_timeout(&self) -> Duration {
        self.health_check_timeout
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        self.max_reconnect_delay
    }

    pub fn reconnect_multiplier(&self) -> f64 {
        self.reconnect_multiplier
    }

    /// `None` means reconnect forever.
    pub fn max_reconnect_attempts(&self) -> Option<u32> {
        self.max_reconnect_attempts
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delay before the reconnect attempt that follows `attempts` earlier ones.
    pub fn reconnect_delay_for(&self, attempts: u32) -> Duration {
        self.backoff.next_interval(attempts as usize)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("health_check_interval", &self.health_check_interval)
            .field("health_check_timeout", &self.health_check_timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("max_reconnect_delay", &self.max_reconnect_delay)
            .field("reconnect_multiplier", &self.reconnect_multiplier)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("name", &self.name)
            .finish()
    }
}

/// Builder for [`ConnectionConfig`].
pub struct ConnectionConfigBuilder {
    health_check_interval: Duration,
    health_check_timeout: Duration,
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
    reconnect_multiplier: f64,
    max_reconnect_attempts: Option<u32>,
    backoff: Option<Arc<dyn IntervalFunction>>,
    event_listeners: EventListeners<ConnectionEvent>,
    name: String,
}

impl Default for ConnectionConfigBuilder {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            health_check_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            reconnect_multiplier: 2.0,
            max_reconnect_attempts: None,
            backoff: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }
}

impl ConnectionConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// How often a connected manager re-probes.
    ///
    /// Default: 30 seconds
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Hard timeout applied to every probe. A probe that overruns it counts
    /// as a failed check.
    ///
    /// Default: 5 seconds
    pub fn health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    /// Delay before the first reconnect attempt.
    ///
    /// Default: 1 second
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Upper bound on the reconnect delay.
    ///
    /// Default: 30 seconds
    pub fn max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay = delay;
        self
    }

    /// Growth factor of the reconnect delay. Values below 1.0 are treated as 1.0.
    ///
    /// Default: 2.0
    pub fn reconnect_multiplier(mut self, multiplier: f64) -> Self {
        self.reconnect_multiplier = multiplier;
        self
    }

    /// Gives up and enters [`ConnectionState::Failed`] after this many
    /// scheduled reconnect attempts.
    ///
    /// Default: unlimited
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = Some(attempts);
        self
    }

    /// Replaces the exponential reconnect backoff with a custom interval
    /// function. `reconnect_delay`, `max_reconnect_delay` and
    /// `reconnect_multiplier` are then ignored.
    pub fn backoff<I>(mut self, backoff: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Give this manager a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for every state change.
    pub fn on_state_change<F>(mut self, f: F) -> Self
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let ConnectionEvent::StateChange {
                from_state,
                to_state,
                ..
            } = event
            {
                f(*from_state, *to_state);
            }
        }));
        self
    }

    /// Registers a callback for one kind of event.
    pub fn on<F>(mut self, kind: ConnectionEventKind, f: F) -> Self
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ConnectionEvent| {
            if event.kind() == kind {
                f(event);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ConnectionConfig {
        let multiplier = self.reconnect_multiplier.max(1.0);
        let backoff = self.backoff.unwrap_or_else(|| {
            Arc::new(
                ExponentialBackoff::new(self.reconnect_delay)
                    .multiplier(multiplier)
                    .max_interval(self.max_reconnect_delay),
            )
        });

        ConnectionConfig {
            health_check_interval: self.health_check_interval.max(Duration::from_millis(1)),
            health_check_timeout: self.health_check_timeout,
            reconnect_delay: self.reconnect_delay,
            max_reconnect_delay: self.max_reconnect_delay,
            reconnect_multiplier: multiplier,
            max_reconnect_attempts: self.max_reconnect_attempts,
            backoff,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
