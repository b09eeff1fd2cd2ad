use crate::circuit::CircuitState;
use crate::events::CircuitBreakerEvent;
use mintguard_core::events::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for the circuit breaker.
pub struct CircuitBreakerConfig {
    pub(crate) failure_threshold: usize,
    pub(crate) reset_timeout: Duration,
    pub(crate) monitor_window: Duration,
    pub(crate) half_open_attempts: usize,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
    pub(crate) name: String,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Preset: the documented defaults.
    ///
    /// - 5 failures within 120 seconds open the circuit
    /// - 60 second reset timeout
    /// - 3 successes in half-open close it again
    pub fn standard() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Preset: trips early and probes again soon.
    ///
    /// - 3 failures within 30 seconds
    /// - 10 second reset timeout
    /// - 1 success in half-open closes
    ///
    /// # Examples
    ///
    /// ```
    /// use mintguard_circuitbreaker::CircuitBreakerConfig;
    ///
    /// let config = CircuitBreakerConfig::fast_fail().name("authority").build();
    /// assert_eq!(config.failure_threshold(), 3);
    /// ```
    pub fn fast_fail() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
            .failure_threshold(3)
            .monitor_window(Duration::from_secs(30))
            .reset_timeout(Duration::from_secs(10))
            .half_open_attempts(1)
    }

    /// Preset: tolerates bursts of failures before tripping.
    ///
    /// - 10 failures within 5 minutes
    /// - 2 minute reset timeout
    /// - 5 successes in half-open close
    pub fn tolerant() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
            .failure_threshold(10)
            .monitor_window(Duration::from_secs(300))
            .reset_timeout(Duration::from_secs(120))
            .half_open_attempts(5)
    }

    /// Failures within the monitor window that open the circuit.
    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    /// How long the circuit stays open after the last failure.
    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }

    /// Length of the failure-counting window.
    pub fn monitor_window(&self) -> Duration {
        self.monitor_window
    }

    /// Successes in half-open needed to close.
    pub fn half_open_attempts(&self) -> usize {
        self.half_open_attempts
    }

    /// The breaker's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for configuring and constructing a circuit breaker.
pub struct CircuitBreakerConfigBuilder {
    failure_threshold: usize,
    reset_timeout: Duration,
    monitor_window: Duration,
    half_open_attempts: usize,
    event_listeners: EventListeners<CircuitBreakerEvent>,
    name: String,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            monitor_window: Duration::from_secs(120),
            half_open_attempts: 3,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the number of failures within the monitor window that opens the circuit.
    ///
    /// Zero is treated as one.
    ///
    /// Default: 5
    pub fn failure_threshold(mut self, threshold: usize) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets how long the circuit stays open, measured from the last failure,
    /// before a call may probe the dependency.
    ///
    /// Default: 60 seconds
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Sets the window in which failures are counted.
    ///
    /// Default: 120 seconds
    pub fn monitor_window(mut self, window: Duration) -> Self {
        self.monitor_window = window;
        self
    }

    /// Sets the number of successes in half-open required to close.
    ///
    /// This also caps half-open admission: successes plus trial calls still
    /// in flight never exceed it, and extra callers are rejected with a zero
    /// `retry_after`. Zero is treated as one.
    ///
    /// Default: 3
    pub fn half_open_attempts(mut self, attempts: usize) -> Self {
        self.half_open_attempts = attempts;
        self
    }

    /// Give this breaker a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when the circuit changes state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mintguard_circuitbreaker::CircuitBreakerConfig;
    ///
    /// let config = CircuitBreakerConfig::builder()
    ///     .on_state_transition(|from, to| {
    ///         println!("circuit {} -> {}", from, to);
    ///     })
    ///     .build();
    /// ```
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::StateTransition {
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

    /// Registers a callback when a call is permitted, with the state it ran in.
    pub fn on_call_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::CallPermitted { state, .. } = event {
                f(*state);
            }
        }));
        self
    }

    /// Registers a callback when a call is rejected, with the remaining wait.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::CallRejected { retry_after, .. } = event {
                f(*retry_after);
            }
        }));
        self
    }

    /// Registers a callback when a success is recorded.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::SuccessRecorded { state, .. } = event {
                f(*state);
            }
        }));
        self
    }

    /// Registers a callback when a failure is recorded.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::FailureRecorded { state, .. } = event {
                f(*state);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold.max(1),
            reset_timeout: self.reset_timeout,
            monitor_window: self.monitor_window,
            half_open_attempts: self.half_open_attempts.max(1),
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
