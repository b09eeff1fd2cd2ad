use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use crate::stats::StatsCounters;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Represents the state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum CircuitState {
    /// The circuit is closed and calls are allowed.
    Closed = 0,
    /// The circuit is open and calls are rejected.
    Open = 1,
    /// The circuit is half-open and trial calls decide whether to close again.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    /// Lower-case label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of circuit breaker state for observability.
///
/// All fields are taken under one lock acquisition and are mutually consistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CircuitMetrics {
    /// Current state of the circuit breaker.
    pub state: CircuitState,
    /// Failures recorded within the monitor window.
    pub failure_count: usize,
    /// Failures within the window required to open the circuit.
    pub failure_threshold: usize,
    /// Time since the last state transition.
    pub time_since_state_change: Duration,
    /// Successes recorded since entering half-open.
    pub half_open_successes: usize,
    /// Successes required to close from half-open.
    pub half_open_attempts: usize,
    /// Remaining wait before a call may probe the dependency, when open.
    pub retry_after: Option<Duration>,
}

/// Trial calls in flight while half-open, tagged with the half-open period
/// they were admitted in. Packed as `period << 32 | in_flight` so a permit
/// can be returned without taking the circuit lock.
#[derive(Debug, Default)]
pub(crate) struct TrialSlots(AtomicU64);

impl TrialSlots {
    const COUNT_MASK: u64 = u32::MAX as u64;

    fn in_flight(&self) -> usize {
        (self.0.load(Ordering::Acquire) & Self::COUNT_MASK) as usize
    }

    /// Starts a new period with nothing in flight. Permits from earlier
    /// periods become no-ops.
    fn next_period(&self) {
        let period = (self.0.load(Ordering::Acquire) >> 32).wrapping_add(1) & Self::COUNT_MASK;
        self.0.store(period << 32, Ordering::Release);
    }

    fn take(self: &Arc<Self>) -> TrialPermit {
        let previous = self.0.fetch_add(1, Ordering::AcqRel);
        TrialPermit {
            slots: Arc::clone(self),
            period: previous >> 32,
        }
    }

    fn release(&self, period: u64) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |packed| {
                (packed >> 32 == period && packed & Self::COUNT_MASK > 0).then(|| packed - 1)
            });
    }
}

/// A half-open trial slot, returned when dropped.
#[derive(Debug)]
pub(crate) struct TrialPermit {
    slots: Arc<TrialSlots>,
    period: u64,
}

impl Drop for TrialPermit {
    fn drop(&mut self) {
        self.slots.release(self.period);
    }
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    stats: Arc<StatsCounters>,
    failures: VecDeque<Instant>,
    last_failure_time: Option<Instant>,
    last_state_change: Instant,
    half_open_successes: usize,
    trials: Arc<TrialSlots>,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>, stats: Arc<StatsCounters>) -> Self {
        state_atomic.store(CircuitState::Closed as u8, Ordering::Release);
        Self {
            state: CircuitState::Closed,
            state_atomic,
            stats,
            failures: VecDeque::new(),
            last_failure_time: None,
            last_state_change: Instant::now(),
            half_open_successes: 0,
            trials: Arc::new(TrialSlots::default()),
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn metrics(&mut self, config: &CircuitBreakerConfig) -> CircuitMetrics {
        let now = Instant::now();
        self.prune(now, config.monitor_window);

        CircuitMetrics {
            state: self.state,
            failure_count: self.failures.len(),
            failure_threshold: config.failure_threshold,
            time_since_state_change: now.duration_since(self.last_state_change),
            half_open_successes: self.half_open_successes,
            half_open_attempts: config.half_open_attempts,
            retry_after: match self.state {
                CircuitState::Open => Some(self.remaining_wait(now, config)),
                _ => None,
            },
        }
    }

    /// Decides whether a call may proceed.
    ///
    /// An open circuit whose reset timeout has elapsed moves to half-open here;
    /// otherwise the remaining wait is returned. While half-open, at most
    /// `half_open_attempts` trial calls are outstanding at once, counting
    /// those that already succeeded; a call over that limit is rejected with
    /// a zero wait. The returned permit holds the trial slot.
    pub(crate) fn try_acquire(
        &mut self,
        config: &CircuitBreakerConfig,
    ) -> Result<Option<TrialPermit>, Duration> {
        let now = Instant::now();

        if self.state == CircuitState::Open {
            let remaining = self.remaining_wait(now, config);
            if !remaining.is_zero() {
                self.reject(config, now, remaining);
                return Err(remaining);
            }
            self.transition_to(CircuitState::HalfOpen, config);
        }

        let permit = if self.state == CircuitState::HalfOpen {
            if self.half_open_successes + self.trials.in_flight() >= config.half_open_attempts {
                self.reject(config, now, Duration::ZERO);
                return Err(Duration::ZERO);
            }
            Some(self.trials.take())
        } else {
            None
        };

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallPermitted {
                pattern_name: config.name.clone(),
                timestamp: now,
                state: self.state,
            });
        Ok(permit)
    }

    fn reject(&self, config: &CircuitBreakerConfig, now: Instant, retry_after: Duration) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallRejected {
                pattern_name: config.name.clone(),
                timestamp: now,
                retry_after,
            });
    }

    pub(crate) fn record_success(&mut self, config: &CircuitBreakerConfig) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::SuccessRecorded {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });

        if self.state == CircuitState::HalfOpen {
            self.half_open_successes += 1;
            if self.half_open_successes >= config.half_open_attempts {
                self.transition_to(CircuitState::Closed, config);
            }
        }
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig) {
        let now = Instant::now();

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::FailureRecorded {
                pattern_name: config.name.clone(),
                timestamp: now,
                state: self.state,
            });

        self.last_failure_time = Some(now);

        match self.state {
            CircuitState::Closed => {
                self.prune(now, config.monitor_window);
                self.failures.push_back(now);
                if self.failures.len() >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, config);
                }
            }
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, config);
            }
            // A call admitted before the circuit opened; its failure pushes
            // the reset deadline forward.
            CircuitState::Open => {}
        }
    }

    pub(crate) fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Open, config);
    }

    pub(crate) fn reset(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Closed, config);
        self.failures.clear();
        self.last_failure_time = None;
        self.half_open_successes = 0;
        self.last_state_change = Instant::now();
    }

    fn remaining_wait(&self, now: Instant, config: &CircuitBreakerConfig) -> Duration {
        let opened = self
            .last_failure_time
            .map_or(self.last_state_change, |failure| {
                failure.max(self.last_state_change)
            });
        config
            .reset_timeout
            .saturating_sub(now.saturating_duration_since(opened))
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.failures.front() {
            if now.saturating_duration_since(oldest) > window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                from_state,
                to_state: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %config.name,
            from = %from_state,
            to = %state,
            "circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => from_state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone())
                .set(state as u8 as f64);
        }

        self.stats.transition();
        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.half_open_successes = 0;
        self.trials.next_period();

        if state == CircuitState::Closed {
            self.failures.clear();
        }
    }
}
