use crate::backoff::{ExponentialBackoff, ExponentialRandomBackoff, IntervalFunction};
use crate::events::RetryEvent;
use mintguard_core::events::{EventListeners, FnListener};
use mintguard_core::Classify;
use std::sync::Arc;
use std::time::Duration;

/// Predicate deciding whether an error is worth another attempt.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Configuration for the retry executor.
pub struct RetryConfig<E> {
    pub(crate) max_attempts: usize,
    pub(crate) interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl<E> RetryConfig<E> {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }

    /// Maximum number of attempts, including the first one. Never zero.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The name of this retry instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delay after the given number of failed attempts (1-indexed).
    pub fn delay_after(&self, failed_attempt: usize) -> Duration {
        self.interval_fn
            .next_interval(failed_attempt.saturating_sub(1))
    }

    pub(crate) fn should_retry(&self, error: &E) -> bool {
        self.retry_predicate
            .as_ref()
            .map_or(true, |predicate| predicate(error))
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<E> {
    max_attempts: usize,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    jitter: Option<f64>,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    retry_predicate: Option<RetryPredicate<E>>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl<E> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_attempts: 3
    /// - initial_delay: 1s
    /// - max_delay: 10s
    /// - backoff_multiplier: 2.0
    /// - jitter: off
    /// - predicate: retry every error (see [`transient_only`](Self::transient_only))
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: None,
            interval_fn: None,
            retry_predicate: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// This includes the initial attempt, so max_attempts=3 means
    /// 1 initial attempt + 2 retries. Zero is treated as one.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    ///
    /// The first delay is also capped by [`max_delay`](Self::max_delay), so an
    /// initial delay above the cap sleeps for the cap instead.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the upper bound on any single delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the factor applied to the delay after every retry.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Randomizes each delay by up to `factor` (0.0 to 1.0) in either direction.
    pub fn jitter(mut self, factor: f64) -> Self {
        self.jitter = Some(factor);
        self
    }

    /// Replaces the delay schedule with a custom interval function.
    ///
    /// Overrides `initial_delay`, `max_delay`, `backoff_multiplier` and `jitter`.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Sets a predicate to determine which errors should be retried.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets the name for this retry instance (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a retry is about to be scheduled.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)` - the attempt that just failed (1-indexed) and
    /// the delay before the next one.
    ///
    /// # Example
    /// ```rust
    /// use mintguard_retry::RetryConfig;
    ///
    /// let config = RetryConfig::<std::io::Error>::builder()
    ///     .on_retry(|attempt, delay| {
    ///         println!("attempt {} failed, retrying in {:?}", attempt, delay);
    ///     })
    ///     .build();
    /// ```
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback when an operation succeeds.
    ///
    /// Called with the total number of attempts made; 1 means no retries were needed.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when all attempts are exhausted.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Error { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when an error is returned without retrying
    /// because the predicate rejected it.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, RetryEvent::IgnoredError { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig<E> {
        let interval_fn = self.interval_fn.unwrap_or_else(|| match self.jitter {
            Some(factor) => Arc::new(
                ExponentialRandomBackoff::new(self.initial_delay, factor)
                    .multiplier(self.backoff_multiplier)
                    .max_interval(self.max_delay),
            ),
            None => Arc::new(
                ExponentialBackoff::new(self.initial_delay)
                    .multiplier(self.backoff_multiplier)
                    .max_interval(self.max_delay),
            ),
        });

        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            interval_fn,
            retry_predicate: self.retry_predicate,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}

impl<E: Classify + 'static> RetryConfigBuilder<E> {
    /// Retries only errors classified as [`ErrorClass::Transient`](mintguard_core::ErrorClass::Transient).
    pub fn transient_only(self) -> Self {
        self.retry_on(|error: &E| error.classify().is_transient())
    }
}
