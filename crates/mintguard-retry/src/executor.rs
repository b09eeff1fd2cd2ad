use crate::config::RetryConfig;
use crate::events::RetryEvent;
use crate::stats::{RetryStats, StatsCounters};
use mintguard_core::Classify;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Runs an async operation with bounded attempts and exponential backoff.
///
/// The executor holds no per-call state; each [`run`](Self::run) keeps its
/// own attempt counter and delay. Cloning is cheap and clones share
/// configuration and statistics.
pub struct RetryExecutor<E> {
    config: Arc<RetryConfig<E>>,
    stats: Arc<StatsCounters>,
}

impl<E> Clone for RetryExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<E> RetryExecutor<E> {
    /// Creates an executor from a configuration.
    pub fn new(config: RetryConfig<E>) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "retry_calls_total",
                "Total number of retried calls by final result"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of operation attempts made by the retry executor"
            );
        }

        Self {
            config: Arc::new(config),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Returns the executor's configuration.
    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }

    /// Returns a snapshot of cumulative statistics.
    pub fn stats(&self) -> RetryStats {
        self.stats.snapshot()
    }

    /// Zeroes cumulative statistics.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` attempts have been made.
    ///
    /// Delays between attempts are asynchronous; dropping the returned future
    /// cancels any pending delay.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let config = &self.config;
        let max_attempts = config.max_attempts;
        self.stats.call();

        let mut attempt = 1;
        loop {
            self.stats.attempt(attempt > 1);

            #[cfg(feature = "metrics")]
            counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

            let error = match operation().await {
                Ok(value) => {
                    self.stats.success();
                    self.finish("success");

                    #[cfg(feature = "tracing")]
                    {
                        if attempt > 1 {
                            debug!(retry = %config.name, attempts = attempt, "operation recovered after retries");
                        }
                    }

                    config.event_listeners.emit(&RetryEvent::Success {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !config.should_retry(&error) {
                self.stats.non_retryable();
                self.finish("non_retryable");

                #[cfg(feature = "tracing")]
                debug!(retry = %config.name, attempt, "error is not retryable");

                config.event_listeners.emit(&RetryEvent::IgnoredError {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: attempt,
                });
                return Err(error);
            }

            if attempt >= max_attempts {
                self.stats.exhausted();
                self.finish("exhausted");

                #[cfg(feature = "tracing")]
                warn!(retry = %config.name, attempts = attempt, "retry attempts exhausted");

                config.event_listeners.emit(&RetryEvent::Error {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: attempt,
                });
                return Err(error);
            }

            let delay = config.delay_after(attempt);

            #[cfg(feature = "tracing")]
            warn!(
                retry = %config.name,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "attempt failed, retrying"
            );

            config.event_listeners.emit(&RetryEvent::Retry {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                attempt,
                delay,
            });

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn finish(&self, result: &'static str) {
        #[cfg(feature = "metrics")]
        counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => result)
            .increment(1);
    }
}

impl<E: Classify + 'static> Default for RetryExecutor<E> {
    /// Default configuration retrying only transient errors.
    fn default() -> Self {
        Self::new(RetryConfig::builder().transient_only().build())
    }
}
