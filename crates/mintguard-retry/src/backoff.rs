use std::time::Duration;

/// Abstraction for computing retry intervals.
///
/// Shared by the retry executor and the connection manager's reconnect
/// scheduling.
pub trait IntervalFunction: Send + Sync {
    /// Computes the delay before the next attempt.
    ///
    /// # Arguments
    /// * `attempt` - Number of failures so far minus one (0-indexed, so the
    ///   delay after the first failure is `next_interval(0)`)
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Fixed interval backoff - returns the same duration for every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    /// Creates a new fixed interval backoff.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}

/// Exponential backoff: `initial * multiplier^attempt`, optionally capped.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates a new exponential backoff with default multiplier of 2.0.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    ///
    /// Values below 1.0 are treated as 1.0 so delays never shrink.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the maximum interval to cap exponential growth.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        grow(
            self.initial_interval,
            self.multiplier,
            self.max_interval,
            attempt,
        )
    }
}

/// Exponential backoff with randomization to prevent thundering herd.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    initial_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
    max_interval: Option<Duration>,
}

impl ExponentialRandomBackoff {
    /// Creates a new exponential random backoff.
    ///
    /// # Arguments
    /// * `initial_interval` - The base interval
    /// * `randomization_factor` - Factor for randomization (0.0 to 1.0).
    ///   A factor of 0.5 means the interval will be randomized between 50% and
    ///   150% of the calculated value.
    pub fn new(initial_interval: Duration, randomization_factor: f64) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the maximum interval to cap exponential growth.
    ///
    /// The cap applies before randomization.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn randomize(&self, duration: Duration) -> Duration {
        use rand::Rng;

        if self.randomization_factor == 0.0 {
            return duration;
        }

        let delta = duration.as_secs_f64() * self.randomization_factor;
        let min = duration.as_secs_f64() - delta;
        let max = duration.as_secs_f64() + delta;
        let randomized = rand::rng().random_range(min..=max);
        Duration::from_secs_f64(randomized.max(0.0))
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let capped = grow(
            self.initial_interval,
            self.multiplier,
            self.max_interval,
            attempt,
        );
        self.randomize(capped)
    }
}

/// `initial * multiplier^attempt`, never above `max`. The cap applies from
/// the first interval on.
fn grow(initial: Duration, multiplier: f64, max: Option<Duration>, attempt: usize) -> Duration {
    let exponent = attempt.min(i32::MAX as usize) as i32;
    let factor = multiplier.powi(exponent);
    let ceiling = max.unwrap_or(Duration::MAX);

    // Overflow and non-finite products fall back to the ceiling.
    Duration::try_from_secs_f64(initial.as_secs_f64() * factor)
        .map_or(ceiling, |interval| interval.min(ceiling))
}

/// Function-based interval implementation.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    /// Creates a new function-based interval.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}
