//! Health probes.

use futures::future::BoxFuture;
use mintguard_core::BoxError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A lightweight reachability check against the dependency.
///
/// `Ok(true)` means healthy. `Ok(false)` and `Err(_)` both count as a failed
/// check. The manager applies its own timeout; probes need not.
///
/// Implemented for any closure returning a future:
///
/// ```
/// use mintguard_connection::HealthProbe;
///
/// fn assert_probe(_: impl HealthProbe) {}
/// assert_probe(|| async { Ok::<_, std::io::Error>(true) });
/// ```
pub trait HealthProbe: Send + Sync + 'static {
    /// Runs one check.
    fn probe(&self) -> BoxFuture<'static, Result<bool, BoxError>>;
}

impl<F, Fut, E> HealthProbe for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn probe(&self) -> BoxFuture<'static, Result<bool, BoxError>> {
        let fut = self();
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

/// Type-erased probe, for holding managers with different probes behind one type.
#[derive(Clone)]
pub struct BoxHealthProbe(Arc<dyn HealthProbe>);

impl BoxHealthProbe {
    /// Erases the type of `probe`.
    pub fn new(probe: impl HealthProbe) -> Self {
        Self(Arc::new(probe))
    }
}

impl HealthProbe for BoxHealthProbe {
    fn probe(&self) -> BoxFuture<'static, Result<bool, BoxError>> {
        self.0.probe()
    }
}

impl std::fmt::Debug for BoxHealthProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxHealthProbe")
    }
}

/// Why a health check failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe did not finish within the health-check timeout.
    #[error("health check timed out after {0:?}")]
    Timeout(Duration),
    /// The probe completed and reported the dependency unhealthy.
    #[error("health check reported unhealthy")]
    Unhealthy,
    /// The probe itself failed.
    #[error("health check failed: {0}")]
    Failed(#[source] BoxError),
}
