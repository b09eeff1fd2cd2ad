//! Tower integration.

use crate::error::CallError;
use crate::facade::ResilientCallFacade;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A [`Layer`] that routes every request of the wrapped service through a
/// [`ResilientCallFacade`].
///
/// Each retry re-sends a clone of the request to a clone of the service, so
/// both must be `Clone`.
///
/// ```
/// use mintguard::{ResilientCallFacade, ResilientLayer};
/// use mintguard_circuitbreaker::CircuitBreaker;
/// use mintguard_core::RemoteError;
/// use mintguard_retry::RetryExecutor;
/// use tower::{Layer, ServiceExt};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let facade = ResilientCallFacade::<RemoteError>::new(
///     CircuitBreaker::default(),
///     RetryExecutor::default(),
/// );
/// let service = ResilientLayer::new(facade).layer(tower::service_fn(|id: String| async move {
///     Ok::<_, RemoteError>(id.starts_with("urn:"))
/// }));
///
/// assert!(service.oneshot("urn:x".to_string()).await.unwrap());
/// # }
/// ```
pub struct ResilientLayer<E> {
    facade: ResilientCallFacade<E>,
}

impl<E> ResilientLayer<E> {
    pub fn new(facade: ResilientCallFacade<E>) -> Self {
        Self { facade }
    }
}

impl<E> Clone for ResilientLayer<E> {
    fn clone(&self) -> Self {
        Self {
            facade: self.facade.clone(),
        }
    }
}

impl<S, E> Layer<S> for ResilientLayer<E> {
    type Service = ResilientService<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        ResilientService {
            inner: service,
            facade: self.facade.clone(),
        }
    }
}

/// Service produced by [`ResilientLayer`].
pub struct ResilientService<S, E> {
    inner: S,
    facade: ResilientCallFacade<E>,
}

impl<S: Clone, E> Clone for ResilientService<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            facade: self.facade.clone(),
        }
    }
}

impl<S, E, Req> Service<Req> for ResilientService<S, E>
where
    S: Service<Req, Error = E> + Clone + Send + 'static,
    S::Future: Send,
    S::Response: Send + 'static,
    E: Send + Sync + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = CallError<E>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness is awaited per attempt on a clone of the inner service.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let facade = self.facade.clone();

        Box::pin(async move {
            facade
                .call(move || service.clone().oneshot(req.clone()))
                .await
        })
    }
}
