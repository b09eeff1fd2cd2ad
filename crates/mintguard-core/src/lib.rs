//! Core infrastructure for mintguard.
//!
//! This crate provides shared functionality used across all mintguard components:
//! - Event system for observability, with per-listener panic isolation
//! - Error classification ([`ErrorClass`], [`Classify`]) computed once at the
//!   boundary where a remote failure is first observed
//! - [`RemoteError`], the boundary error type for calls to the minting authority

pub mod error;
pub mod events;

pub use error::{BoxError, Classify, ErrorClass, RemoteError, TransientMatcher};
pub use events::{EventListener, EventListeners, FnListener, ListenerId, ResilienceEvent};
