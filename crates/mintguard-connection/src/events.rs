//! Events emitted by the connection manager.

use crate::ConnectionState;
use mintguard_core::events::ResilienceEvent;
use std::time::Duration;
use tokio::time::Instant;

/// Events emitted by [`ConnectionManager`](crate::ConnectionManager).
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// The manager entered [`ConnectionState::Connected`].
    Connected {
        pattern_name: String,
        timestamp: Instant,
    },
    /// The manager was disconnected on request.
    Disconnected {
        pattern_name: String,
        timestamp: Instant,
    },
    /// Any state change.
    StateChange {
        pattern_name: String,
        timestamp: Instant,
        from_state: ConnectionState,
        to_state: ConnectionState,
    },
    /// A health check failed.
    Unhealthy {
        pattern_name: String,
        timestamp: Instant,
        error: String,
    },
    /// A reconnect attempt was scheduled.
    Reconnecting {
        pattern_name: String,
        timestamp: Instant,
        /// 1-indexed reconnect attempt number.
        attempt: u32,
        delay: Duration,
    },
    /// The reconnect budget ran out; the manager is now Failed.
    MaxReconnectAttemptsReached {
        pattern_name: String,
        timestamp: Instant,
        attempts: u32,
    },
}

/// Discriminant of [`ConnectionEvent`], used to subscribe with
/// [`ConnectionManager::on`](crate::ConnectionManager::on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEventKind {
    Connected,
    Disconnected,
    StateChange,
    Unhealthy,
    Reconnecting,
    MaxReconnectAttemptsReached,
}

impl ConnectionEvent {
    /// Returns this event's kind.
    pub fn kind(&self) -> ConnectionEventKind {
        match self {
            ConnectionEvent::Connected { .. } => ConnectionEventKind::Connected,
            ConnectionEvent::Disconnected { .. } => ConnectionEventKind::Disconnected,
            ConnectionEvent::StateChange { .. } => ConnectionEventKind::StateChange,
            ConnectionEvent::Unhealthy { .. } => ConnectionEventKind::Unhealthy,
            ConnectionEvent::Reconnecting { .. } => ConnectionEventKind::Reconnecting,
            ConnectionEvent::MaxReconnectAttemptsReached { .. } => {
                ConnectionEventKind::MaxReconnectAttemptsReached
            }
        }
    }
}

impl ResilienceEvent for ConnectionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ConnectionEvent::Connected { .. } => "connected",
            ConnectionEvent::Disconnected { .. } => "disconnected",
            ConnectionEvent::StateChange { .. } => "state_change",
            ConnectionEvent::Unhealthy { .. } => "unhealthy",
            ConnectionEvent::Reconnecting { .. } => "reconnecting",
            ConnectionEvent::MaxReconnectAttemptsReached { .. } => {
                "max_reconnect_attempts_reached"
            }
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ConnectionEvent::Connected { timestamp, .. }
            | ConnectionEvent::Disconnected { timestamp, .. }
            | ConnectionEvent::StateChange { timestamp, .. }
            | ConnectionEvent::Unhealthy { timestamp, .. }
            | ConnectionEvent::Reconnecting { timestamp, .. }
            | ConnectionEvent::MaxReconnectAttemptsReached { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            ConnectionEvent::Connected { pattern_name, .. }
            | ConnectionEvent::Disconnected { pattern_name, .. }
            | ConnectionEvent::StateChange { pattern_name, .. }
            | ConnectionEvent::Unhealthy { pattern_name, .. }
            | ConnectionEvent::Reconnecting { pattern_name, .. }
            | ConnectionEvent::MaxReconnectAttemptsReached { pattern_name, .. } => pattern_name,
        }
    }
}
