//! Connection lifecycle states.

use std::fmt;

/// Where the manager is in its connect/monitor/reconnect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ConnectionState {
    /// Not connected and not trying to be. Initial state, and the state after
    /// [`disconnect`](crate::ConnectionManager::disconnect).
    Disconnected = 0,
    /// The first health check of a `connect()` is in flight.
    Connecting = 1,
    /// The last health check passed; periodic monitoring is running.
    Connected = 2,
    /// A health check failed; a reconnect attempt is scheduled.
    Reconnecting = 3,
    /// The reconnect budget is exhausted. Nothing is scheduled.
    Failed = 4,
}

impl ConnectionState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Lower-case name, as used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        }
    }

    /// True only for [`ConnectionState::Connected`].
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
