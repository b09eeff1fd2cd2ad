//! Error classification for calls to the remote authority.
//!
//! Every failure observed at the network boundary is classified exactly once
//! into an [`ErrorClass`]. Retry and breaker logic only ever look at that
//! class; nothing downstream re-parses free-text messages.
//!
//! # Example
//!
//! ```rust
//! use mintguard_core::{Classify, ErrorClass, RemoteError};
//!
//! let refused = RemoteError::with_code("ECONNREFUSED", "connect failed");
//! assert_eq!(refused.classify(), ErrorClass::Transient);
//!
//! let denied = RemoteError::new("401 unauthorized: token rejected");
//! assert_eq!(denied.classify(), ErrorClass::Permanent);
//! ```

use std::io;
use thiserror::Error;

/// Boxed error used where the concrete error type is erased (health probes).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Timeouts, refused or reset connections, DNS failures, generic network errors.
    Transient,
    /// Anything else: validation, authorization, malformed requests.
    Permanent,
}

impl ErrorClass {
    /// Returns true for [`ErrorClass::Transient`].
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorClass::Transient)
    }
}

/// Types that know their own [`ErrorClass`].
pub trait Classify {
    /// Returns the class of this error.
    fn classify(&self) -> ErrorClass;
}

impl Classify for io::Error {
    fn classify(&self) -> ErrorClass {
        match self.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock => ErrorClass::Transient,
            _ => ErrorClass::Permanent,
        }
    }
}

impl<T: Classify + ?Sized> Classify for Box<T> {
    fn classify(&self) -> ErrorClass {
        (**self).classify()
    }
}

const DEFAULT_TRANSIENT_CODES: &[&str] = &[
    "ECONNREFUSED",
    "ECONNRESET",
    "ECONNABORTED",
    "ETIMEDOUT",
    "ESOCKETTIMEDOUT",
    "ENOTFOUND",
    "EAI_AGAIN",
    "EHOSTUNREACH",
    "ENETUNREACH",
    "EPIPE",
];

const DEFAULT_TRANSIENT_PATTERNS: &[&str] = &[
    "connection refused",
    "connection reset",
    "timeout",
    "timed out",
    "dns",
    "getaddrinfo",
    "network error",
    "network is unreachable",
    "socket hang up",
    "temporarily unavailable",
];

/// Set-based classifier matching error codes and message substrings.
///
/// Codes are compared exactly (case-insensitively); patterns are matched as
/// lower-case substrings of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMatcher {
    codes: Vec<String>,
    patterns: Vec<String>,
}

impl TransientMatcher {
    /// An empty matcher that classifies everything as permanent.
    pub fn empty() -> Self {
        Self {
            codes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Adds an error code treated as transient.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.codes.push(code.into().to_ascii_uppercase());
        self
    }

    /// Adds a message substring treated as transient.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into().to_lowercase());
        self
    }

    /// Classifies an error from its optional code and its message.
    pub fn classify(&self, code: Option<&str>, message: &str) -> ErrorClass {
        if let Some(code) = code {
            if self.codes.iter().any(|c| c.eq_ignore_ascii_case(code)) {
                return ErrorClass::Transient;
            }
        }

        let message = message.to_lowercase();
        if self.patterns.iter().any(|p| message.contains(p.as_str())) {
            ErrorClass::Transient
        } else {
            ErrorClass::Permanent
        }
    }
}

impl Default for TransientMatcher {
    fn default() -> Self {
        Self {
            codes: DEFAULT_TRANSIENT_CODES.iter().map(|c| c.to_string()).collect(),
            patterns: DEFAULT_TRANSIENT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// A failure reported by the remote authority or the network path to it.
///
/// The class is computed once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", .code.as_deref().map(|c| format!("{c}: ")).unwrap_or_default())]
pub struct RemoteError {
    code: Option<String>,
    message: String,
    class: ErrorClass,
}

impl RemoteError {
    /// Creates an error classified from its message by the default matcher.
    pub fn new(message: impl Into<String>) -> Self {
        Self::classified_by(&TransientMatcher::default(), None, message)
    }

    /// Creates an error classified from its code and message by the default matcher.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::classified_by(&TransientMatcher::default(), Some(code.into()), message)
    }

    /// Creates an error classified by a custom matcher.
    pub fn classified_by(
        matcher: &TransientMatcher,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let class = matcher.classify(code.as_deref(), &message);
        Self {
            code,
            message,
            class,
        }
    }

    /// Creates an error explicitly marked transient.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            class: ErrorClass::Transient,
        }
    }

    /// Creates an error explicitly marked permanent.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            class: ErrorClass::Permanent,
        }
    }

    /// The machine-readable code, if the remote side supplied one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        self.class.is_transient()
    }
}

impl Classify for RemoteError {
    fn classify(&self) -> ErrorClass {
        self.class
    }
}

impl From<io::Error> for RemoteError {
    fn from(err: io::Error) -> Self {
        let class = err.classify();
        Self {
            code: Some(format!("{:?}", err.kind())),
            message: err.to_string(),
            class,
        }
    }
}
