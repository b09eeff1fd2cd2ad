//! Test organization:
//! - listeners.rs: listener registration, removal and panic isolation
//! - classification.rs: transient vs permanent error classification
