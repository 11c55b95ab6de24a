//! Connection indicator.
//!
//! Tracks whether the last request to the API succeeded. Every failure is
//! logged; recovery is logged once, on the transition back to connected.

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Error,
}

#[derive(Debug, Default)]
pub struct ConnectionStatus {
    failing: AtomicBool,
}

impl ConnectionStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed request.
    pub fn set_connection_error(&self, context: &str, err: &dyn Display) {
        self.failing.store(true, Ordering::Relaxed);
        warn!(error = %err, "{context}");
    }

    /// Record a successful request.
    pub fn clear_connection_error(&self) {
        if self.failing.swap(false, Ordering::Relaxed) {
            info!("connection restored");
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.failing.load(Ordering::Relaxed) { ConnectionState::Error } else { ConnectionState::Connected }
    }
}
