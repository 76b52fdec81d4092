// Application state module
// Immutable per-process state shared by every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;
use crate::forward::{ForwardError, Forwarder};

/// Application state
pub struct AppState {
    pub config: Config,
    pub forwarder: Forwarder,

    // Live connection count, checked against `performance.max_connections`
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Build state from a loaded configuration
    ///
    /// Fails only if the outbound HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self, ForwardError> {
        let forwarder = Forwarder::new(&config.forward)?;

        Ok(Self {
            config,
            forwarder,
            active_connections: AtomicUsize::new(0),
        })
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
