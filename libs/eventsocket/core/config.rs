use crate::core::connection_state::AtomicConnectionState;
use crate::traits::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Configuration for EventSocketClient
///
/// Built with the type-state builder; the URL is validated and
/// normalised to its Engine.IO endpoint at build time.
pub struct ClientConfig {
    /// URL as supplied by the caller (http(s):// or ws(s)://)
    pub(crate) url: String,

    /// Engine.IO WebSocket endpoint derived from `url`
    pub(crate) engine_url: String,

    /// Optional handshake payload producer
    pub(crate) auth: Option<Arc<dyn AuthProvider>>,

    /// Event name -> handler
    pub(crate) handlers: EventTable,

    /// Optional lifecycle observer
    pub(crate) hook: Option<Arc<dyn ConnectionHook>>,

    /// Upper bound for the whole handshake, retries included
    pub(crate) handshake_timeout: Option<Duration>,

    /// Pacing of handshake retries
    pub(crate) retry_strategy: Box<dyn ReconnectionStrategy>,

    /// Connection state, possibly shared with the owner
    pub(crate) state: Arc<AtomicConnectionState>,

    /// Running flag - cleared by `Emitter::close()`
    pub(crate) shutdown_flag: Arc<AtomicBool>,

    /// Wakes a pending handshake when `Emitter::close()` is called
    pub(crate) close_signal: Arc<Notify>,
}

impl ClientConfig {
    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the derived Engine.IO endpoint
    pub fn engine_url(&self) -> &str {
        &self.engine_url
    }

    /// Get the handshake timeout
    pub fn handshake_timeout(&self) -> Option<Duration> {
        self.handshake_timeout
    }
}
