use std::time::Duration;
use thiserror::Error;

/// Main error type for eventsocket
#[derive(Error, Debug)]
pub enum EventSocketError {
    /// WebSocket connection error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Server answered the CONNECT packet with CONNECT_ERROR
    #[error("Handshake rejected: {0}")]
    HandshakeRejected(String),

    /// Handshake did not complete in time
    #[error("Handshake not completed within {0:?}")]
    HandshakeTimeout(Duration),

    /// Auth payload could not be produced
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Malformed or unsupported Engine.IO / Socket.IO frame
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    /// Event handler failure
    #[error("Handler error: {0}")]
    Handler(String),
}

/// Result type for eventsocket operations
pub type Result<T> = std::result::Result<T, EventSocketError>;
