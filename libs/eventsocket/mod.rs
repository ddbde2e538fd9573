//! # EventSocket
//!
//! A Socket.IO event-channel client running over a single WebSocket.
//!
//! ## Features
//!
//! - **WebSocket only**: Engine.IO v4 framing with no long-polling fallback
//! - **Fresh auth per attempt**: the handshake payload is produced by an
//!   [`AuthProvider`] every time a connection is attempted
//! - **Dispatch table**: one [`EventHandler`] per event name, each event
//!   handled on its own task
//! - **Bounded handshake**: pluggable retry strategy inside an optional
//!   handshake timeout

pub mod core;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    builder, client, config, connection_state, protocol,
    builder::{states, EventSocketBuilder},
    client::{Emitter, EventSocketClient, Metrics},
    config::ClientConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    protocol::{OpenPayload, Packet},
};

// Convenience function
pub use self::core::builder as client_builder;

/// Type alias for Result with EventSocketError
pub type Result<T> = std::result::Result<T, traits::EventSocketError>;
