//! # EventSocket Traits
//!
//! The seams a caller plugs into:
//!
//! - **AuthProvider**: produce the handshake payload for each attempt
//! - **EventHandler**: handle one named inbound event
//! - **ConnectionHook**: observe handshake success and session end
//! - **ReconnectionStrategy**: pace handshake retries

pub mod auth;
pub mod error;
pub mod handler;
pub mod hook;
pub mod reconnect;

// Re-export commonly used types
pub use auth::AuthProvider;
pub use error::{EventSocketError, Result};
pub use handler::{EventHandler, EventTable};
pub use hook::ConnectionHook;
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
