use super::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for providing the Socket.IO handshake payload
///
/// Implement this trait to define what the client presents to the
/// server in its CONNECT packet.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Build the auth payload for one handshake attempt
    ///
    /// Called once per attempt, including every retry, so timestamps,
    /// nonces and signatures are always fresh. Never cache the result.
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - Attach this JSON object to the CONNECT packet
    /// * `Ok(None)` - Connect without a payload
    /// * `Err(EventSocketError)` - The payload could not be produced
    async fn auth_payload(&self) -> Result<Option<Value>>;
}
