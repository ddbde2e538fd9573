use super::error::Result;
use async_trait::async_trait;

/// Trait for observing the session lifecycle
///
/// Called from the client task, after the shared connection state has
/// already been updated.
#[async_trait]
pub trait ConnectionHook: Send + Sync + 'static {
    /// Handle connection state change
    ///
    /// # Arguments
    /// * `connected` - true once per successful handshake, false when the
    ///   session ends
    async fn handle_connection_change(&self, connected: bool) -> Result<()>;
}
