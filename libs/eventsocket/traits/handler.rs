//! Event Dispatch
//!
//! Inbound EVENT packets are dispatched by name through an [`EventTable`].
//!
//! ```text
//! WebSocket → Packet::Event { name, data } → EventTable[name] → spawned task
//!                                                 ↓
//!                                  "quote_request" → QuoteHandler
//!                                  "other"         → (logged, dropped)
//! ```
//!
//! Every event runs on its own tokio task, so a slow handler for one
//! event never delays the read loop or other events.

use crate::core::client::Emitter;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler for one named inbound event
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// #[async_trait]
/// impl EventHandler for Echo {
///     async fn handle(&self, data: Value, emitter: Emitter) -> Result<()> {
///         emitter.emit("echo", data)
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handle the first argument of an inbound event
    ///
    /// `emitter` answers on the same connection the event arrived on.
    ///
    /// # Errors
    /// Errors are logged by the client; the session keeps running.
    async fn handle(&self, data: Value, emitter: Emitter) -> Result<()>;
}

/// Dispatch table keyed by event name
pub type EventTable = HashMap<String, Arc<dyn EventHandler>>;
