//! # EventSocket core
//!
//! ## Example
//!
//! ```rust,ignore
//! use eventsocket::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = eventsocket::builder()
//!         .url("https://venue.example.com")
//!         .auth(MyAuth::new())
//!         .on("quote_request", MyHandler)
//!         .handshake_timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let emitter = client.emitter();
//!     client.connect().await?;
//!
//!     // Blocks until `emitter.close()` or a transport failure
//!     client.run().await
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod protocol;

// Re-export main types
pub use builder::{states, EventSocketBuilder};
pub use client::{Emitter, EventSocketClient, Metrics};
pub use config::ClientConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new client builder
pub fn builder() -> EventSocketBuilder<builder::states::NoUrl> {
    EventSocketBuilder::new()
}
