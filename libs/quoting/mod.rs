//! Signed quoting client for market makers
//!
//! Connects to a venue's quoting service over Socket.IO, authenticates with
//! an Ed25519 signature and answers `quote_request` events with priced
//! limit orders produced by a [`Quoter`].
//!
//! ```rust,ignore
//! use quoting::{Credentials, MockQuoter, QuotingClient};
//!
//! let credentials = Credentials::new("mm1", std::fs::read("key.pem")?);
//! let client = QuotingClient::new("http://localhost:8080", credentials, MockQuoter::new())?;
//! client.connect().await?;
//! ```

pub mod auth;
pub mod client;
pub mod codec;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod quoter;
pub mod signer;

// Re-export commonly used items
pub use auth::{AuthPayload, HandshakeAuth};
pub use client::{QuotingClient, DEFAULT_RETRY_DELAY, DEFAULT_WAIT_TIMEOUT};
pub use codec::{
    decode_quote_request, encode_quote_response, QUOTE_REQUEST_EVENT, QUOTE_RESPONSE_EVENT,
};
pub use domain::{
    AssetAndChain, Credentials, Leg, LimitOrder, QuoteRequest, QuoteResponse, Side,
};
pub use error::{CallbackError, QuotingError, Result};
pub use infrastructure::{init_tracing, ConfigError, QuoterConfig};
pub use quoter::{MockQuoter, Quoter};
pub use signer::Signer;

pub use eventsocket::ConnectionState;
