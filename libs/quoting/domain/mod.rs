//! Domain Layer
//!
//! Quote request and response entities plus the credentials a market
//! maker connects with. Nothing here touches the network.

pub mod models;

pub use models::{
    AssetAndChain, Credentials, Leg, LimitOrder, QuoteRequest, QuoteResponse, Side,
};
