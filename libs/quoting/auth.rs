//! Handshake payloads
//!
//! v1 identifies a single market maker, v2 an account quoting an explicit
//! asset list. Payloads are built on demand for every handshake attempt.

use crate::domain::{AssetAndChain, Credentials};
use crate::signer::{current_timestamp_ms, Signer};
use async_trait::async_trait;
use eventsocket::{AuthProvider, EventSocketError};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Socket.IO CONNECT auth body, tagged by `client_version`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "client_version")]
pub enum AuthPayload {
    #[serde(rename = "1")]
    MarketMaker {
        timestamp: i64,
        signature: String,
        market_maker_id: String,
    },
    #[serde(rename = "2")]
    Quoter {
        timestamp: i64,
        signature: String,
        account_id: String,
        quoted_assets: Vec<AssetAndChain>,
    },
}

impl AuthPayload {
    /// Build the payload for an already computed `(timestamp, signature)`
    pub fn new(credentials: &Credentials, timestamp: i64, signature: String) -> Self {
        match &credentials.quoted_assets {
            None => AuthPayload::MarketMaker {
                timestamp,
                signature,
                market_maker_id: credentials.account_id.clone(),
            },
            Some(assets) => AuthPayload::Quoter {
                timestamp,
                signature,
                account_id: credentials.account_id.clone(),
                quoted_assets: assets.clone(),
            },
        }
    }

    pub fn client_version(&self) -> &'static str {
        match self {
            AuthPayload::MarketMaker { .. } => "1",
            AuthPayload::Quoter { .. } => "2",
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            AuthPayload::MarketMaker { timestamp, .. } | AuthPayload::Quoter { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

/// Signs a fresh payload each time the transport asks for one
pub struct HandshakeAuth {
    credentials: Arc<Credentials>,
    signer: Arc<Signer>,
}

impl HandshakeAuth {
    pub fn new(credentials: Arc<Credentials>, signer: Arc<Signer>) -> Self {
        Self {
            credentials,
            signer,
        }
    }

    pub fn payload(&self) -> AuthPayload {
        let timestamp = current_timestamp_ms();
        let signature = self.signer.sign(&self.credentials.account_id, timestamp);
        AuthPayload::new(&self.credentials, timestamp, signature)
    }
}

#[async_trait]
impl AuthProvider for HandshakeAuth {
    async fn auth_payload(&self) -> eventsocket::Result<Option<Value>> {
        let payload = self.payload();
        debug!(
            client_version = payload.client_version(),
            timestamp = payload.timestamp(),
            "Signed handshake payload"
        );

        serde_json::to_value(&payload)
            .map(Some)
            .map_err(|e| EventSocketError::Auth(e.to_string()))
    }
}
