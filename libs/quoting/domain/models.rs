use crate::error::CallbackError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable asset on a specific chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAndChain {
    pub asset: String,
    pub chain: String,
}

impl AssetAndChain {
    pub fn new(asset: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            chain: chain.into(),
        }
    }
}

/// Direction of a leg from the market maker's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One hop of a quote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Decimal amount in base units
    pub amount: String,
    pub base_asset: AssetAndChain,
    pub quote_asset: AssetAndChain,
    pub side: Side,
}

/// A request for quotes, single-leg or two-leg (multi-hop)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub request_id: String,
    pub leg1: Leg,
    pub leg2: Option<Leg>,
}

impl QuoteRequest {
    pub fn single(request_id: impl Into<String>, leg: Leg) -> Self {
        Self {
            request_id: request_id.into(),
            leg1: leg,
            leg2: None,
        }
    }

    pub fn two_leg(request_id: impl Into<String>, leg1: Leg, leg2: Leg) -> Self {
        Self {
            request_id: request_id.into(),
            leg1,
            leg2: Some(leg2),
        }
    }

    /// Legs in request order
    pub fn legs(&self) -> impl Iterator<Item = &Leg> {
        std::iter::once(&self.leg1).chain(self.leg2.as_ref())
    }

    /// 1 or 2
    pub fn leg_count(&self) -> usize {
        if self.leg2.is_some() {
            2
        } else {
            1
        }
    }
}

/// `(tick, amount)` pair, serialized as a two-element array
///
/// The tick is an index into the venue's price grid and may be negative.
/// Neither field is validated; precision is the pricing logic's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder(pub i32, pub String);

impl LimitOrder {
    pub fn new(tick: i32, amount: impl Into<String>) -> Self {
        Self(tick, amount.into())
    }

    pub fn tick(&self) -> i32 {
        self.0
    }

    pub fn amount(&self) -> &str {
        &self.1
    }
}

/// Priced answer to a [`QuoteRequest`]
///
/// `legs` holds one list of orders per request leg, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub request_id: String,
    pub legs: Vec<Vec<LimitOrder>>,
}

impl QuoteResponse {
    /// Pair pricing output with the request it answers
    ///
    /// Fails when the number of leg quotes differs from the number of
    /// legs in the request.
    pub fn for_request(
        request: &QuoteRequest,
        legs: Vec<Vec<LimitOrder>>,
    ) -> std::result::Result<Self, CallbackError> {
        if legs.len() != request.leg_count() {
            return Err(CallbackError::LegCountMismatch {
                request_id: request.request_id.clone(),
                expected: request.leg_count(),
                actual: legs.len(),
            });
        }

        Ok(Self {
            request_id: request.request_id.clone(),
            legs,
        })
    }
}

/// Everything needed to authenticate with the venue
///
/// The presence of `quoted_assets` selects the multi-asset (v2)
/// handshake; without it the single market maker (v1) handshake is used.
#[derive(Clone)]
pub struct Credentials {
    pub account_id: String,
    pub private_key: Vec<u8>,
    pub password: Option<Vec<u8>>,
    pub quoted_assets: Option<Vec<AssetAndChain>>,
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, private_key: impl Into<Vec<u8>>) -> Self {
        Self {
            account_id: account_id.into(),
            private_key: private_key.into(),
            password: None,
            quoted_assets: None,
        }
    }

    /// Passphrase for an encrypted key
    pub fn with_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Quote an explicit asset list (v2 handshake)
    pub fn with_quoted_assets(mut self, assets: Vec<AssetAndChain>) -> Self {
        self.quoted_assets = Some(assets);
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("quoted_assets", &self.quoted_assets)
            .finish()
    }
}
