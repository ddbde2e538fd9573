//! Pricing hook supplied by the market maker

use crate::domain::{LimitOrder, QuoteRequest};
use async_trait::async_trait;

/// Pricing logic plugged into a [`QuotingClient`](crate::QuotingClient)
///
/// `price_quote` returns one list of orders per request leg, in leg order.
/// Returning an error means "cannot price": the request goes unanswered.
#[async_trait]
pub trait Quoter: Send + Sync + 'static {
    async fn price_quote(&self, request: &QuoteRequest) -> anyhow::Result<Vec<Vec<LimitOrder>>>;

    /// Called once per successful handshake
    fn on_connected(&self) {}
}

/// Answers every leg with a single fixed order
///
/// Mirrors the venue's mock market maker: tick `-1` for `10^18` base units
/// unless configured otherwise.
#[derive(Debug, Clone)]
pub struct MockQuoter {
    order: LimitOrder,
}

impl MockQuoter {
    pub fn new() -> Self {
        Self {
            order: LimitOrder::new(-1, "1000000000000000000"),
        }
    }

    pub fn with_order(order: LimitOrder) -> Self {
        Self { order }
    }
}

impl Default for MockQuoter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Quoter for MockQuoter {
    async fn price_quote(&self, request: &QuoteRequest) -> anyhow::Result<Vec<Vec<LimitOrder>>> {
        Ok(request.legs().map(|_| vec![self.order.clone()]).collect())
    }

    fn on_connected(&self) {
        tracing::info!("Mock quoter connected");
    }
}
