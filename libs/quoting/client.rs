//! Connection lifecycle controller
//!
//! Owns one venue connection: signs the handshake, dispatches
//! `quote_request` events to the [`Quoter`] and emits the answers as
//! `quote_response` events on the same socket.

use crate::auth::HandshakeAuth;
use crate::codec::{
    decode_quote_request, encode_quote_response, QUOTE_REQUEST_EVENT, QUOTE_RESPONSE_EVENT,
};
use crate::domain::{Credentials, QuoteResponse};
use crate::error::{CallbackError, QuotingError, Result};
use crate::quoter::Quoter;
use crate::signer::Signer;
use async_trait::async_trait;
use eventsocket::{
    AtomicConnectionState, ConnectionHook, ConnectionState, Emitter, EventHandler, FixedDelay,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Default bound on the handshake
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default pause between handshake attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

const DISCONNECT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// =============================================================================
// Client
// =============================================================================

/// Signed quoting client for a single venue
///
/// All methods take `&self`; wrap the client in an `Arc` to call
/// [`disconnect`](Self::disconnect) while [`connect`](Self::connect) runs.
pub struct QuotingClient<Q: Quoter> {
    url: String,
    credentials: Arc<Credentials>,
    signer: Arc<Signer>,
    quoter: Arc<Q>,
    wait_timeout: Option<Duration>,
    retry_delay: Duration,
    state: Arc<AtomicConnectionState>,
    emitter: Mutex<Option<Emitter>>,
    error_tx: mpsc::UnboundedSender<QuotingError>,
    error_rx: Mutex<Option<mpsc::UnboundedReceiver<QuotingError>>>,
}

impl<Q: Quoter> QuotingClient<Q> {
    /// Create a client, parsing the private key up front
    ///
    /// A malformed key or wrong password fails here with
    /// [`QuotingError::Credential`], before any connection is attempted.
    pub fn new(url: impl Into<String>, credentials: Credentials, quoter: Q) -> Result<Self> {
        let signer = Signer::from_pem(&credentials.private_key, credentials.password.as_deref())?;
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        Ok(Self {
            url: url.into(),
            credentials: Arc::new(credentials),
            signer: Arc::new(signer),
            quoter: Arc::new(quoter),
            wait_timeout: Some(DEFAULT_WAIT_TIMEOUT),
            retry_delay: DEFAULT_RETRY_DELAY,
            state: Arc::new(AtomicConnectionState::default()),
            emitter: Mutex::new(None),
            error_tx,
            error_rx: Mutex::new(Some(error_rx)),
        })
    }

    /// Bound the handshake; `None` waits on a single attempt indefinitely
    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Pause between handshake attempts while the wait timeout runs
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn account_id(&self) -> &str {
        &self.credentials.account_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Per-message decode and pricing failures
    ///
    /// Can be taken once; later calls return `None`.
    pub fn take_error_receiver(&self) -> Option<mpsc::UnboundedReceiver<QuotingError>> {
        self.error_rx.lock().take()
    }

    /// Connect and serve quote requests until stopped
    ///
    /// Resolves with an error if the handshake fails or times out, with
    /// `Ok(())` after [`disconnect`](Self::disconnect), and with
    /// [`QuotingError::Transport`] when the venue drops the connection.
    /// Reconnecting is left to the caller.
    pub async fn connect(&self) -> Result<()> {
        // The slot lock covers the state change and the emitter publish,
        // so a `Connecting` client always has an emitter to close.
        let (mut socket, emitter) = {
            let mut slot = self.emitter.lock();
            if !self
                .state
                .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
            {
                return Err(QuotingError::InvalidState(format!(
                    "connect() called while {:?}",
                    self.state.get()
                )));
            }

            let socket = match self.build_socket() {
                Ok(socket) => socket,
                Err(e) => {
                    self.state.set(ConnectionState::Disconnected);
                    return Err(e);
                }
            };
            let emitter = socket.emitter();
            *slot = Some(emitter.clone());
            (socket, emitter)
        };

        info!(
            url = %self.url,
            account_id = %self.credentials.account_id,
            "Connecting to quoting venue"
        );

        if let Err(e) = socket.connect().await {
            self.release_emitter(&emitter);
            warn!(
                error = %e,
                last_attempt = socket.last_handshake_error().unwrap_or("none"),
                "Handshake with quoting venue failed"
            );
            return Err(e.into());
        }

        let result = socket.run().await;
        self.release_emitter(&emitter);

        match result {
            Ok(()) => {
                info!("Quoting session closed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Quoting session lost");
                Err(QuotingError::Transport(e.to_string()))
            }
        }
    }

    /// Emit a response if connected
    ///
    /// Best effort: returns `false` and sends nothing when disconnected.
    pub fn send_quote(&self, response: &QuoteResponse) -> bool {
        let emitter = self.emitter.lock().clone();
        match emitter {
            Some(emitter) => emit_quote(&emitter, response),
            None => {
                debug!(request_id = %response.request_id, "Not connected, quote not sent");
                false
            }
        }
    }

    /// Close the connection and wait for the session to wind down
    ///
    /// No-op when already disconnected. Pricing callbacks in flight are
    /// not cancelled; their responses are dropped.
    pub async fn disconnect(&self) {
        let emitter = self.emitter.lock().clone();
        let Some(emitter) = emitter else {
            debug!("disconnect() while disconnected");
            return;
        };

        info!("Disconnecting from quoting venue");
        emitter.close();

        while !self.state.is_disconnected() && self.holds(&emitter) {
            sleep(DISCONNECT_POLL_INTERVAL).await;
        }
    }

    fn holds(&self, emitter: &Emitter) -> bool {
        self.emitter
            .lock()
            .as_ref()
            .is_some_and(|current| current.same_client(emitter))
    }

    fn build_socket(&self) -> Result<eventsocket::EventSocketClient> {
        let builder = eventsocket::builder()
            .url(self.url.clone())
            .auth(HandshakeAuth::new(
                Arc::clone(&self.credentials),
                Arc::clone(&self.signer),
            ))
            .on(
                QUOTE_REQUEST_EVENT,
                QuoteRequestHandler {
                    quoter: Arc::clone(&self.quoter),
                    errors: self.error_tx.clone(),
                },
            )
            .hook(QuoterHook {
                quoter: Arc::clone(&self.quoter),
            })
            .state(Arc::clone(&self.state));

        let builder = match self.wait_timeout {
            Some(limit) => builder
                .handshake_timeout(limit)
                .retry_strategy(FixedDelay::new(self.retry_delay, None)),
            None => builder,
        };

        Ok(builder.build()?)
    }

    /// Clear the emitter slot unless a newer session already took it
    fn release_emitter(&self, emitter: &Emitter) {
        let mut slot = self.emitter.lock();
        if slot.as_ref().is_some_and(|current| current.same_client(emitter)) {
            *slot = None;
        }
    }
}

fn emit_quote(emitter: &Emitter, response: &QuoteResponse) -> bool {
    if !emitter.is_connected() {
        debug!(request_id = %response.request_id, "Not connected, quote not sent");
        return false;
    }

    let payload = match serde_json::to_value(response) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(request_id = %response.request_id, error = %e, "Quote not serializable");
            return false;
        }
    };

    match emitter.emit(QUOTE_RESPONSE_EVENT, payload) {
        Ok(()) => {
            debug!(request_id = %response.request_id, "Quote sent");
            true
        }
        Err(e) => {
            debug!(request_id = %response.request_id, error = %e, "Quote dropped");
            false
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Decode, price, encode, emit
struct QuoteRequestHandler<Q> {
    quoter: Arc<Q>,
    errors: mpsc::UnboundedSender<QuotingError>,
}

impl<Q: Quoter> QuoteRequestHandler<Q> {
    fn report(&self, error: QuotingError) {
        warn!(error = %error, "Quote request dropped");
        let _ = self.errors.send(error);
    }
}

#[async_trait]
impl<Q: Quoter> EventHandler for QuoteRequestHandler<Q> {
    async fn handle(&self, data: Value, emitter: Emitter) -> eventsocket::Result<()> {
        let request = match decode_quote_request(data) {
            Ok(request) => request,
            Err(e) => {
                self.report(e);
                return Ok(());
            }
        };
        debug!(
            request_id = %request.request_id,
            legs = request.leg_count(),
            "Quote request received"
        );

        let legs = match self.quoter.price_quote(&request).await {
            Ok(legs) => legs,
            Err(e) => {
                self.report(
                    CallbackError::Failed {
                        request_id: request.request_id.clone(),
                        message: format!("{:#}", e),
                    }
                    .into(),
                );
                return Ok(());
            }
        };

        match encode_quote_response(&request, legs) {
            Ok(response) => {
                emit_quote(&emitter, &response);
            }
            Err(e) => self.report(e.into()),
        }

        Ok(())
    }
}

/// Tells the quoter about successful handshakes
struct QuoterHook<Q> {
    quoter: Arc<Q>,
}

#[async_trait]
impl<Q: Quoter> ConnectionHook for QuoterHook<Q> {
    async fn handle_connection_change(&self, connected: bool) -> eventsocket::Result<()> {
        if connected {
            info!("Connected to quoting venue");
            self.quoter.on_connected();
        } else {
            info!("Disconnected from quoting venue");
        }
        Ok(())
    }
}
