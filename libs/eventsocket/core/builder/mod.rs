pub mod states;

use crate::client::EventSocketClient;
use crate::config::ClientConfig;
use crate::connection_state::AtomicConnectionState;
use crate::protocol;
use crate::traits::*;
use states::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Type-state builder for EventSocketClient
///
/// The URL is required; everything else has a default:
/// no auth, no handlers, no hook, no handshake timeout, a single
/// handshake attempt and a private connection state.
pub struct EventSocketBuilder<U>
where
    U: UrlState,
{
    _state: TypeState<U>,
    url: Option<String>,
    auth: Option<Arc<dyn AuthProvider>>,
    handlers: EventTable,
    hook: Option<Arc<dyn ConnectionHook>>,
    handshake_timeout: Option<Duration>,
    retry_strategy: Option<Box<dyn ReconnectionStrategy>>,
    state: Option<Arc<AtomicConnectionState>>,
}

impl EventSocketBuilder<NoUrl> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            auth: None,
            handlers: EventTable::new(),
            hook: None,
            handshake_timeout: None,
            retry_strategy: None,
            state: None,
        }
    }

    pub fn url(self, url: impl Into<String>) -> EventSocketBuilder<HasUrl> {
        EventSocketBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            auth: self.auth,
            handlers: self.handlers,
            hook: self.hook,
            handshake_timeout: self.handshake_timeout,
            retry_strategy: self.retry_strategy,
            state: self.state,
        }
    }
}

impl Default for EventSocketBuilder<NoUrl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> EventSocketBuilder<U>
where
    U: UrlState,
{
    /// Set the handshake payload producer
    pub fn auth<A>(mut self, auth: A) -> Self
    where
        A: AuthProvider + 'static,
    {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Register the handler for an event name
    ///
    /// Registering the same name twice replaces the earlier handler.
    pub fn on<H>(mut self, event: impl Into<String>, handler: H) -> Self
    where
        H: EventHandler,
    {
        self.handlers.insert(event.into(), Arc::new(handler));
        self
    }

    /// Set the lifecycle observer
    pub fn hook<H>(mut self, hook: H) -> Self
    where
        H: ConnectionHook,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Bound the handshake, retries included
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    /// Set how failed handshake attempts are retried
    pub fn retry_strategy<S>(mut self, strategy: S) -> Self
    where
        S: ReconnectionStrategy + 'static,
    {
        self.retry_strategy = Some(Box::new(strategy));
        self
    }

    /// Share a connection state with the owner of the client
    pub fn state(mut self, state: Arc<AtomicConnectionState>) -> Self {
        self.state = Some(state);
        self
    }
}

impl EventSocketBuilder<HasUrl> {
    /// Build the client
    ///
    /// Fails if the URL cannot be mapped to an Engine.IO endpoint.
    pub fn build(self) -> Result<EventSocketClient> {
        let url = self
            .url
            .ok_or_else(|| EventSocketError::Configuration("URL not set".into()))?;
        let engine_url = protocol::engine_url(&url)?;

        let config = ClientConfig {
            url,
            engine_url,
            auth: self.auth,
            handlers: self.handlers,
            hook: self.hook,
            handshake_timeout: self.handshake_timeout,
            retry_strategy: self
                .retry_strategy
                .unwrap_or_else(|| Box::new(NeverReconnect)),
            state: self.state.unwrap_or_default(),
            shutdown_flag: Arc::new(AtomicBool::new(true)),
            close_signal: Arc::new(Notify::new()),
        };

        Ok(EventSocketClient::new(config))
    }
}
