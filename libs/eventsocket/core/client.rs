use crate::config::ClientConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::protocol::{self, OpenPayload, Packet};
use crate::traits::*;
use futures::{Sink, SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Internal command messages for client control
#[derive(Debug)]
enum ClientCommand {
    /// Send an EVENT packet
    Emit { event: String, data: Value },
    /// Close the session
    Shutdown,
}

/// Client metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub handshake_attempts: u64,
    pub connection_state: ConnectionState,
}

/// Cloneable handle for talking to a running session
///
/// Handed to every [`EventHandler`] invocation and available to the
/// owner through [`EventSocketClient::emitter`].
#[derive(Debug, Clone)]
pub struct Emitter {
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    state: Arc<AtomicConnectionState>,
    shutdown_flag: Arc<AtomicBool>,
    close_signal: Arc<Notify>,
}

impl Emitter {
    /// Queue an event for the server
    ///
    /// Fails when the session is not connected or has already ended.
    pub fn emit(&self, event: impl Into<String>, data: Value) -> Result<()> {
        if !self.state.is_connected() {
            return Err(EventSocketError::InvalidState("not connected".into()));
        }
        self.command_tx
            .send(ClientCommand::Emit {
                event: event.into(),
                data,
            })
            .map_err(|e| EventSocketError::ChannelSend(e.to_string()))
    }

    /// Check if the session is connected
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Stop the session, or abort a handshake in progress
    pub fn close(&self) {
        self.shutdown_flag.store(false, Ordering::Release);
        self.close_signal.notify_waiters();
        let _ = self.command_tx.send(ClientCommand::Shutdown);
    }

    /// Check whether two emitters belong to the same client
    pub fn same_client(&self, other: &Emitter) -> bool {
        self.command_tx.same_channel(&other.command_tx)
    }
}

/// Socket.IO event-channel client over a single WebSocket
///
/// Lifecycle: [`connect`](Self::connect) performs the handshake (with
/// retries, bounded by the handshake timeout), then
/// [`run`](Self::run) drives the session until it is closed through an
/// [`Emitter`] or the transport fails. The client never reconnects an
/// established session on its own.
pub struct EventSocketClient {
    config: Arc<ClientConfig>,
    metrics: Arc<AtomicMetrics>,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    command_rx: mpsc::UnboundedReceiver<ClientCommand>,
    session: Option<(WsStream, OpenPayload)>,
    last_handshake_error: Option<String>,
}

impl EventSocketClient {
    /// Create a client from configuration
    ///
    /// Called by the builder's `build()` method.
    pub(crate) fn new(config: ClientConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Self {
            config: Arc::new(config),
            metrics: Arc::new(AtomicMetrics::new()),
            command_tx,
            command_rx,
            session: None,
            last_handshake_error: None,
        }
    }

    /// Get a handle for emitting events and closing the session
    pub fn emitter(&self) -> Emitter {
        Emitter {
            command_tx: self.command_tx.clone(),
            state: Arc::clone(&self.config.state),
            shutdown_flag: Arc::clone(&self.config.shutdown_flag),
            close_signal: Arc::clone(&self.config.close_signal),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.config.state.get()
    }

    /// Check if connected
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.config.state.is_connected()
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            handshake_attempts: self.metrics.handshake_attempts(),
            connection_state: self.config.state.get(),
        }
    }

    /// Why the most recent failed handshake attempt failed
    ///
    /// Kept after a handshake timeout, which otherwise hides rejections.
    pub fn last_handshake_error(&self) -> Option<&str> {
        self.last_handshake_error.as_deref()
    }

    /// Perform the Socket.IO handshake
    ///
    /// Every attempt asks the auth provider for a fresh payload. Failed
    /// attempts are retried according to the retry strategy; the whole
    /// sequence is bounded by the handshake timeout when one is set.
    /// On success the state is `Connected` and the hook has been told.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() || self.config.state.is_connected() {
            return Err(EventSocketError::InvalidState("already connected".into()));
        }

        self.config.state.set(ConnectionState::Connecting);
        debug!("Connecting to {}", self.config.engine_url);

        let mut last_error = None;
        let outcome = match self.config.handshake_timeout {
            Some(limit) => {
                let attempts = handshake_with_retries(&self.config, &self.metrics, &mut last_error);
                let result = timeout(limit, attempts).await;
                result.unwrap_or_else(|_| {
                    warn!(
                        last_error = last_error.as_deref().unwrap_or("none"),
                        "Handshake not completed within {:?}",
                        limit
                    );
                    Err(EventSocketError::HandshakeTimeout(limit))
                })
            }
            None => handshake_with_retries(&self.config, &self.metrics, &mut last_error).await,
        };
        self.last_handshake_error = last_error;

        let (mut stream, open) = match outcome {
            Ok(session) => session,
            Err(e) => {
                self.config.state.set(ConnectionState::Disconnected);
                warn!(error = %e, "Failed to connect to {}", self.config.url);
                return Err(e);
            }
        };

        if !self.config.shutdown_flag.load(Ordering::Acquire) {
            debug!("Client closed during handshake, dropping session");
            let _ = send_packet(&mut stream, &self.metrics, &Packet::Disconnect).await;
            let _ = stream.close(None).await;
            self.config.state.set(ConnectionState::Disconnected);
            return Err(EventSocketError::ConnectionClosed(
                "client closed during handshake".into(),
            ));
        }

        self.config.state.set(ConnectionState::Connected);
        info!(sid = %open.sid, "Connected to {}", self.config.url);
        notify_hook(&self.config, true).await;

        self.session = Some((stream, open));
        Ok(())
    }

    /// Drive the session until it is closed or the transport fails
    ///
    /// Returns `Ok(())` after a requested close, an error when the server
    /// or the network ended the session. Either way the state is
    /// `Disconnected` and the hook has been told when this returns.
    pub async fn run(self) -> Result<()> {
        let EventSocketClient {
            config,
            metrics,
            command_tx,
            mut command_rx,
            session,
            ..
        } = self;

        let (stream, open) = session.ok_or_else(|| {
            EventSocketError::InvalidState("run() called before connect()".into())
        })?;

        let emitter = Emitter {
            command_tx,
            state: Arc::clone(&config.state),
            shutdown_flag: Arc::clone(&config.shutdown_flag),
            close_signal: Arc::clone(&config.close_signal),
        };

        let result =
            message_loop(stream, &open, &config, &metrics, &mut command_rx, &emitter).await;

        config.state.set(ConnectionState::Disconnected);
        match &result {
            Ok(()) => info!("Disconnected from {}", config.url),
            Err(e) => warn!(error = %e, "Session with {} ended", config.url),
        }
        notify_hook(&config, false).await;

        result
    }
}

/// Handshake attempts, paced by the retry strategy
///
/// Every attempt and every pause races the close signal, so
/// `Emitter::close()` ends the handshake even while a venue stalls.
async fn handshake_with_retries(
    config: &ClientConfig,
    metrics: &AtomicMetrics,
    last_error: &mut Option<String>,
) -> Result<(WsStream, OpenPayload)> {
    let mut attempt = 0;

    loop {
        metrics.increment_handshakes();
        let error = tokio::select! {
            result = handshake(config, metrics) => match result {
                Ok(session) => return Ok(session),
                Err(e) => e,
            },
            _ = closed(config) => return Err(closed_during_handshake()),
        };
        *last_error = Some(error.to_string());

        match config.retry_strategy.next_delay(attempt) {
            Some(delay) => {
                warn!(
                    attempt = attempt + 1,
                    error = %error,
                    "Handshake attempt failed, retrying in {:?}",
                    delay
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = closed(config) => return Err(closed_during_handshake()),
                }
                attempt += 1;
            }
            None => return Err(error),
        }
    }
}

/// Resolves once `Emitter::close()` has been called
async fn closed(config: &ClientConfig) {
    loop {
        let notified = config.close_signal.notified();
        if !config.shutdown_flag.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }
}

fn closed_during_handshake() -> EventSocketError {
    EventSocketError::ConnectionClosed("client closed before handshake completed".into())
}

/// One handshake attempt: open, CONNECT with a fresh payload, await the ack
async fn handshake(
    config: &ClientConfig,
    metrics: &AtomicMetrics,
) -> Result<(WsStream, OpenPayload)> {
    let (mut stream, _) = connect_async(config.engine_url.as_str())
        .await
        .map_err(|e| EventSocketError::WebSocket(e.to_string()))?;

    let open = match next_packet(&mut stream, metrics).await? {
        Packet::Open(open) => open,
        other => {
            return Err(EventSocketError::Protocol(format!(
                "expected open packet, got {:?}",
                other
            )))
        }
    };
    debug!(sid = %open.sid, "Engine session opened");

    let payload = match &config.auth {
        Some(auth) => auth.auth_payload().await?,
        None => None,
    };
    send_packet(&mut stream, metrics, &Packet::Connect(payload)).await?;

    loop {
        match next_packet(&mut stream, metrics).await? {
            Packet::Connect(_) => return Ok((stream, open)),
            Packet::ConnectError(reason) => {
                let _ = stream.close(None).await;
                return Err(EventSocketError::HandshakeRejected(reason));
            }
            Packet::Ping => send_packet(&mut stream, metrics, &Packet::Pong).await?,
            Packet::Noop => {}
            other => {
                return Err(EventSocketError::Protocol(format!(
                    "unexpected packet during handshake: {:?}",
                    other
                )))
            }
        }
    }
}

/// Main session loop
async fn message_loop(
    stream: WsStream,
    open: &OpenPayload,
    config: &ClientConfig,
    metrics: &AtomicMetrics,
    command_rx: &mut mpsc::UnboundedReceiver<ClientCommand>,
    emitter: &Emitter,
) -> Result<()> {
    let (mut write, mut read) = stream.split();
    let window = open.liveness_window();
    let mut deadline = Instant::now() + window;

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        metrics.increment_received();
                        deadline = Instant::now() + window;

                        match protocol::decode(&text) {
                            Ok(Packet::Ping) => {
                                send_packet(&mut write, metrics, &Packet::Pong).await?
                            }
                            Ok(Packet::Event { name, data }) => dispatch(config, emitter, name, data),
                            Ok(Packet::Disconnect) | Ok(Packet::Close) => {
                                return Err(EventSocketError::ConnectionClosed(
                                    "server closed the session".into(),
                                ));
                            }
                            Ok(other) => debug!(packet = ?other, "Ignoring packet"),
                            Err(e) => warn!(error = %e, "Dropping undecodable frame"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(EventSocketError::ConnectionClosed("stream ended".into()));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        return Err(EventSocketError::WebSocket(e.to_string()));
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(ClientCommand::Emit { event, data }) => {
                        send_packet(&mut write, metrics, &Packet::Event { name: event, data }).await?
                    }
                    Some(ClientCommand::Shutdown) | None => {
                        info!("Received shutdown command");
                        let _ = send_packet(&mut write, metrics, &Packet::Disconnect).await;
                        let _ = write.close().await;
                        return Ok(());
                    }
                }
            }

            _ = sleep_until(deadline) => {
                return Err(EventSocketError::ConnectionClosed(format!(
                    "no frame from server within {:?}",
                    window
                )));
            }
        }
    }
}

/// Hand an event to its handler on a dedicated task
fn dispatch(config: &ClientConfig, emitter: &Emitter, name: String, data: Value) {
    let Some(handler) = config.handlers.get(&name) else {
        warn!("No handler configured for event: {:?}", name);
        return;
    };

    let handler = Arc::clone(handler);
    let emitter = emitter.clone();

    tokio::spawn(async move {
        if let Err(e) = handler.handle(data, emitter).await {
            error!("Handler error for event {:?}: {}", name, e);
        }
    });
}

async fn notify_hook(config: &ClientConfig, connected: bool) {
    if let Some(hook) = &config.hook {
        if let Err(e) = hook.handle_connection_change(connected).await {
            error!("Connection hook error: {}", e);
        }
    }
}

async fn next_packet(stream: &mut WsStream, metrics: &AtomicMetrics) -> Result<Packet> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                metrics.increment_received();
                return protocol::decode(&text);
            }
            Some(Ok(Message::Binary(_))) => {
                return Err(EventSocketError::Protocol(
                    "binary frames are not supported".into(),
                ))
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(EventSocketError::ConnectionClosed(
                    "closed during handshake".into(),
                ))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(EventSocketError::WebSocket(e.to_string())),
        }
    }
}

async fn send_packet<S>(sink: &mut S, metrics: &AtomicMetrics, packet: &Packet) -> Result<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let frame = protocol::encode(packet)?;
    sink.send(Message::Text(frame))
        .await
        .map_err(|e| EventSocketError::WebSocket(e.to_string()))?;
    metrics.increment_sent();
    Ok(())
}
