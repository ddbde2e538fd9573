//! Common test utilities for EventSocket integration tests
//!
//! Provides an in-process Socket.IO server speaking just enough of the
//! Engine.IO v4 protocol to exercise the client.

use eventsocket::protocol::{self, OpenPayload, Packet};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Notify};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Server behaviour knobs
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Number of handshakes answered with CONNECT_ERROR before accepting
    pub reject_handshakes: usize,
    pub ping_interval_ms: u64,
    pub ping_timeout_ms: u64,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            reject_handshakes: 0,
            ping_interval_ms: 25_000,
            ping_timeout_ms: 20_000,
        }
    }
}

/// A mock Socket.IO server
pub struct MockSocketIoServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    outbound: broadcast::Sender<String>,
    auths: mpsc::UnboundedReceiver<Value>,
    inbound: mpsc::UnboundedReceiver<String>,
}

struct ConnectionContext {
    options: ServerOptions,
    rejections: Arc<AtomicUsize>,
    auth_tx: mpsc::UnboundedSender<Value>,
    inbound_tx: mpsc::UnboundedSender<String>,
    outbound: broadcast::Receiver<String>,
    shutdown: Arc<Notify>,
}

impl MockSocketIoServer {
    /// Start a server that accepts every handshake
    pub async fn start() -> Self {
        Self::start_with(ServerOptions::default()).await
    }

    /// Create and start a new mock server
    pub async fn start_with(options: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let (outbound, _) = broadcast::channel(64);
        let (auth_tx, auths) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let rejections = Arc::new(AtomicUsize::new(options.reject_handshakes));

        let shutdown_clone = Arc::clone(&shutdown);
        let outbound_clone = outbound.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let context = ConnectionContext {
                                    options: options.clone(),
                                    rejections: Arc::clone(&rejections),
                                    auth_tx: auth_tx.clone(),
                                    inbound_tx: inbound_tx.clone(),
                                    outbound: outbound_clone.subscribe(),
                                    shutdown: Arc::clone(&shutdown_clone),
                                };
                                tokio::spawn(Self::handle_connection(stream, context));
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown,
            outbound,
            auths,
            inbound,
        }
    }

    async fn handle_connection(stream: TcpStream, mut context: ConnectionContext) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        let (mut write, mut read) = ws_stream.split();

        let open = Packet::Open(OpenPayload {
            sid: "engine-1".into(),
            upgrades: vec![],
            ping_interval: context.options.ping_interval_ms,
            ping_timeout: context.options.ping_timeout_ms,
            max_payload: Some(1_000_000),
        });
        if write.send(text(&open)).await.is_err() {
            return;
        }

        let auth = loop {
            match read.next().await {
                Some(Ok(Message::Text(frame))) => {
                    if let Ok(Packet::Connect(payload)) = protocol::decode(&frame) {
                        break payload.unwrap_or(Value::Null);
                    }
                }
                Some(Ok(_)) => continue,
                _ => return,
            }
        };
        let _ = context.auth_tx.send(auth);

        let reject = context
            .rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if reject {
            let _ = write
                .send(text(&Packet::ConnectError("invalid signature".into())))
                .await;
            return;
        }

        let ack = Packet::Connect(Some(json!({ "sid": "socket-1" })));
        if write.send(text(&ack)).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                frame = context.outbound.recv() => {
                    match frame {
                        Ok(frame) => {
                            if write.send(Message::Text(frame)).await.is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(frame))) => {
                            let _ = context.inbound_tx.send(frame);
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                _ = context.shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the http URL a client would be configured with
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Push a raw frame to every connected client
    pub fn send_raw(&self, frame: impl Into<String>) {
        let _ = self.outbound.send(frame.into());
    }

    /// Push an event to every connected client
    pub fn emit(&self, name: &str, data: Value) {
        let frame = protocol::encode(&Packet::Event {
            name: name.into(),
            data,
        })
        .unwrap();
        self.send_raw(frame);
    }

    /// Next auth payload presented by a client
    pub async fn next_auth(&mut self) -> Option<Value> {
        tokio::time::timeout(Duration::from_secs(2), self.auths.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next frame sent by a client after its handshake
    pub async fn next_frame(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.inbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockSocketIoServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn text(packet: &Packet) -> Message {
    Message::Text(protocol::encode(packet).unwrap())
}
