//! Common test utilities for quoting integration tests
//!
//! `MockVenue` plays the quoting service: it checks nothing, records the
//! handshake auth, pushes quote requests and collects quote responses.

#![allow(dead_code)]

use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::SigningKey;
use eventsocket::protocol::{self, OpenPayload, Packet};
use futures::{SinkExt, StreamExt};
use pkcs8::LineEnding;
use quoting::{ConnectionState, Quoter, QuotingClient};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[11u8; 32])
}

pub fn private_key_pem() -> Vec<u8> {
    signing_key()
        .to_pkcs8_pem(LineEnding::LF)
        .unwrap()
        .as_bytes()
        .to_vec()
}

pub fn leg(base: &str, quote: &str, side: &str) -> Value {
    json!({
        "amount": "100",
        "base_asset": { "asset": base, "chain": "Ethereum" },
        "quote_asset": { "asset": quote, "chain": "Ethereum" },
        "side": side,
    })
}

/// Poll until the client reaches `Connected`
pub async fn wait_connected<Q: Quoter>(client: &QuotingClient<Q>) {
    wait_state(client, ConnectionState::Connected).await;
}

/// Poll until the client reaches `state`
pub async fn wait_state<Q: Quoter>(client: &QuotingClient<Q>, state: ConnectionState) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while client.state() != state {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("client never reached {:?}", state));
}

/// In-process quoting venue
pub struct MockVenue {
    pub addr: SocketAddr,
    outbound: broadcast::Sender<String>,
    auths: mpsc::UnboundedReceiver<Value>,
    responses: mpsc::UnboundedReceiver<Value>,
}

#[derive(Clone)]
struct Session {
    rejections: Arc<AtomicUsize>,
    auth_tx: mpsc::UnboundedSender<Value>,
    response_tx: mpsc::UnboundedSender<Value>,
}

impl MockVenue {
    pub async fn start() -> Self {
        Self::start_rejecting(0).await
    }

    /// Answer the first `rejections` handshakes with CONNECT_ERROR
    pub async fn start_rejecting(rejections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (outbound, _) = broadcast::channel(64);
        let (auth_tx, auths) = mpsc::unbounded_channel();
        let (response_tx, responses) = mpsc::unbounded_channel();

        let session = Session {
            rejections: Arc::new(AtomicUsize::new(rejections)),
            auth_tx,
            response_tx,
        };
        let outbound_clone = outbound.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, session.clone(), outbound_clone.subscribe()));
            }
        });

        Self {
            addr,
            outbound,
            auths,
            responses,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn send_request(&self, payload: Value) {
        let frame = protocol::encode(&Packet::Event {
            name: "quote_request".into(),
            data: payload,
        })
        .unwrap();
        let _ = self.outbound.send(frame);
    }

    /// End every session with a Socket.IO DISCONNECT
    pub fn kick_all(&self) {
        let _ = self.outbound.send(protocol::encode(&Packet::Disconnect).unwrap());
    }

    pub async fn next_auth(&mut self) -> Option<Value> {
        tokio::time::timeout(RECV_TIMEOUT, self.auths.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn next_response(&mut self) -> Option<Value> {
        tokio::time::timeout(RECV_TIMEOUT, self.responses.recv())
            .await
            .ok()
            .flatten()
    }

    /// Assert that nothing arrives within `window`
    pub async fn expect_no_response(&mut self, window: Duration) {
        if let Ok(Some(response)) = tokio::time::timeout(window, self.responses.recv()).await {
            panic!("unexpected response: {}", response);
        }
    }
}

async fn serve(stream: TcpStream, session: Session, mut outbound: broadcast::Receiver<String>) {
    let Ok(ws) = accept_async(stream).await else {
        return;
    };
    let (mut write, mut read) = ws.split();

    let open = Packet::Open(OpenPayload {
        sid: "venue".into(),
        upgrades: vec![],
        ping_interval: 25_000,
        ping_timeout: 20_000,
        max_payload: None,
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
    let _ = session.auth_tx.send(auth);

    let rejected = session
        .rejections
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if rejected {
        let _ = write
            .send(text(&Packet::ConnectError("timestamp out of range".into())))
            .await;
        return;
    }

    let ack = Packet::Connect(Some(json!({ "sid": "quoter" })));
    if write.send(text(&ack)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Ok(frame) = frame else { break };
                if write.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(frame))) => {
                        if let Ok(Packet::Event { name, data }) = protocol::decode(&frame) {
                            if name == "quote_response" {
                                let _ = session.response_tx.send(data);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn text(packet: &Packet) -> Message {
    Message::Text(protocol::encode(packet).unwrap())
}
