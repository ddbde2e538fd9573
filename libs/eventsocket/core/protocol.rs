//! Engine.IO v4 / Socket.IO v5 framing
//!
//! Every WebSocket text frame is one Engine.IO packet. Socket.IO packets
//! travel inside Engine.IO `4` (message) packets:
//!
//! ```text
//! 0{"sid":..,"pingInterval":..}   open
//! 2 / 3                           ping / pong
//! 40{"token":..}                  CONNECT with auth payload
//! 44{"message":"invalid auth"}    CONNECT_ERROR
//! 42["quote_request",{..}]        EVENT
//! 41                              DISCONNECT
//! ```

use crate::traits::{EventSocketError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Payload of the Engine.IO open packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl OpenPayload {
    /// Longest silence tolerated before the server is considered gone
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// A decoded packet, Engine.IO and Socket.IO levels flattened together
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenPayload),
    Close,
    Ping,
    Pong,
    Noop,
    /// Socket.IO CONNECT: auth payload from a client, `{sid}` ack from a server
    Connect(Option<Value>),
    ConnectError(String),
    Disconnect,
    Event { name: String, data: Value },
    Ack,
}

/// Decode one WebSocket text frame
pub fn decode(frame: &str) -> Result<Packet> {
    let (kind, body) = split_kind(frame)?;

    match kind {
        b'0' => Ok(Packet::Open(parse_json(body)?)),
        b'1' => Ok(Packet::Close),
        b'2' => Ok(Packet::Ping),
        b'3' => Ok(Packet::Pong),
        b'4' => decode_socket_packet(body),
        b'6' => Ok(Packet::Noop),
        other => Err(EventSocketError::Protocol(format!(
            "unsupported engine packet type '{}'",
            other as char
        ))),
    }
}

/// Encode a packet as a WebSocket text frame
pub fn encode(packet: &Packet) -> Result<String> {
    let frame = match packet {
        Packet::Open(open) => format!("0{}", to_json(open)?),
        Packet::Close => "1".to_string(),
        Packet::Ping => "2".to_string(),
        Packet::Pong => "3".to_string(),
        Packet::Noop => "6".to_string(),
        Packet::Connect(None) => "40".to_string(),
        Packet::Connect(Some(payload)) => format!("40{}", to_json(payload)?),
        Packet::Disconnect => "41".to_string(),
        Packet::Event { name, data } => format!("42{}", to_json(&json!([name, data]))?),
        Packet::ConnectError(message) => format!("44{}", to_json(&json!({ "message": message }))?),
        Packet::Ack => {
            return Err(EventSocketError::Protocol(
                "acknowledgements are not supported".into(),
            ))
        }
    };
    Ok(frame)
}

/// Turn a venue URL into the Engine.IO WebSocket endpoint
///
/// `https://venue.example.com` becomes
/// `wss://venue.example.com/socket.io/?EIO=4&transport=websocket`.
pub fn engine_url(url: &str) -> Result<String> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| EventSocketError::Configuration(format!("missing scheme in url: {url}")))?;

    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(EventSocketError::Configuration(format!(
                "unsupported url scheme: {other}"
            )))
        }
    };

    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (host, path) = match location.split_once('/') {
        Some((host, path)) => (host, path.trim_matches('/')),
        None => (location, ""),
    };
    if host.is_empty() {
        return Err(EventSocketError::Configuration(format!("missing host in url: {url}")));
    }
    let path = if path.is_empty() { "socket.io" } else { path };

    let query = match query.filter(|q| !q.is_empty()) {
        Some(existing) => format!("{existing}&EIO=4&transport=websocket"),
        None => "EIO=4&transport=websocket".to_string(),
    };

    Ok(format!("{scheme}://{host}/{path}/?{query}"))
}

fn decode_socket_packet(body: &str) -> Result<Packet> {
    let (kind, rest) = split_kind(body)?;
    let rest = strip_namespace(rest)?;

    match kind {
        b'0' if rest.is_empty() => Ok(Packet::Connect(None)),
        b'0' => Ok(Packet::Connect(Some(parse_json(rest)?))),
        b'1' => Ok(Packet::Disconnect),
        b'2' => decode_event(rest.trim_start_matches(|c: char| c.is_ascii_digit())),
        b'3' => Ok(Packet::Ack),
        b'4' => Ok(Packet::ConnectError(connect_error_message(rest))),
        b'5' | b'6' => Err(EventSocketError::Protocol(
            "binary packets are not supported".into(),
        )),
        other => Err(EventSocketError::Protocol(format!(
            "unsupported socket packet type '{}'",
            other as char
        ))),
    }
}

fn decode_event(body: &str) -> Result<Packet> {
    let args: Vec<Value> = parse_json(body)?;
    let mut args = args.into_iter();

    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => {
            return Err(EventSocketError::Protocol(
                "event packet without a name".into(),
            ))
        }
    };

    Ok(Packet::Event {
        name,
        data: args.next().unwrap_or(Value::Null),
    })
}

fn connect_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Ok(Value::String(message)) => message,
        _ => body.to_string(),
    }
}

/// Only the default namespace is spoken; `/,` prefixes are tolerated
fn strip_namespace(body: &str) -> Result<&str> {
    if !body.starts_with('/') {
        return Ok(body);
    }
    let (namespace, rest) = body.split_once(',').unwrap_or((body, ""));
    if namespace != "/" {
        return Err(EventSocketError::Protocol(format!(
            "unsupported namespace: {namespace}"
        )));
    }
    Ok(rest)
}

fn split_kind(frame: &str) -> Result<(u8, &str)> {
    match frame.as_bytes().first() {
        Some(kind) if kind.is_ascii_digit() => Ok((*kind, &frame[1..])),
        Some(_) => Err(EventSocketError::Protocol(format!("malformed frame: {frame}"))),
        None => Err(EventSocketError::Protocol("empty frame".into())),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| EventSocketError::Protocol(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| EventSocketError::Protocol(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_open_packet() {
        let packet = decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        match packet {
            Packet::Open(open) => {
                assert_eq!(open.sid, "abc");
                assert_eq!(open.liveness_window(), Duration::from_millis(45000));
            }
            other => panic!("expected open packet, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_event_with_ack_id() {
        let packet = decode(r#"4217["quote_request",{"request_id":"r1"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "quote_request".into(),
                data: json!({ "request_id": "r1" }),
            }
        );
    }

    #[test]
    fn test_decode_event_without_data() {
        let packet = decode(r#"42["heartbeat"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "heartbeat".into(),
                data: Value::Null,
            }
        );
    }

    #[test]
    fn test_decode_connect_ack_and_error() {
        assert!(matches!(decode(r#"40{"sid":"xyz"}"#).unwrap(), Packet::Connect(Some(_))));
        assert_eq!(decode("40").unwrap(), Packet::Connect(None));
        assert_eq!(
            decode(r#"44{"message":"invalid signature"}"#).unwrap(),
            Packet::ConnectError("invalid signature".into())
        );
    }

    #[test]
    fn test_decode_rejects_foreign_namespace() {
        assert!(decode(r#"42/admin,["quote_request",{}]"#).is_err());
        assert!(decode(r#"42/,["quote_request",{}]"#).is_ok());
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        assert!(decode("").is_err());
        assert!(decode("x").is_err());
        assert!(decode("42not json").is_err());
        assert!(decode("42[1,2]").is_err());
        assert!(decode("451-[\"bin\"]").is_err());
    }

    #[test]
    fn test_encode_event_and_connect() {
        let frame = encode(&Packet::Event {
            name: "quote_response".into(),
            data: json!({ "request_id": "r1" }),
        })
        .unwrap();
        assert_eq!(frame, r#"42["quote_response",{"request_id":"r1"}]"#);

        let frame = encode(&Packet::Connect(Some(json!({ "client_version": "1" })))).unwrap();
        assert_eq!(frame, r#"40{"client_version":"1"}"#);

        assert_eq!(encode(&Packet::Pong).unwrap(), "3");
        assert_eq!(encode(&Packet::Disconnect).unwrap(), "41");
    }

    #[test]
    fn test_engine_url() {
        assert_eq!(
            engine_url("http://localhost:8080").unwrap(),
            "ws://localhost:8080/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            engine_url("https://venue.example.com/").unwrap(),
            "wss://venue.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            engine_url("wss://venue.example.com/quoter?region=eu").unwrap(),
            "wss://venue.example.com/quoter/?region=eu&EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_engine_url_rejects_bad_input() {
        assert!(engine_url("localhost:8080").is_err());
        assert!(engine_url("ftp://localhost").is_err());
        assert!(engine_url("http:///path").is_err());
    }
}
