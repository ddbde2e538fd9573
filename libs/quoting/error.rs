use eventsocket::EventSocketError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the quoting client
#[derive(Error, Debug)]
pub enum QuotingError {
    /// Unusable key material; raised before any connection attempt
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Handshake not completed within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("Handshake rejected by venue: {0}")]
    HandshakeRejected(String),

    /// Malformed quote request; only that message is dropped
    #[error("Failed to decode quote request: {0}")]
    Decode(String),

    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Pricing callback failures, isolated to a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("Pricing failed for request {request_id}: {message}")]
    Failed { request_id: String, message: String },

    #[error("Request {request_id} has {expected} legs but {actual} were quoted")]
    LegCountMismatch {
        request_id: String,
        expected: usize,
        actual: usize,
    },
}

impl From<EventSocketError> for QuotingError {
    fn from(error: EventSocketError) -> Self {
        match error {
            EventSocketError::HandshakeTimeout(limit) => QuotingError::HandshakeTimeout(limit),
            EventSocketError::HandshakeRejected(reason) => QuotingError::HandshakeRejected(reason),
            EventSocketError::InvalidState(message) => QuotingError::InvalidState(message),
            other => QuotingError::Transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuotingError>;
