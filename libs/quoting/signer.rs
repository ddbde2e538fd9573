//! Handshake signatures
//!
//! The venue authenticates a market maker by an Ed25519 signature over
//! `account_id` immediately followed by the decimal millisecond
//! timestamp, base64 encoded.

use crate::error::{QuotingError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};

const ENCRYPTED_PEM_LABEL: &str = "BEGIN ENCRYPTED PRIVATE KEY";

/// Parsed signing key for one market maker account
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Parse a PKCS#8 PEM Ed25519 key
    ///
    /// Encrypted keys (`ENCRYPTED PRIVATE KEY`) need `password`; plain
    /// keys must come without one.
    pub fn from_pem(pem: &[u8], password: Option<&[u8]>) -> Result<Self> {
        let pem = std::str::from_utf8(pem)
            .map_err(|_| QuotingError::Credential("private key is not valid PEM text".into()))?;
        let encrypted = pem.contains(ENCRYPTED_PEM_LABEL);

        let key = match (encrypted, password) {
            (true, Some(password)) => SigningKey::from_pkcs8_encrypted_pem(pem, password)
                .map_err(|e| {
                    QuotingError::Credential(format!("cannot decrypt private key: {}", e))
                })?,
            (true, None) => {
                return Err(QuotingError::Credential(
                    "private key is encrypted but no password was given".into(),
                ))
            }
            (false, Some(_)) => {
                return Err(QuotingError::Credential(
                    "password given for an unencrypted private key".into(),
                ))
            }
            (false, None) => SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| QuotingError::Credential(format!("malformed private key: {}", e)))?,
        };

        Ok(Self { key })
    }

    /// Sign `account_id ++ timestamp_ms`
    pub fn sign(&self, account_id: &str, timestamp_ms: i64) -> String {
        let message = signing_message(account_id, timestamp_ms);
        STANDARD.encode(self.key.sign(&message).to_bytes())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

/// Bytes covered by the handshake signature
pub fn signing_message(account_id: &str, timestamp_ms: i64) -> Vec<u8> {
    format!("{}{}", account_id, timestamp_ms).into_bytes()
}

/// Milliseconds since the Unix epoch, read at call time
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
