//! # Domain Errors
//!
//! Error types for the secure session subsystem.
//!
//! Every failure inside a handshake attempt is one of these; the lifecycle
//! manager folds them into a boolean outcome so none cross its boundary.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Failures of the outbound HTTP port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Round trip exceeded its deadline.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Could not reach the peer.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Peer answered with a non-2xx status.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Response body could not be read.
    #[error("Failed to read body: {0}")]
    Body(String),
}

/// Secure session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No client identifier was injected before initialization.
    #[error("Client ID not configured")]
    MissingClientId,

    /// Fingerprint serialization, PBKDF2, HKDF or key import failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Network error or non-2xx response.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Peer reported a non-success status.
    #[error("Peer rejected request: {0}")]
    ProtocolStatus(String),

    /// AEAD tag mismatch, on a handshake envelope or a channel frame.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Inbound frame counter or nonce already seen.
    #[error("Replayed frame rejected: counter {counter} (last accepted {last:?})")]
    Replay {
        /// Counter carried by the rejected frame
        counter: u64,
        /// Last counter accepted on this session
        last: Option<u64>,
    },

    /// Channel operation requires an established session key.
    #[error("Secure session not established")]
    NotEstablished,

    /// Frame fields are not the expected shape.
    #[error("Malformed secure frame: {0}")]
    MalformedFrame(String),

    /// JSON encode/decode failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Handshake round trip exceeded the configured timeout.
    #[error("Handshake timed out after {0} ms")]
    Timeout(u64),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Map a crypto failure: tag and length rejections become
    /// `Authentication`, everything else `KeyDerivation`.
    pub fn from_crypto(context: &str, err: CryptoError) -> Self {
        if err.is_authentication() {
            Self::Authentication(format!("{context}: {err}"))
        } else {
            Self::KeyDerivation(format!("{context}: {err}"))
        }
    }

    /// True for failures the lifecycle manager retries.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingClientId | Self::Config(_))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
