//! # Handshake Wire Codec
//!
//! JSON bodies of the two key-exchange variants and the capability probe.
//!
//! | Variant | Request | Response |
//! |---------|---------|----------|
//! | Wrapped | `{client_id, encrypted_pubkey}` | `{status, encrypted_pubkey, message?}` |
//! | Unwrapped | `{type:"keyexchange", pubkey, session_id}` | `{status, pubkey, message?}` |

use crate::domain::{SessionError, SESSION_ID_LEN, STATUS_SUCCESS};
use serde::{Deserialize, Serialize};

/// Unwrapped request type tag.
pub const KEY_EXCHANGE_TYPE: &str = "keyexchange";

/// Wrapped-variant request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHandshakeRequest {
    /// Injected client ID.
    pub client_id: String,
    /// Envelope of the client public key hex.
    pub encrypted_pubkey: String,
}

/// Wrapped-variant response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHandshakeResponse {
    /// `"success"` or an error status.
    pub status: String,
    /// Envelope of the peer public key hex.
    #[serde(default)]
    pub encrypted_pubkey: Option<String>,
    /// Error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Unwrapped-variant request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExchangeRequest {
    /// Always `"keyexchange"`.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Client public key hex.
    pub pubkey: String,
    /// Random correlation ID.
    pub session_id: String,
}

impl KeyExchangeRequest {
    /// Build a request.
    pub fn new(pubkey: String, session_id: String) -> Self {
        Self {
            message_type: KEY_EXCHANGE_TYPE.to_string(),
            pubkey,
            session_id,
        }
    }
}

/// Unwrapped-variant response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExchangeResponse {
    /// `"success"` or an error status.
    pub status: String,
    /// Peer public key hex.
    #[serde(default)]
    pub pubkey: Option<String>,
    /// Error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Capability probe response from `/api/secure/hello`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHello {
    /// `"ready"` when the device accepts handshakes.
    pub status: String,
    /// Protocol version string.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Channel cipher.
    #[serde(default)]
    pub encryption: Option<String>,
    /// Key agreement.
    #[serde(default)]
    pub key_exchange: Option<String>,
    /// Free-form server tag.
    #[serde(default)]
    pub server_info: Option<String>,
}

impl ServerHello {
    /// Device reports ready.
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

/// Require `"success"` and extract the peer key field.
pub fn require_success(
    status: &str,
    key: Option<String>,
    message: Option<String>,
) -> Result<String, SessionError> {
    if status != STATUS_SUCCESS {
        return Err(SessionError::ProtocolStatus(
            message.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    key.filter(|k| !k.is_empty())
        .ok_or_else(|| SessionError::Serialization("peer key missing from response".to_string()))
}

/// Fresh random session ID (16 bytes, lowercase hex).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}
