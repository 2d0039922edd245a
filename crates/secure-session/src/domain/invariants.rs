//! # Domain Invariants
//!
//! Protocol constants and rules that must always hold true.

use super::errors::SessionError;
use super::session::SessionState;

/// Handshake attempts before `initialize` gives up.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base of the linear backoff between attempts (ms).
pub const RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Per round-trip handshake deadline (ms).
pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000;

/// Liveness ping interval (ms).
pub const ACTIVITY_INTERVAL_MS: u64 = 30_000;

/// Random session identifier length in bytes (hex doubles it).
pub const SESSION_ID_LEN: usize = 16;

/// HKDF info label shared with the device.
pub const SESSION_KEY_INFO: &[u8] = b"SecureLayerV1";

/// Bytes of the correlation ID used as HKDF salt.
pub const SESSION_SALT_LEN: usize = 16;

/// Peer status value meaning success.
pub const STATUS_SUCCESS: &str = "success";

/// Delay before attempt `completed + 1`, after `completed` failures.
///
/// No delay follows the final attempt.
pub fn backoff_delay_ms(completed: u32, max_attempts: u32, base_ms: u64) -> Option<u64> {
    if completed == 0 || completed >= max_attempts {
        return None;
    }
    Some(base_ms.saturating_mul(u64::from(completed)))
}

/// HKDF salt: the first 16 bytes of the correlation ID, zero padded.
pub fn session_salt(correlation_id: &str) -> [u8; SESSION_SALT_LEN] {
    let mut salt = [0u8; SESSION_SALT_LEN];
    let bytes = correlation_id.as_bytes();
    let len = bytes.len().min(SESSION_SALT_LEN);
    salt[..len].copy_from_slice(&bytes[..len]);
    salt
}

/// Invariant: keys exist if and only if the session is established.
pub fn invariant_keys_match_established(state: &SessionState) -> bool {
    state.established == state.session_key.is_some()
}

/// Invariant: the next outbound counter strictly exceeds every one issued.
pub fn invariant_counter_advances(previous: u64, next: u64) -> Result<(), SessionError> {
    if next <= previous {
        return Err(SessionError::Replay {
            counter: next,
            last: Some(previous),
        });
    }
    Ok(())
}

/// Shorten an identifier for logs.
pub fn redact_id(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("{prefix}...")
}
