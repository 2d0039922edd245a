//! # Key Schedule
//!
//! ```text
//! fingerprint ──JSON──→ SHA-256 ──base64──→ WrappingKey   (envelope password)
//! ECDH secret ──HKDF(salt = correlation id, "SecureLayerV1")──→ SessionKey
//! ```

use crate::domain::{
    session_salt, DeviceFingerprint, SessionError, SessionKeyDerivation, SESSION_KEY_INFO,
};
use shared_crypto::{sha256, to_base64, SecretKey, SharedSecret};
use zeroize::Zeroize;

/// Handshake wrapping key in its text form (base64 of a SHA-256 digest).
///
/// Used only as the envelope password. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct WrappingKey(String);

impl WrappingKey {
    /// Text form used as the envelope password.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for WrappingKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WrappingKey([HIDDEN])")
    }
}

/// Derive the wrapping key from a fingerprint.
///
/// # Errors
///
/// `KeyDerivation` if the fingerprint cannot be serialized.
pub fn derive_wrapping_key(fingerprint: &DeviceFingerprint) -> Result<WrappingKey, SessionError> {
    let canonical = fingerprint
        .to_canonical_json()
        .map_err(|e| SessionError::KeyDerivation(format!("fingerprint serialization: {e}")))?;
    let digest = sha256(canonical.as_bytes());
    Ok(WrappingKey(to_base64(&digest)))
}

/// Turn an ECDH secret into the channel key.
pub fn derive_session_key(
    shared: &SharedSecret,
    correlation_id: &str,
    policy: SessionKeyDerivation,
) -> Result<SecretKey, SessionError> {
    match policy {
        SessionKeyDerivation::Direct => Ok(shared.to_direct_key()),
        SessionKeyDerivation::Hkdf => shared
            .to_hkdf_key(&session_salt(correlation_id), SESSION_KEY_INFO)
            .map_err(|e| SessionError::from_crypto("session key", e)),
    }
}
