//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// AEAD tag check failed (wrong key, tampered data or tampered nonce)
    #[error("Authentication failed: ciphertext or key material rejected")]
    AuthenticationFailed,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// Envelope shorter than salt + nonce + tag
    #[error("Envelope too short: need at least {minimum} bytes, got {actual}")]
    EnvelopeTooShort {
        /// Minimum envelope length in bytes
        minimum: usize,
        /// Actual envelope length in bytes
        actual: usize,
    },

    /// Public key is not a valid point on the curve
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Text encoding (hex or base64) could not be decoded
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

impl CryptoError {
    /// True when ciphertext was rejected: a failed tag check or a blob whose
    /// lengths cannot be authentic.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::EnvelopeTooShort { .. }
        )
    }
}
