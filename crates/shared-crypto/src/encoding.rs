//! Text encodings for key material on the wire.

use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex (either case).
pub fn from_hex(text: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(text).map_err(|e| CryptoError::InvalidEncoding(format!("hex: {e}")))
}

/// Standard padded base64, the alphabet produced by browser `btoa`.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
pub fn from_base64(text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::InvalidEncoding(format!("base64: {e}")))
}
