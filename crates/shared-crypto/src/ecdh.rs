//! # ECDH Key Agreement (P-256)
//!
//! Ephemeral NIST P-256 key pairs for the device handshake.
//!
//! ## Wire Format
//!
//! Public keys travel as the 65-byte uncompressed SEC1 point
//! (`0x04 || X || Y`), rendered as 130 lowercase hex characters. This is
//! the WebCrypto `raw` export format.
//!
//! ## Shared Secret
//!
//! The agreed secret is the 32-byte X coordinate of the shared point, the
//! same bits WebCrypto `deriveBits(..., 256)` returns.

use crate::encoding::{from_hex, to_hex};
use crate::hashing::hkdf_sha256;
use crate::symmetric::SecretKey;
use crate::CryptoError;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// Length of an uncompressed SEC1 P-256 point.
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// P-256 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcdhPublicKey(PublicKey);

impl EcdhPublicKey {
    /// Import from SEC1 bytes. Accepts only the uncompressed form.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != UNCOMPRESSED_POINT_LEN || bytes[0] != 0x04 {
            return Err(CryptoError::InvalidPublicKey);
        }
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Import from the hex transport encoding.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = from_hex(text.trim()).map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Uncompressed SEC1 bytes (65).
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Lowercase hex of the uncompressed point (130 chars).
    pub fn to_hex(&self) -> String {
        to_hex(&self.to_sec1_bytes())
    }
}

/// Ephemeral P-256 key pair. The private half never leaves this struct.
pub struct EcdhKeyPair {
    secret: EphemeralSecret,
    public: EcdhPublicKey,
}

impl EcdhKeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = EcdhPublicKey(secret.public_key());
        Self { secret, public }
    }

    /// Public half.
    pub fn public_key(&self) -> EcdhPublicKey {
        self.public
    }

    /// ECDH against a peer public key.
    pub fn diffie_hellman(&self, peer: &EcdhPublicKey) -> SharedSecret {
        let shared = self.secret.diffie_hellman(&peer.0);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(shared.raw_secret_bytes().as_slice());
        SharedSecret(bytes)
    }
}

impl std::fmt::Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdhKeyPair")
            .field("public", &self.public.to_hex())
            .finish_non_exhaustive()
    }
}

/// Raw 256-bit ECDH output.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Use the raw secret directly as an AES-256 key.
    pub fn to_direct_key(&self) -> SecretKey {
        SecretKey::from_bytes(self.0)
    }

    /// Expand into an AES-256 key with HKDF-SHA256.
    pub fn to_hkdf_key(&self, salt: &[u8], info: &[u8]) -> Result<SecretKey, CryptoError> {
        let mut okm = hkdf_sha256(salt, &self.0, info)?;
        let key = SecretKey::from_bytes(okm);
        okm.zeroize();
        Ok(key)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}
