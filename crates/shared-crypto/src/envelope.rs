//! # Password-Based Envelope
//!
//! Self-contained authenticated encryption keyed by a text password.
//!
//! ```text
//! key  = PBKDF2-HMAC-SHA256(password, salt, iterations, 32)
//! blob = salt (16) || nonce (12) || AES-256-GCM(key, nonce, plaintext) || tag (16)
//! wire = base64(blob)
//! ```
//!
//! Salt and nonce are fresh per call, so two envelopes of the same plaintext
//! under the same password never share a derived key or nonce. The KDF cost
//! is paid on every call; callers on an async runtime should run the codec
//! on a blocking thread.

use crate::encoding::{from_base64, to_base64};
use crate::symmetric::{self, Nonce, SecretKey, KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::CryptoError;
use sha2::Sha256;
use zeroize::Zeroize;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Default PBKDF2 iteration count shared with the device firmware.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 10_000;
/// Smallest well-formed envelope: salt, nonce and an empty plaintext's tag.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Decoded envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Random KDF salt.
    pub salt: [u8; SALT_LEN],
    /// Random AEAD nonce.
    pub nonce: Nonce,
    /// Ciphertext with the GCM tag appended.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize as salt || nonce || ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a blob by fixed offsets.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CryptoError> {
        if blob.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::EnvelopeTooShort {
                minimum: MIN_ENVELOPE_LEN,
                actual: blob.len(),
            });
        }
        let (salt, rest) = blob.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let mut salt_arr = [0u8; SALT_LEN];
        salt_arr.copy_from_slice(salt);

        Ok(Self {
            salt: salt_arr,
            nonce: Nonce::from_slice(nonce)?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Base64 text form.
    pub fn encode(&self) -> String {
        to_base64(&self.to_bytes())
    }

    /// Parse the base64 text form.
    pub fn decode(text: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&from_base64(text)?)
    }
}

/// PBKDF2 + AES-256-GCM envelope codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvelopeCodec {
    iterations: u32,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl EnvelopeCodec {
    /// Codec with a custom iteration count. Both ends must agree on it.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Configured PBKDF2 iterations.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive the envelope key for `password` and `salt`.
    pub fn derive_key(&self, password: &str, salt: &[u8]) -> Result<SecretKey, CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::KeyDerivationFailed(
                "iteration count must be non-zero".to_string(),
            ));
        }
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key);
        let secret = SecretKey::from_bytes(key);
        key.zeroize();
        Ok(secret)
    }

    /// Encrypt into a structured envelope.
    pub fn seal(&self, plaintext: &[u8], password: &str) -> Result<Envelope, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);

        let key = self.derive_key(password, &salt)?;
        let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext)?;

        Ok(Envelope {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt a structured envelope.
    pub fn open(&self, envelope: &Envelope, password: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self.derive_key(password, &envelope.salt)?;
        symmetric::decrypt(&key, &envelope.ciphertext, &envelope.nonce)
    }

    /// Encrypt and return the base64 wire blob.
    pub fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<String, CryptoError> {
        Ok(self.seal(plaintext, password)?.encode())
    }

    /// Decode and decrypt a base64 wire blob.
    ///
    /// # Errors
    ///
    /// - `EnvelopeTooShort` if the blob cannot hold salt, nonce and tag
    /// - `AuthenticationFailed` if the tag does not verify
    /// - `InvalidEncoding` if the text is not base64
    pub fn decrypt(&self, blob: &str, password: &str) -> Result<Vec<u8>, CryptoError> {
        let envelope = Envelope::decode(blob)?;
        self.open(&envelope, password)
    }
}
