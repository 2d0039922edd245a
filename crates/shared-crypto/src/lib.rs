//! # Shared Crypto - SecureLink Primitives
//!
//! **Status:** Production
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-GCM | Session frames, envelope payloads |
//! | `envelope` | PBKDF2-HMAC-SHA256 + AES-256-GCM | Wrapping handshake public keys |
//! | `ecdh` | NIST P-256 | Ephemeral key agreement |
//! | `hashing` | SHA-256, HKDF-SHA256 | Wrapping keys, session-key expansion |
//! | `encoding` | hex, base64 | Wire representations |
//!
//! ## Security Properties
//!
//! - **AES-GCM**: random 96-bit nonce per message, 128-bit tag
//! - **Envelope**: fresh 128-bit salt per call, 10 000 PBKDF2 rounds by default
//! - **Secrets**: zeroized on drop, redacted in `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdh;
pub mod encoding;
pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdh::{EcdhKeyPair, EcdhPublicKey, SharedSecret, UNCOMPRESSED_POINT_LEN};
pub use encoding::{from_base64, from_hex, to_base64, to_hex};
pub use envelope::{Envelope, EnvelopeCodec, DEFAULT_PBKDF2_ITERATIONS, SALT_LEN};
pub use errors::CryptoError;
pub use hashing::{hkdf_sha256, sha256, sha256_many, Hash, Sha256Hasher};
pub use symmetric::{decrypt, encrypt, encrypt_with_nonce, Nonce, SecretKey, NONCE_LEN, TAG_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
