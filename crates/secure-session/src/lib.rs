//! # Secure Session
//!
//! Authenticated, encrypted channel between a client and an embedded device.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Bind handshake key material to the device fingerprint of the day
//! - Agree on a session key with ephemeral P-256 ECDH
//! - Frame application traffic with AES-256-GCM and monotonic counters
//! - Keep the session alive and retry failed handshakes
//!
//! ## Protocol Variants
//!
//! | Variant | Correlation | Public keys | Endpoint |
//! |---------|-------------|-------------|----------|
//! | Wrapped | injected client ID | PBKDF2 + AES-GCM envelope | `/secure/protected-handshake` |
//! | Unwrapped | random session ID | raw hex | `/api/secure/keyexchange` |
//!
//! ## Security Notes
//!
//! | Property | Behavior |
//! |----------|----------|
//! | Fallback | Requests go out in plaintext until a key is established |
//! | Replay | Inbound counters must increase; nonces are tracked per window |
//! | Tamper | Tag failure rejects the message, the session survives |
//! | Server identity | Only possession of the wrapping key (wrapped variant) |
//!
//! ## Module Structure
//!
//! ```text
//! secure-session/
//! ├── domain/          # Fingerprint, session state, frame, handshake FSM, replay, errors
//! ├── algorithms/      # Key schedule, handshake wire codec, routing allow-list
//! ├── ports/           # SecureSessionApi (inbound) + transport/fingerprint/time (outbound)
//! ├── application/     # HandshakeEngine, SecureChannel, SessionManager
//! ├── adapters/        # reqwest transport, host fingerprint, system clock
//! └── config.rs        # SessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    HostFingerprintProvider, HostSignals, ReqwestTransport, StaticFingerprintProvider,
    SystemTimeSource,
};
pub use algorithms::{
    default_secure_endpoints, derive_session_key, derive_wrapping_key, should_secure,
    ServerHello, WrappingKey, DEFAULT_SECURE_ENDPOINTS,
};
pub use application::{HandshakeEngine, SecureChannel, SessionManager};
pub use config::SessionConfig;
pub use domain::{
    ActivityEvent, DeviceFingerprint, FontSignal, GraphicsSignal, HandshakeState,
    ProtocolVariant, SecureFrame, SessionError, SessionKeyDerivation, SessionSnapshot,
    SessionState, SharedSession, TransportError, ACTIVITY_INTERVAL_MS, HANDSHAKE_TIMEOUT_MS,
    MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY_MS,
};
pub use ports::{
    FingerprintProvider, HttpRequest, HttpResponse, HttpTransport, Method, MockTimeSource,
    MockTransport, SecureSessionApi, TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
