//! # Algorithms
//!
//! Pure protocol logic: key schedule, wire codec, routing.

pub mod key_schedule;
pub mod routing;
pub mod wire;

pub use key_schedule::{derive_session_key, derive_wrapping_key, WrappingKey};
pub use routing::{default_secure_endpoints, should_secure, DEFAULT_SECURE_ENDPOINTS};
pub use wire::{
    generate_session_id, require_success, KeyExchangeRequest, KeyExchangeResponse,
    ProtectedHandshakeRequest, ProtectedHandshakeResponse, ServerHello, KEY_EXCHANGE_TYPE,
};
