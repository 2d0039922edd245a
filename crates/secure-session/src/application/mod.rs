//! # Application Module
//!
//! Services orchestrating the domain and outbound ports.

pub mod channel;
pub mod handshake;
pub mod manager;

#[cfg(test)]
pub(crate) mod test_support;

pub use channel::SecureChannel;
pub use handshake::HandshakeEngine;
pub use manager::SessionManager;
