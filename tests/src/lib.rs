//! # SecureLink Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── device.rs         # Simulated device peer (HttpTransport)
//! ├── integration/      # Handshake, channel and lifecycle flows
//! └── exploits/         # Replay, tampering and interception attempts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sl-tests
//!
//! # By category
//! cargo test -p sl-tests integration::
//! cargo test -p sl-tests exploits::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod device;
pub mod exploits;
pub mod integration;

pub use device::{InterceptingTransport, SimulatedDevice};
