//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - `ReqwestTransport`: HTTP to the device
//! - `HostFingerprintProvider` / `StaticFingerprintProvider`: fingerprint sources
//! - `SystemTimeSource`: wall clock

pub mod fingerprint;
pub mod http;
pub mod time;

pub use fingerprint::{HostFingerprintProvider, HostSignals, StaticFingerprintProvider};
pub use http::ReqwestTransport;
pub use time::SystemTimeSource;
