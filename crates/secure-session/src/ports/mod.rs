//! # Ports Module
//!
//! Hexagonal architecture ports for the secure session subsystem.
//!
//! - **Inbound (Driving):** `SecureSessionApi` - what callers use
//! - **Outbound (Driven):** `HttpTransport`, `FingerprintProvider`, `TimeSource`

pub mod inbound;
pub mod outbound;

pub use inbound::SecureSessionApi;
pub use outbound::{
    FingerprintProvider, HttpRequest, HttpResponse, HttpTransport, Method, MockHandler,
    MockTimeSource, MockTransport, TimeSource,
};
