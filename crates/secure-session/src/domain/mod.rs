//! # Domain Module
//!
//! Core domain types for the secure session subsystem.

pub mod errors;
pub mod fingerprint;
pub mod frame;
pub mod handshake;
pub mod invariants;
pub mod replay;
pub mod session;

pub use errors::*;
pub use fingerprint::*;
pub use frame::*;
pub use handshake::*;
pub use invariants::*;
pub use replay::*;
pub use session::*;
