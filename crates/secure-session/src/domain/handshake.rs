//! # Handshake State Machine
//!
//! ```text
//! Init ──→ KeyMaterialReady ──→ RequestSent ──→ Established
//!   │              │                  │
//!   └──────────────┴──────────────────┴────────→ Failed
//! ```
//!
//! `Established` and `Failed` are terminal for one attempt. Only the
//! lifecycle manager starts a new attempt from `Init`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handshake protocol variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVariant {
    /// Public keys wrapped in a fingerprint-keyed envelope, correlated by the
    /// injected client ID.
    #[default]
    Wrapped,
    /// Raw public keys, correlated by a random session ID.
    Unwrapped,
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrapped => write!(f, "wrapped"),
            Self::Unwrapped => write!(f, "unwrapped"),
        }
    }
}

/// How the channel key is obtained from the ECDH output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKeyDerivation {
    /// HKDF-SHA256 with the correlation ID as salt (device firmware).
    #[default]
    Hkdf,
    /// Raw 256-bit shared secret as the AES key.
    Direct,
}

/// Handshake attempt state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
    /// Nothing derived yet.
    #[default]
    Init,
    /// Wrapping key and key pair exist.
    KeyMaterialReady,
    /// Request in flight.
    RequestSent,
    /// Session key committed.
    Established,
    /// Attempt aborted.
    Failed,
}

impl HandshakeState {
    /// Terminal for the current attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Established | Self::Failed)
    }

    /// Whether `next` is a legal successor.
    pub fn can_transition_to(&self, next: HandshakeState) -> bool {
        use HandshakeState::*;
        matches!(
            (self, next),
            (Init, KeyMaterialReady)
                | (KeyMaterialReady, RequestSent)
                | (RequestSent, Established)
                | (Init | KeyMaterialReady | RequestSent, Failed)
        )
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::KeyMaterialReady => "KEY_MATERIAL_READY",
            Self::RequestSent => "REQUEST_SENT",
            Self::Established => "ESTABLISHED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Tracks one attempt's progress and the path it took.
#[derive(Clone, Debug)]
pub struct HandshakeAttempt {
    variant: ProtocolVariant,
    number: u32,
    state: HandshakeState,
    history: Vec<HandshakeState>,
}

impl HandshakeAttempt {
    /// Start attempt `number` (1-based) in `Init`.
    pub fn new(variant: ProtocolVariant, number: u32) -> Self {
        Self {
            variant,
            number,
            state: HandshakeState::Init,
            history: vec![HandshakeState::Init],
        }
    }

    /// Advance; illegal transitions are ignored and reported as `false`.
    pub fn advance(&mut self, next: HandshakeState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                "[secure-session] illegal handshake transition {} -> {}",
                self.state,
                next
            );
            return false;
        }
        tracing::debug!(
            variant = %self.variant,
            attempt = self.number,
            "[secure-session] handshake {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
        true
    }

    /// Move to `Failed` from any non-terminal state.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.advance(HandshakeState::Failed);
        }
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Variant in use.
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// 1-based attempt number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Every state visited, starting with `Init`.
    pub fn history(&self) -> &[HandshakeState] {
        &self.history
    }
}
