//! Session state shared by the handshake engine, channel and manager.

use crate::domain::{HandshakeState, ProtocolVariant, ReplayGuard};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_crypto::{EcdhPublicKey, SecretKey};
use std::sync::Arc;

/// Shared handle to one session.
///
/// Locks are held only for short synchronous sections, never across an
/// await point.
pub type SharedSession = Arc<RwLock<SessionState>>;

/// Secure session state.
///
/// Only the local public key is kept here; the private half lives and dies
/// inside the handshake attempt that generated it.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Injected client identifier (wrapped variant correlation).
    pub client_id: Option<String>,
    /// Random session identifier (unwrapped variant correlation).
    pub session_id: Option<String>,
    /// Variant that established the current key.
    pub variant: Option<ProtocolVariant>,
    /// Local ephemeral public key of the established exchange.
    pub local_public_key: Option<EcdhPublicKey>,
    /// Channel key.
    pub session_key: Option<SecretKey>,
    /// Last outbound counter stamped by `seal` (0 before the first frame).
    pub message_counter: u64,
    /// Inbound replay tracking.
    pub replay: ReplayGuard,
    /// True once a handshake has committed a key.
    pub established: bool,
    /// Last activity (unix ms).
    pub last_activity: Option<u64>,
    /// State of the latest handshake attempt.
    pub handshake: HandshakeState,
}

impl SessionState {
    /// Empty session bound to a client identifier.
    pub fn with_client_id(client_id: Option<String>) -> Self {
        Self {
            client_id,
            ..Default::default()
        }
    }

    /// Wrap in a shared handle.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    /// Identifier the peer knows this session by: the session ID when the
    /// unwrapped variant established it, else the client ID.
    pub fn correlation_id(&self) -> Option<&str> {
        match self.variant {
            Some(ProtocolVariant::Unwrapped) => self.session_id.as_deref(),
            _ => self.client_id.as_deref(),
        }
    }

    /// Drop all key material and counters. The client ID survives.
    pub fn reset(&mut self) {
        let client_id = self.client_id.take();
        let window = self.replay.clone();
        *self = Self::with_client_id(client_id);
        self.replay = window;
        self.replay.clear();
    }

    /// Redacted view.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            client_id: self.client_id.clone(),
            session_id: self.session_id.clone(),
            variant: self.variant,
            established: self.established,
            handshake: self.handshake,
            message_counter: self.message_counter,
            inbound_counter: self.replay.last_counter(),
            last_activity: self.last_activity,
            has_session_key: self.session_key.is_some(),
            local_public_key: self.local_public_key.map(|k| k.to_hex()),
        }
    }
}

/// Session view with secrets removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Client identifier.
    pub client_id: Option<String>,
    /// Session identifier.
    pub session_id: Option<String>,
    /// Established variant.
    pub variant: Option<ProtocolVariant>,
    /// Established flag.
    pub established: bool,
    /// Latest handshake state.
    pub handshake: HandshakeState,
    /// Outbound counter.
    pub message_counter: u64,
    /// Last accepted inbound counter.
    pub inbound_counter: Option<u64>,
    /// Last activity (unix ms).
    pub last_activity: Option<u64>,
    /// Whether a channel key is present.
    pub has_session_key: bool,
    /// Local public key hex.
    pub local_public_key: Option<String>,
}

/// User-interaction classes that count as activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEvent {
    /// Pointer click.
    Click,
    /// Key press.
    KeyDown,
    /// Pointer movement.
    MouseMove,
    /// Scroll.
    Scroll,
    /// Focus gained.
    Focus,
}

impl ActivityEvent {
    /// Every tracked class.
    pub const ALL: [ActivityEvent; 5] = [
        Self::Click,
        Self::KeyDown,
        Self::MouseMove,
        Self::Scroll,
        Self::Focus,
    ];
}
