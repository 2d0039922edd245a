//! # Handshake Engine
//!
//! Runs one ECDH key exchange attempt in either variant.
//!
//! ```text
//! Wrapped:   fingerprint → wrapping key → envelope(pubkey) ──POST──→ envelope(peer) → ECDH
//! Unwrapped: session id ──────────────────────── pubkey ────POST──→ peer pubkey ─────→ ECDH
//! ```
//!
//! Key material is committed to the session only when the attempt reaches
//! `ESTABLISHED`. A failed attempt touches nothing but the handshake state.

use crate::algorithms::{
    derive_session_key, derive_wrapping_key, generate_session_id, require_success,
    KeyExchangeRequest, KeyExchangeResponse, ProtectedHandshakeRequest,
    ProtectedHandshakeResponse, WrappingKey,
};
use crate::config::SessionConfig;
use crate::domain::{
    redact_id, HandshakeAttempt, HandshakeState, ProtocolVariant, ReplayGuard, SessionError,
    SharedSession,
};
use crate::ports::{FingerprintProvider, HttpRequest, HttpResponse, HttpTransport, TimeSource};
use shared_crypto::{EcdhKeyPair, EcdhPublicKey, EnvelopeCodec, SecretKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful exchange, not yet visible to the channel.
struct Negotiated {
    variant: ProtocolVariant,
    session_id: Option<String>,
    local_public_key: EcdhPublicKey,
    session_key: SecretKey,
}

/// Handshake engine - one attempt per `perform` call.
pub struct HandshakeEngine<T: HttpTransport, F: FingerprintProvider> {
    transport: Arc<T>,
    fingerprint: Arc<F>,
    config: Arc<SessionConfig>,
    codec: EnvelopeCodec,
    time: Arc<dyn TimeSource>,
}

impl<T: HttpTransport, F: FingerprintProvider> HandshakeEngine<T, F> {
    /// Create an engine.
    pub fn new(
        transport: Arc<T>,
        fingerprint: Arc<F>,
        config: Arc<SessionConfig>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let codec = EnvelopeCodec::new(config.pbkdf2_iterations);
        Self {
            transport,
            fingerprint,
            config,
            codec,
            time,
        }
    }

    /// Run attempt `attempt_no` (1-based) of the configured variant.
    ///
    /// # Errors
    ///
    /// Any failure of the attempt. The session's keys, counters and
    /// established flag are left as they were; only `handshake` becomes
    /// `Failed`.
    pub async fn perform(&self, session: &SharedSession, attempt_no: u32) -> Result<(), SessionError> {
        let variant = self.config.variant;
        let mut attempt = HandshakeAttempt::new(variant, attempt_no);
        session.write().handshake = attempt.state();

        let outcome = match variant {
            ProtocolVariant::Wrapped => self.run_wrapped(session, &mut attempt).await,
            ProtocolVariant::Unwrapped => self.run_unwrapped(session, &mut attempt).await,
        };

        match outcome {
            Ok(negotiated) => {
                attempt.advance(HandshakeState::Established);
                self.commit(session, negotiated, attempt.state());
                info!(
                    %variant,
                    attempt = attempt_no,
                    "[secure-session] secure session established"
                );
                Ok(())
            }
            Err(e) => {
                attempt.fail();
                session.write().handshake = attempt.state();
                warn!(
                    %variant,
                    attempt = attempt_no,
                    "[secure-session] handshake failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn run_wrapped(
        &self,
        session: &SharedSession,
        attempt: &mut HandshakeAttempt,
    ) -> Result<Negotiated, SessionError> {
        let client_id = session
            .read()
            .client_id
            .clone()
            .ok_or(SessionError::MissingClientId)?;

        let wrapping_key = derive_wrapping_key(&self.fingerprint.collect())?;
        let key_pair = EcdhKeyPair::generate();
        self.step(session, attempt, HandshakeState::KeyMaterialReady);

        let local_public_key = key_pair.public_key();
        let encrypted_pubkey = self
            .seal_envelope(local_public_key.to_hex(), &wrapping_key)
            .await?;
        let request = HttpRequest::post(self.config.protected_handshake_path.as_str())
            .with_header("X-Client-ID", client_id.as_str())
            .with_json(&ProtectedHandshakeRequest {
                client_id: client_id.clone(),
                encrypted_pubkey,
            })?;

        self.step(session, attempt, HandshakeState::RequestSent);
        debug!(
            client = %redact_id(&client_id),
            "[secure-session] sending protected handshake"
        );
        let response: ProtectedHandshakeResponse = self.round_trip(request).await?.parse_json()?;
        let sealed_peer =
            require_success(&response.status, response.encrypted_pubkey, response.message)?;

        let peer_hex = self.open_envelope(sealed_peer, &wrapping_key).await?;
        let peer = EcdhPublicKey::from_hex(peer_hex.trim())
            .map_err(|e| SessionError::from_crypto("peer public key", e))?;

        let shared = key_pair.diffie_hellman(&peer);
        let session_key =
            derive_session_key(&shared, &client_id, self.config.session_key_derivation)?;

        Ok(Negotiated {
            variant: ProtocolVariant::Wrapped,
            session_id: None,
            local_public_key,
            session_key,
        })
    }

    async fn run_unwrapped(
        &self,
        session: &SharedSession,
        attempt: &mut HandshakeAttempt,
    ) -> Result<Negotiated, SessionError> {
        let session_id = generate_session_id();
        let key_pair = EcdhKeyPair::generate();
        self.step(session, attempt, HandshakeState::KeyMaterialReady);

        let local_public_key = key_pair.public_key();
        let request = HttpRequest::post(self.config.key_exchange_path.as_str())
            .with_header("X-Session-ID", session_id.as_str())
            .with_json(&KeyExchangeRequest::new(
                local_public_key.to_hex(),
                session_id.clone(),
            ))?;

        self.step(session, attempt, HandshakeState::RequestSent);
        debug!(
            session = %redact_id(&session_id),
            "[secure-session] sending key exchange"
        );
        let response: KeyExchangeResponse = self.round_trip(request).await?.parse_json()?;
        let peer_hex = require_success(&response.status, response.pubkey, response.message)?;
        let peer = EcdhPublicKey::from_hex(peer_hex.trim())
            .map_err(|e| SessionError::from_crypto("peer public key", e))?;

        let shared = key_pair.diffie_hellman(&peer);
        let session_key =
            derive_session_key(&shared, &session_id, self.config.session_key_derivation)?;

        Ok(Negotiated {
            variant: ProtocolVariant::Unwrapped,
            session_id: Some(session_id),
            local_public_key,
            session_key,
        })
    }

    fn step(&self, session: &SharedSession, attempt: &mut HandshakeAttempt, next: HandshakeState) {
        attempt.advance(next);
        session.write().handshake = attempt.state();
    }

    /// One bounded round trip; non-2xx is a transport failure.
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, SessionError> {
        let timeout_ms = self.config.handshake_timeout_ms;
        let response = tokio::time::timeout(
            self.config.handshake_timeout(),
            self.transport.send(request),
        )
        .await
        .map_err(|_| SessionError::Timeout(timeout_ms))??;
        Ok(response.error_for_status()?)
    }

    /// PBKDF2 is CPU bound, so envelope work runs on the blocking pool.
    async fn seal_envelope(
        &self,
        plaintext: String,
        wrapping_key: &WrappingKey,
    ) -> Result<String, SessionError> {
        let codec = self.codec;
        let password = wrapping_key.clone();
        tokio::task::spawn_blocking(move || codec.encrypt(plaintext.as_bytes(), password.as_str()))
            .await
            .map_err(|e| SessionError::KeyDerivation(format!("envelope task: {e}")))?
            .map_err(|e| SessionError::from_crypto("envelope encrypt", e))
    }

    async fn open_envelope(
        &self,
        blob: String,
        wrapping_key: &WrappingKey,
    ) -> Result<String, SessionError> {
        let codec = self.codec;
        let password = wrapping_key.clone();
        let plaintext = tokio::task::spawn_blocking(move || codec.decrypt(&blob, password.as_str()))
            .await
            .map_err(|e| SessionError::KeyDerivation(format!("envelope task: {e}")))?
            .map_err(|e| SessionError::from_crypto("peer envelope", e))?;
        String::from_utf8(plaintext)
            .map_err(|e| SessionError::KeyDerivation(format!("peer envelope: {e}")))
    }

    fn commit(&self, session: &SharedSession, negotiated: Negotiated, handshake: HandshakeState) {
        let now = self.time.now_millis();
        let mut state = session.write();
        state.variant = Some(negotiated.variant);
        state.session_id = negotiated.session_id;
        state.local_public_key = Some(negotiated.local_public_key);
        state.session_key = Some(negotiated.session_key);
        state.message_counter = 0;
        state.replay = ReplayGuard::new(self.config.replay_window_ms);
        state.established = true;
        state.last_activity = Some(now);
        state.handshake = handshake;
    }
}
