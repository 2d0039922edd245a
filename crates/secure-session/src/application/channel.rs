//! # Secure Channel
//!
//! Per-message AES-256-GCM framing over an established session key.
//!
//! ## Fallback
//!
//! Without a session key, `dispatch` forwards requests unchanged. This
//! keeps the device usable before the handshake completes at the cost of
//! confidentiality, and is logged at `warn` every time it happens.
//!
//! ## Inbound Frames
//!
//! `open` rejects counters that do not exceed the last accepted one and
//! nonces already seen in the replay window. Rejections and tag failures
//! fail only that message; the session stays established.

use crate::algorithms::should_secure;
use crate::domain::{
    invariant_counter_advances, SecureFrame, SessionError, SessionState, SharedSession,
    SECURE_FRAME_TYPE,
};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, TimeSource};
use shared_crypto::{decrypt, encrypt, from_hex, to_hex, Nonce, SecretKey};
use std::sync::Arc;
use tracing::{debug, warn};

/// Seal/open and request dispatch for one session.
pub struct SecureChannel<T: HttpTransport> {
    session: SharedSession,
    transport: Arc<T>,
    time: Arc<dyn TimeSource>,
}

impl<T: HttpTransport> SecureChannel<T> {
    /// Create a channel over `session`.
    pub fn new(session: SharedSession, transport: Arc<T>, time: Arc<dyn TimeSource>) -> Self {
        Self {
            session,
            transport,
            time,
        }
    }

    /// Whether a session key is available.
    pub fn is_established(&self) -> bool {
        let state = self.session.read();
        state.established && state.session_key.is_some()
    }

    fn key(state: &SessionState) -> Result<&SecretKey, SessionError> {
        match (&state.session_key, state.established) {
            (Some(key), true) => Ok(key),
            _ => Err(SessionError::NotEstablished),
        }
    }

    /// Encrypt `plaintext` into a frame stamped with the next counter.
    ///
    /// # Errors
    ///
    /// - `NotEstablished` without a session key
    /// - `Replay` if the outbound counter cannot advance
    pub fn seal(&self, plaintext: &str) -> Result<SecureFrame, SessionError> {
        let now = self.time.now_millis();
        let mut state = self.session.write();

        let next = state.message_counter.saturating_add(1);
        invariant_counter_advances(state.message_counter, next)?;

        let (ciphertext, nonce) = {
            let key = Self::key(&state)?;
            encrypt(key, plaintext.as_bytes()).map_err(|e| SessionError::from_crypto("seal", e))?
        };

        state.message_counter = next;
        state.last_activity = Some(now);

        Ok(SecureFrame::new(
            next,
            to_hex(&ciphertext),
            to_hex(nonce.as_bytes()),
        ))
    }

    /// Authenticate and decrypt an inbound frame.
    ///
    /// # Errors
    ///
    /// - `MalformedFrame` for a wrong type tag, bad hex, bad nonce length or
    ///   non-UTF-8 plaintext
    /// - `NotEstablished` without a session key
    /// - `Replay` for a stale counter or repeated nonce
    /// - `Authentication` on tag mismatch
    pub fn open(&self, frame: &SecureFrame) -> Result<String, SessionError> {
        if frame.frame_type != SECURE_FRAME_TYPE {
            return Err(SessionError::MalformedFrame(format!(
                "unexpected type {:?}",
                frame.frame_type
            )));
        }
        let ciphertext =
            from_hex(&frame.data).map_err(|e| SessionError::MalformedFrame(format!("data: {e}")))?;
        let nonce = from_hex(&frame.iv)
            .and_then(|bytes| Nonce::from_slice(&bytes))
            .map_err(|e| SessionError::MalformedFrame(format!("iv: {e}")))?;

        let now = self.time.now_millis();
        let mut state = self.session.write();
        let plaintext = {
            let key = Self::key(&state)?;
            state.replay.check(frame.counter, &nonce, now)?;
            decrypt(key, &ciphertext, &nonce).map_err(|e| {
                warn!(
                    counter = frame.counter,
                    "[secure-session] inbound frame failed authentication"
                );
                SessionError::from_crypto("open", e)
            })?
        };
        state.replay.commit(frame.counter, nonce, now);
        state.last_activity = Some(now);
        drop(state);

        String::from_utf8(plaintext)
            .map_err(|e| SessionError::MalformedFrame(format!("plaintext: {e}")))
    }

    /// Send a request through the channel.
    ///
    /// Established: the body is sealed, secure headers are set, a non-2xx
    /// status is an error, and a secure-frame response body is opened.
    /// Otherwise the request and response pass through untouched.
    pub async fn dispatch(&self, mut request: HttpRequest) -> Result<HttpResponse, SessionError> {
        if !self.is_established() {
            warn!(
                method = %request.method,
                target = %request.target,
                "[secure-session] no session key, sending request unencrypted"
            );
            return Ok(self.transport.send(request).await?);
        }

        if let Some(body) = request.body.take() {
            let frame = self.seal(&body)?;
            request.body = Some(frame.to_json()?);
        }
        let correlation_id = self
            .session
            .read()
            .correlation_id()
            .map(str::to_string)
            .unwrap_or_default();
        request.set_header("Content-Type", "application/json");
        request.set_header("X-Session-ID", correlation_id);
        request.set_header("X-Secure-Request", "true");

        debug!(
            method = %request.method,
            target = %request.target,
            "[secure-session] dispatching sealed request"
        );
        let response = self.transport.send(request).await?.error_for_status()?;

        let frame = SecureFrame::detect(&response.body)
            .map_err(|e| SessionError::MalformedFrame(e.to_string()))?;
        match frame {
            Some(frame) => {
                let body = self.open(&frame)?;
                Ok(HttpResponse { body, ..response })
            }
            None => {
                self.session.write().last_activity = Some(self.time.now_millis());
                Ok(response)
            }
        }
    }

    /// Opt-in wrapper: only allow-listed targets go through `dispatch`
    /// while established; everything else is forwarded as is.
    pub async fn secure_fetch(
        &self,
        request: HttpRequest,
        secure_endpoints: &[String],
    ) -> Result<HttpResponse, SessionError> {
        if should_secure(&request.target, secure_endpoints) && self.is_established() {
            return self.dispatch(request).await;
        }
        debug!(
            target = %request.target,
            "[secure-session] forwarding request outside the channel"
        );
        Ok(self.transport.send(request).await?)
    }
}
