//! # Simulated Device
//!
//! In-process stand-in for the device firmware's secure layer:
//!
//! | Route | Behavior |
//! |-------|----------|
//! | protected handshake | open client envelope, answer with sealed device key |
//! | key exchange | raw key exchange keyed by session ID |
//! | activity | record the `X-Secure-Session` flag |
//! | hello | report readiness |
//! | anything else | open sealed requests and answer sealed, echo plaintext otherwise |
//!
//! Inbound frame counters must strictly increase per session, as on the
//! firmware.

use async_trait::async_trait;
use parking_lot::Mutex;
use secure_session::algorithms::{
    KeyExchangeRequest, KeyExchangeResponse, ProtectedHandshakeRequest,
    ProtectedHandshakeResponse,
};
use secure_session::{
    derive_session_key, derive_wrapping_key, FingerprintProvider, HttpRequest, HttpResponse,
    HttpTransport, SecureFrame, SessionConfig, StaticFingerprintProvider, TransportError,
};
use shared_crypto::{
    decrypt, encrypt, from_hex, to_hex, EcdhKeyPair, EcdhPublicKey, EnvelopeCodec, Nonce,
    SecretKey,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Device-side state of one session.
struct DeviceSession {
    key: SecretKey,
    last_inbound: Option<u64>,
    outbound: u64,
}

#[derive(Default)]
struct DeviceState {
    sessions: HashMap<String, DeviceSession>,
    rejections_left: u32,
    requests: Vec<HttpRequest>,
    received_counters: Vec<u64>,
    pings: Vec<String>,
}

/// Firmware secure layer simulator.
pub struct SimulatedDevice {
    config: SessionConfig,
    fingerprint: StaticFingerprintProvider,
    codec: EnvelopeCodec,
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    /// Device sharing `config`'s paths, KDF settings and the given
    /// fingerprint view of the client.
    pub fn new(config: &SessionConfig, fingerprint: StaticFingerprintProvider) -> Arc<Self> {
        Arc::new(Self {
            config: config.clone(),
            fingerprint,
            codec: EnvelopeCodec::new(config.pbkdf2_iterations),
            state: Mutex::new(DeviceState::default()),
        })
    }

    /// Reject the next `count` handshakes with `{"status":"error"}`.
    pub fn reject_next(&self, count: u32) {
        self.state.lock().rejections_left = count;
    }

    /// Every request received.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests whose target contains `path`.
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.target.contains(path))
            .cloned()
            .collect()
    }

    /// Counters of accepted sealed requests, in arrival order.
    pub fn received_counters(&self) -> Vec<u64> {
        self.state.lock().received_counters.clone()
    }

    /// `X-Secure-Session` values of received activity pings.
    pub fn pings(&self) -> Vec<String> {
        self.state.lock().pings.clone()
    }

    /// Device copy of the session key for `correlation_id`.
    pub fn session_key(&self, correlation_id: &str) -> Option<[u8; 32]> {
        self.state
            .lock()
            .sessions
            .get(correlation_id)
            .map(|s| *s.key.as_bytes())
    }

    /// Seal `plaintext` as the device would for `correlation_id`.
    pub fn seal_for(&self, correlation_id: &str, plaintext: &str) -> Option<SecureFrame> {
        let mut state = self.state.lock();
        let session = state.sessions.get_mut(correlation_id)?;
        Some(Self::seal(session, plaintext))
    }

    fn seal(session: &mut DeviceSession, plaintext: &str) -> SecureFrame {
        let (ct, nonce) = encrypt(&session.key, plaintext.as_bytes()).unwrap();
        let frame = SecureFrame::new(session.outbound, to_hex(&ct), to_hex(nonce.as_bytes()));
        session.outbound += 1;
        frame
    }

    fn error(status: u16, message: &str) -> HttpResponse {
        let body = serde_json::json!({"type": "keyexchange", "status": "error", "message": message});
        HttpResponse::new(status, body.to_string())
    }

    fn take_rejection(&self) -> bool {
        let mut state = self.state.lock();
        if state.rejections_left > 0 {
            state.rejections_left -= 1;
            return true;
        }
        false
    }

    fn install(&self, correlation_id: &str, client: &EcdhPublicKey) -> EcdhPublicKey {
        let device = EcdhKeyPair::generate();
        let shared = device.diffie_hellman(client);
        let key =
            derive_session_key(&shared, correlation_id, self.config.session_key_derivation).unwrap();
        self.state.lock().sessions.insert(
            correlation_id.to_string(),
            DeviceSession {
                key,
                last_inbound: None,
                outbound: 0,
            },
        );
        device.public_key()
    }

    fn protected_handshake(&self, body: &str) -> HttpResponse {
        if self.take_rejection() {
            return Self::error(200, "rejected");
        }
        let Ok(request) = serde_json::from_str::<ProtectedHandshakeRequest>(body) else {
            return Self::error(400, "Invalid JSON");
        };
        let wrapping = derive_wrapping_key(&self.fingerprint.collect()).unwrap();
        let client = self
            .codec
            .decrypt(&request.encrypted_pubkey, wrapping.as_str())
            .ok()
            .and_then(|hex| String::from_utf8(hex).ok())
            .and_then(|hex| EcdhPublicKey::from_hex(&hex).ok());
        let Some(client) = client else {
            return Self::error(400, "Decryption failed");
        };

        let device_key = self.install(&request.client_id, &client);
        let sealed = self
            .codec
            .encrypt(device_key.to_hex().as_bytes(), wrapping.as_str())
            .unwrap();
        HttpResponse::json(&ProtectedHandshakeResponse {
            status: "success".into(),
            encrypted_pubkey: Some(sealed),
            message: None,
        })
        .unwrap()
    }

    fn key_exchange(&self, body: &str) -> HttpResponse {
        if self.take_rejection() {
            return Self::error(200, "rejected");
        }
        let Ok(request) = serde_json::from_str::<KeyExchangeRequest>(body) else {
            return Self::error(400, "Invalid JSON");
        };
        let Ok(client) = EcdhPublicKey::from_hex(&request.pubkey) else {
            return Self::error(400, "Invalid public key");
        };
        let device_key = self.install(&request.session_id, &client);
        HttpResponse::json(&KeyExchangeResponse {
            status: "success".into(),
            pubkey: Some(device_key.to_hex()),
            message: None,
        })
        .unwrap()
    }

    fn secure_request(&self, request: &HttpRequest, body: &str) -> HttpResponse {
        let correlation_id = request.header("X-Session-ID").unwrap_or_default().to_string();
        let mut state = self.state.lock();
        let Some(session) = state.sessions.get_mut(&correlation_id) else {
            return Self::error(401, "Unknown session");
        };

        let plaintext = match SecureFrame::detect(body) {
            Ok(Some(frame)) => {
                if session.last_inbound.is_some_and(|last| frame.counter <= last) {
                    return Self::error(409, "Replay detected");
                }
                let nonce = Nonce::from_slice(&from_hex(&frame.iv).unwrap()).unwrap();
                let Ok(plain) = decrypt(&session.key, &from_hex(&frame.data).unwrap(), &nonce)
                else {
                    return Self::error(400, "Decryption failed");
                };
                session.last_inbound = Some(frame.counter);
                let counter = frame.counter;
                let text = String::from_utf8(plain).unwrap();
                let reply = serde_json::json!({"echo": text, "path": request.target}).to_string();
                let sealed = Self::seal(session, &reply);
                state.received_counters.push(counter);
                return HttpResponse::ok(sealed.to_json().unwrap());
            }
            Ok(None) => String::new(),
            Err(_) => return Self::error(400, "Malformed frame"),
        };

        let reply = serde_json::json!({"echo": plaintext, "path": request.target}).to_string();
        HttpResponse::ok(Self::seal(session, &reply).to_json().unwrap())
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let body = request.body.clone().unwrap_or_default();
        let target = request.target.as_str();

        if target.contains(&self.config.protected_handshake_path) {
            return self.protected_handshake(&body);
        }
        if target.contains(&self.config.key_exchange_path) {
            return self.key_exchange(&body);
        }
        if target.contains(&self.config.activity_path) {
            let flag = request.header("X-Secure-Session").unwrap_or("missing");
            self.state.lock().pings.push(flag.to_string());
            return HttpResponse::ok(r#"{"status":"ok"}"#);
        }
        if target.contains(&self.config.hello_path) {
            return HttpResponse::ok(
                r#"{"status":"ready","protocol_version":"1.0","encryption":"AES-256-GCM","key_exchange":"ECDH-P256","server_info":"SimulatedDevice"}"#,
            );
        }
        if request.header("X-Secure-Request") == Some("true") {
            return self.secure_request(request, &body);
        }
        let reply = serde_json::json!({"plain": body, "path": target});
        HttpResponse::ok(reply.to_string())
    }
}

#[async_trait]
impl HttpTransport for SimulatedDevice {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.state.lock().requests.push(request.clone());
        Ok(self.route(&request))
    }
}

/// Response rewriter used by [`InterceptingTransport`].
pub type Rewrite = Box<dyn Fn(&HttpRequest, HttpResponse) -> HttpResponse + Send + Sync>;

/// Man-in-the-middle between the client and a device.
pub struct InterceptingTransport {
    device: Arc<SimulatedDevice>,
    rewrite: Rewrite,
}

impl InterceptingTransport {
    /// Forward to `device`, passing every response through `rewrite`.
    pub fn new(
        device: Arc<SimulatedDevice>,
        rewrite: impl Fn(&HttpRequest, HttpResponse) -> HttpResponse + Send + Sync + 'static,
    ) -> Self {
        Self {
            device,
            rewrite: Box::new(rewrite),
        }
    }
}

#[async_trait]
impl HttpTransport for InterceptingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self.device.send(request.clone()).await?;
        Ok((self.rewrite)(&request, response))
    }
}
