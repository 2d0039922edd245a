//! In-process device peer for unit tests.

use crate::adapters::StaticFingerprintProvider;
use crate::algorithms::{
    derive_session_key, derive_wrapping_key, KeyExchangeRequest, KeyExchangeResponse,
    ProtectedHandshakeRequest, ProtectedHandshakeResponse,
};
use crate::config::SessionConfig;
use crate::domain::SecureFrame;
use crate::ports::{FingerprintProvider, HttpRequest, HttpResponse, MockHandler, MockTransport};
use parking_lot::Mutex;
use shared_crypto::{
    decrypt, encrypt, from_hex, to_hex, EcdhKeyPair, EcdhPublicKey, EnvelopeCodec, Nonce,
    SecretKey,
};
use std::sync::Arc;

/// Key the device derived on its side of the last handshake.
pub(crate) type DeviceKey = Arc<Mutex<Option<SecretKey>>>;

/// Transport answering like the firmware. See [`device_handler`].
pub(crate) fn device_transport(
    config: &SessionConfig,
    fingerprint: StaticFingerprintProvider,
) -> (MockTransport, DeviceKey) {
    let (handler, key) = device_handler(config, fingerprint);
    (MockTransport::new(move |req| handler(req)), key)
}

/// Firmware-like handler: both handshake variants, the activity ping, and
/// an echo endpoint that seals `echo:<plaintext>`.
pub(crate) fn device_handler(
    config: &SessionConfig,
    fingerprint: StaticFingerprintProvider,
) -> (MockHandler, DeviceKey) {
    let key: DeviceKey = Arc::new(Mutex::new(None));
    let device_key = key.clone();
    let config = config.clone();
    let codec = EnvelopeCodec::new(config.pbkdf2_iterations);

    let handler: MockHandler = Arc::new(move |req: &HttpRequest| {
        let body = req.body.clone().unwrap_or_default();
        if req.target.contains(&config.protected_handshake_path) {
            let hs: ProtectedHandshakeRequest = serde_json::from_str(&body).unwrap();
            let wrapping = derive_wrapping_key(&fingerprint.collect()).unwrap();
            let client_hex = match codec.decrypt(&hs.encrypted_pubkey, wrapping.as_str()) {
                Ok(hex) => hex,
                Err(_) => {
                    return Ok(HttpResponse::ok(
                        r#"{"status":"error","message":"Decryption failed"}"#,
                    ))
                }
            };
            let client =
                EcdhPublicKey::from_hex(std::str::from_utf8(&client_hex).unwrap()).unwrap();

            let device = EcdhKeyPair::generate();
            let shared = device.diffie_hellman(&client);
            *device_key.lock() = Some(
                derive_session_key(&shared, &hs.client_id, config.session_key_derivation)
                    .unwrap(),
            );
            let sealed = codec
                .encrypt(device.public_key().to_hex().as_bytes(), wrapping.as_str())
                .unwrap();
            return Ok(HttpResponse::json(&ProtectedHandshakeResponse {
                status: "success".into(),
                encrypted_pubkey: Some(sealed),
                message: None,
            })
            .unwrap());
        }
        if req.target.contains(&config.key_exchange_path) {
            let kx: KeyExchangeRequest = serde_json::from_str(&body).unwrap();
            let client = EcdhPublicKey::from_hex(&kx.pubkey).unwrap();
            let device = EcdhKeyPair::generate();
            let shared = device.diffie_hellman(&client);
            *device_key.lock() = Some(
                derive_session_key(&shared, &kx.session_id, config.session_key_derivation)
                    .unwrap(),
            );
            return Ok(HttpResponse::json(&KeyExchangeResponse {
                status: "success".into(),
                pubkey: Some(device.public_key().to_hex()),
                message: None,
            })
            .unwrap());
        }
        if req.target.contains(&config.activity_path) {
            return Ok(HttpResponse::ok(r#"{"status":"ok"}"#));
        }

        match SecureFrame::detect(&body).unwrap() {
            Some(frame) => {
                let guard = device_key.lock();
                let key = guard.as_ref().unwrap();
                let nonce = Nonce::from_slice(&from_hex(&frame.iv).unwrap()).unwrap();
                let plain = decrypt(key, &from_hex(&frame.data).unwrap(), &nonce).unwrap();
                let reply = format!("echo:{}", String::from_utf8(plain).unwrap());
                let (ct, nonce) = encrypt(key, reply.as_bytes()).unwrap();
                let frame = SecureFrame::new(0, to_hex(&ct), to_hex(nonce.as_bytes()));
                Ok(HttpResponse::ok(frame.to_json().unwrap()))
            }
            None => Ok(HttpResponse::ok(format!("plain:{body}"))),
        }
    });

    (handler, key)
}

/// Transport that rejects every handshake with `{"status":"error"}`.
pub(crate) fn rejecting_transport() -> MockTransport {
    MockTransport::always(HttpResponse::ok(
        r#"{"type":"keyexchange","status":"error","message":"rejected"}"#,
    ))
}
