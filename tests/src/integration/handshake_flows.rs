//! # Handshake Flows
//!
//! ```text
//! Client                                   Device
//!   │ protected-handshake {client_id, envelope(pubkey)} │
//!   │──────────────────────────────────────────────────▶│
//!   │        {status: success, envelope(pubkey)}        │
//!   │◀──────────────────────────────────────────────────│
//!   │           both sides derive the same key          │
//! ```
//!
//! The unwrapped variant exchanges raw keys under a random session ID.

#[cfg(test)]
mod tests {
    use crate::integration::{paired, paired_across_days};
    use secure_session::{
        HandshakeState, ProtocolVariant, SecureSessionApi, SessionConfig, SessionKeyDerivation,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn client_key(client: &crate::integration::Client) -> [u8; 32] {
        *client
            .session()
            .read()
            .session_key
            .as_ref()
            .expect("session key")
            .as_bytes()
    }

    // =========================================================================
    // WRAPPED VARIANT
    // =========================================================================

    #[tokio::test]
    async fn test_wrapped_handshake_end_to_end() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);

        assert!(client.initialize().await);

        let snapshot = client.snapshot();
        assert!(snapshot.established);
        assert_eq!(snapshot.variant, Some(ProtocolVariant::Wrapped));
        assert_eq!(snapshot.handshake, HandshakeState::Established);
        assert_eq!(snapshot.message_counter, 0);
        assert_eq!(device.session_key("abc123"), Some(client_key(&client)));

        let frame = client.channel().seal("ping").unwrap();
        assert_eq!(frame.counter, 1);
        assert_eq!(frame.data.len(), 40);
        assert!(frame
            .data
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(frame.iv.len(), 24);
    }

    #[tokio::test]
    async fn test_wrapped_handshake_sends_only_envelopes() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let sent = device.requests_to("/secure/protected-handshake");
        assert_eq!(sent.len(), 1);
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["client_id"], "abc123");
        let local = client.snapshot().local_public_key.unwrap();
        assert!(!sent[0].body.as_deref().unwrap().contains(&local));
    }

    #[tokio::test]
    async fn test_fingerprint_day_mismatch_fails() {
        let (client, device) = paired_across_days(SessionConfig::for_testing(), 20_001, 20_000);

        assert!(!client.initialize().await);
        assert!(!client.is_initialized());
        assert_eq!(client.snapshot().handshake, HandshakeState::Failed);
        assert_eq!(device.requests_to("/secure/protected-handshake").len(), 3);
        assert_eq!(device.session_key("abc123"), None);
    }

    // =========================================================================
    // UNWRAPPED VARIANT
    // =========================================================================

    #[tokio::test]
    async fn test_unwrapped_handshake_end_to_end() {
        let config = SessionConfig {
            variant: ProtocolVariant::Unwrapped,
            ..SessionConfig::for_testing()
        };
        let (client, device) = paired(config, 20_000);

        assert!(client.initialize().await);

        let snapshot = client.snapshot();
        let session_id = snapshot.session_id.expect("session id");
        assert_eq!(snapshot.variant, Some(ProtocolVariant::Unwrapped));
        assert_eq!(device.session_key(&session_id), Some(client_key(&client)));
        assert!(device.requests_to("/secure/protected-handshake").is_empty());

        let reply = client
            .dispatch(secure_session::HttpRequest::post("/api/keys").with_body("hi"))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["echo"], "hi");
    }

    #[tokio::test]
    async fn test_direct_key_derivation_agrees() {
        let config = SessionConfig {
            session_key_derivation: SessionKeyDerivation::Direct,
            ..SessionConfig::for_testing()
        };
        let (client, device) = paired(config, 20_000);

        assert!(client.initialize().await);
        assert_eq!(device.session_key("abc123"), Some(client_key(&client)));
    }

    // =========================================================================
    // RETRIES
    // =========================================================================

    #[tokio::test]
    async fn test_three_rejections_exhaust_attempts() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        device.reject_next(3);

        assert!(!client.initialize().await);

        assert!(!client.is_initialized());
        assert!(!client.background_running());
        assert_eq!(device.requests_to("/secure/protected-handshake").len(), 3);
        assert_eq!(client.snapshot().handshake, HandshakeState::Failed);
    }

    #[tokio::test]
    async fn test_recovers_on_third_attempt() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        device.reject_next(2);

        assert!(client.initialize().await);

        assert_eq!(device.requests_to("/secure/protected-handshake").len(), 3);
        assert_eq!(device.session_key("abc123"), Some(client_key(&client)));
    }

    #[tokio::test]
    async fn test_reinitialize_rotates_key() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);
        let first = client_key(&client);

        assert!(client.reinitialize().await);

        let second = client_key(&client);
        assert_ne!(first, second);
        assert_eq!(device.session_key("abc123"), Some(second));
        assert_eq!(client.snapshot().message_counter, 0);
    }

    // =========================================================================
    // PROBES
    // =========================================================================

    #[tokio::test]
    async fn test_hello_probe() {
        let (client, _device) = paired(SessionConfig::for_testing(), 20_000);

        let hello = client.hello().await.unwrap();
        assert_eq!(hello.status, "ready");
        assert_eq!(hello.key_exchange.as_deref(), Some("ECDH-P256"));
    }

    #[tokio::test]
    async fn test_keepalive_reaches_device() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        tokio::time::sleep(std::time::Duration::from_millis(250)).await;

        let pings = device.pings();
        assert!(!pings.is_empty());
        assert!(pings.iter().all(|flag| flag == "true"));

        client.reset().await;
        let seen = device.pings().len();
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        assert_eq!(device.pings().len(), seen);
    }
}
