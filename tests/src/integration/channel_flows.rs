//! # Channel Flows
//!
//! Sealed request/response traffic after a handshake, the fail-open
//! fallback before one, and allow-list routing of `secure_fetch`.

#[cfg(test)]
mod tests {
    use crate::integration::paired;
    use secure_session::{HttpRequest, HttpTransport, SecureSessionApi, SessionConfig};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).expect("json body")
    }

    // =========================================================================
    // SEALED TRAFFIC
    // =========================================================================

    #[tokio::test]
    async fn test_counters_strictly_increase_on_the_wire() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        for i in 0..5 {
            let reply = client
                .secure_fetch(HttpRequest::post("/api/passwords/get").with_body(format!("q{i}")))
                .await
                .unwrap();
            assert_eq!(json(&reply.body)["echo"], format!("q{i}"));
        }

        assert_eq!(device.received_counters(), vec![1, 2, 3, 4, 5]);
        let snapshot = client.snapshot();
        assert_eq!(snapshot.message_counter, 5);
        assert_eq!(snapshot.inbound_counter, Some(4));
    }

    #[tokio::test]
    async fn test_secret_body_never_on_the_wire() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        client
            .secure_fetch(
                HttpRequest::post("/api/passwords/add").with_body(r#"{"password":"hunter2"}"#),
            )
            .await
            .unwrap();

        let sent = device.requests_to("/api/passwords/add");
        assert_eq!(sent.len(), 1);
        let body = sent[0].body.as_deref().unwrap();
        assert!(!body.contains("hunter2"));
        assert_eq!(json(body)["type"], "secure");
        assert_eq!(sent[0].header("X-Session-ID"), Some("abc123"));
        assert_eq!(sent[0].header("X-Secure-Request"), Some("true"));
        assert_eq!(sent[0].header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_bodiless_request_gets_sealed_reply() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let reply = client.dispatch(HttpRequest::get("/api/keys")).await.unwrap();

        let body = json(&reply.body);
        assert_eq!(body["echo"], "");
        assert_eq!(body["path"], "/api/keys");
        assert!(device.received_counters().is_empty());
        assert_eq!(client.snapshot().inbound_counter, Some(0));
    }

    // =========================================================================
    // FALLBACK AND ROUTING
    // =========================================================================

    #[tokio::test]
    async fn test_fallback_matches_direct_transport() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        let request = HttpRequest::post("/api/keys").with_body("plain body");

        let via_client = client.secure_fetch(request.clone()).await.unwrap();
        let direct = device.send(request).await.unwrap();

        assert_eq!(via_client, direct);
        assert!(device.requests()[0].header("X-Secure-Request").is_none());
    }

    #[tokio::test]
    async fn test_non_allow_listed_path_stays_plaintext() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let reply = client
            .secure_fetch(HttpRequest::post("/api/status").with_body("hello"))
            .await
            .unwrap();

        assert_eq!(json(&reply.body)["plain"], "hello");
        let sent = device.requests_to("/api/status");
        assert_eq!(sent[0].body.as_deref(), Some("hello"));
        assert!(sent[0].header("X-Secure-Request").is_none());
        assert_eq!(client.snapshot().message_counter, 0);
    }

    #[tokio::test]
    async fn test_reset_returns_to_plaintext() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);
        client.reset().await;

        let reply = client
            .secure_fetch(HttpRequest::post("/api/keys").with_body("after"))
            .await
            .unwrap();

        assert_eq!(json(&reply.body)["plain"], "after");
    }
}
