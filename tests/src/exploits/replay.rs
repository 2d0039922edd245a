//! # Replay Attacks
//!
//! Inbound frames must carry a counter above the last accepted one and a
//! nonce not seen inside the window. Nothing is committed for a rejected
//! frame.

#[cfg(test)]
mod tests {
    use crate::integration::paired;
    use secure_session::{
        HttpRequest, HttpTransport, SecureSessionApi, SessionConfig, SessionError,
    };

    #[tokio::test]
    async fn test_replayed_device_frame_rejected() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let frame = device.seal_for("abc123", "unlock").unwrap();
        assert_eq!(client.channel().open(&frame).unwrap(), "unlock");

        let err = client.channel().open(&frame).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Replay {
                counter: 0,
                last: Some(0)
            }
        ));
        assert!(client.is_initialized());
    }

    #[tokio::test]
    async fn test_restamped_counter_caught_by_nonce_window() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let frame = device.seal_for("abc123", "unlock").unwrap();
        client.channel().open(&frame).unwrap();

        let mut forged = frame.clone();
        forged.counter = 7;
        assert!(matches!(
            client.channel().open(&forged),
            Err(SessionError::Replay { counter: 7, .. })
        ));

        let fresh = device.seal_for("abc123", "next").unwrap();
        assert_eq!(fresh.counter, 1);
        assert_eq!(client.channel().open(&fresh).unwrap(), "next");
    }

    #[tokio::test]
    async fn test_out_of_order_frame_rejected() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        let early = device.seal_for("abc123", "first").unwrap();
        let late = device.seal_for("abc123", "second").unwrap();
        client.channel().open(&late).unwrap();

        assert!(matches!(
            client.channel().open(&early),
            Err(SessionError::Replay {
                counter: 0,
                last: Some(1)
            })
        ));
        assert_eq!(client.snapshot().inbound_counter, Some(1));
    }

    #[tokio::test]
    async fn test_frame_from_previous_session_rejected() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);
        let captured = device.seal_for("abc123", "old").unwrap();

        assert!(client.reinitialize().await);

        assert!(matches!(
            client.channel().open(&captured),
            Err(SessionError::Authentication(_))
        ));
        assert!(client.is_initialized());
        assert_eq!(client.snapshot().inbound_counter, None);
    }

    #[tokio::test]
    async fn test_device_rejects_replayed_request() {
        let (client, device) = paired(SessionConfig::for_testing(), 20_000);
        assert!(client.initialize().await);

        client
            .dispatch(HttpRequest::post("/api/config").with_body("wipe"))
            .await
            .unwrap();
        let captured = device.requests_to("/api/config").remove(0);

        let replayed = device.send(captured).await.unwrap();
        assert_eq!(replayed.status, 409);
        assert_eq!(device.received_counters(), vec![1]);
    }
}
