//! # Driving Ports (Inbound API)
//!
//! The API this subsystem exposes to application code.

use super::outbound::{HttpRequest, HttpResponse};
use crate::algorithms::ServerHello;
use crate::domain::{ActivityEvent, SessionError, SessionSnapshot};
use async_trait::async_trait;

/// Secure session handle.
///
/// # Availability Over Confidentiality
///
/// `dispatch` and `secure_fetch` forward plaintext when no session key is
/// established. Callers that must never send plaintext check
/// [`SecureSessionApi::is_initialized`] first.
///
/// # Example
///
/// ```rust,ignore
/// use secure_session::ports::SecureSessionApi;
///
/// async fn save<T: SecureSessionApi>(api: &T) {
///     if api.initialize().await {
///         let resp = api
///             .secure_fetch(HttpRequest::post("/api/add").with_body("{}"))
///             .await;
///     }
/// }
/// ```
#[async_trait]
pub trait SecureSessionApi: Send + Sync {
    /// Run the handshake with retries and start background tasks on success.
    ///
    /// Returns `false` when the client ID is missing or every attempt failed.
    async fn initialize(&self) -> bool;

    /// Reset and initialize again from `INIT`.
    async fn reinitialize(&self) -> bool;

    /// Stop background tasks and drop all key material.
    async fn reset(&self);

    /// Whether a session key is established.
    fn is_initialized(&self) -> bool;

    /// Redacted state.
    fn snapshot(&self) -> SessionSnapshot;

    /// Note a user interaction.
    fn record_activity(&self, event: ActivityEvent);

    /// Seal and send a request if established, else forward it unchanged.
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, SessionError>;

    /// Like `dispatch`, but only for allow-listed targets.
    async fn secure_fetch(&self, request: HttpRequest) -> Result<HttpResponse, SessionError>;

    /// Probe the device's secure-layer capabilities.
    async fn hello(&self) -> Result<ServerHello, SessionError>;
}
